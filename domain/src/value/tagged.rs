//! Tagged values carried across the script boundary.

use super::table::TableObject;
use serde::{Deserialize, Serialize, Serializer};

/// Discriminant of a [`TaggedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    String,
    Integer,
    Double,
    Boolean,
    Table,
    None,
}

impl ValueTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Table => "table",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for ValueTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A native value that mirrors one script-side value.
///
/// Exactly one payload is active; the tag is derived from the variant so the
/// two can never disagree. Serialized untagged, so a TOML or JSON document
/// maps directly onto it (`null` becomes [`TaggedValue::None`]).
///
/// Script strings are byte strings. Valid UTF-8 lands in
/// [`TaggedValue::String`]; anything else is kept verbatim in
/// [`TaggedValue::Bytes`], which carries the `string` tag too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaggedValue {
    String(String),
    #[serde(skip_deserializing, serialize_with = "serialize_lossy")]
    Bytes(Vec<u8>),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Table(TableObject),
    #[default]
    None,
}

impl TaggedValue {
    pub fn tag(&self) -> ValueTag {
        match self {
            Self::String(_) | Self::Bytes(_) => ValueTag::String,
            Self::Integer(_) => ValueTag::Integer,
            Self::Double(_) => ValueTag::Double,
            Self::Boolean(_) => ValueTag::Boolean,
            Self::Table(_) => ValueTag::Table,
            Self::None => ValueTag::None,
        }
    }

    /// Parse a command-line literal.
    ///
    /// `nil` is None, `true`/`false` are booleans, integer text is an
    /// integer, float text is a double, and everything else stays a string.
    pub fn from_literal(text: &str) -> Self {
        match text {
            "nil" => return Self::None,
            "true" => return Self::Boolean(true),
            "false" => return Self::Boolean(false),
            _ => {}
        }

        if let Ok(n) = text.parse::<i64>() {
            return Self::Integer(n);
        }

        // "inf" and "nan" parse as floats but are far more likely meant as words
        if text.bytes().any(|b| b.is_ascii_digit())
            && let Ok(d) = text.parse::<f64>()
        {
            return Self::Double(d);
        }

        Self::String(text.to_string())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Raw bytes of either string form.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::String(s) => Some(s.as_bytes()),
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableObject> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Double(d) => write!(f, "{}", d),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Table(t) => write!(f, "table({} entries)", t.len()),
            Self::None => write!(f, "nil"),
        }
    }
}

fn serialize_lossy<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

impl From<&str> for TaggedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TaggedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for TaggedValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for TaggedValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<TableObject> for TaggedValue {
    fn from(value: TableObject) -> Self {
        Self::Table(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_variant() {
        assert_eq!(TaggedValue::from("x").tag(), ValueTag::String);
        assert_eq!(TaggedValue::from(7).tag(), ValueTag::Integer);
        assert_eq!(TaggedValue::from(0.5).tag(), ValueTag::Double);
        assert_eq!(TaggedValue::from(true).tag(), ValueTag::Boolean);
        assert_eq!(TaggedValue::from(TableObject::new()).tag(), ValueTag::Table);
        assert_eq!(TaggedValue::None.tag(), ValueTag::None);
    }

    #[test]
    fn test_bytes_are_strings_without_utf8() {
        let value = TaggedValue::Bytes(vec![b'a', 0xff]);

        assert_eq!(value.tag(), ValueTag::String);
        assert_eq!(value.as_bytes(), Some(&[b'a', 0xff][..]));
        assert_eq!(value.as_str(), None);
        assert_eq!(value.to_string(), "a\u{fffd}");
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"a\u{fffd}\"");
        assert_eq!(TaggedValue::from("ab").as_bytes(), Some(&b"ab"[..]));
    }

    #[test]
    fn test_from_literal() {
        assert_eq!(TaggedValue::from_literal("nil"), TaggedValue::None);
        assert_eq!(TaggedValue::from_literal("true"), TaggedValue::Boolean(true));
        assert_eq!(TaggedValue::from_literal("false"), TaggedValue::Boolean(false));
        assert_eq!(TaggedValue::from_literal("-42"), TaggedValue::Integer(-42));
        assert_eq!(TaggedValue::from_literal("2.5"), TaggedValue::Double(2.5));
        assert_eq!(
            TaggedValue::from_literal("hello"),
            TaggedValue::String("hello".into())
        );
    }

    #[test]
    fn test_from_literal_keeps_float_words_as_strings() {
        assert_eq!(TaggedValue::from_literal("inf"), TaggedValue::String("inf".into()));
        assert_eq!(TaggedValue::from_literal("NaN"), TaggedValue::String("NaN".into()));
    }

    #[test]
    fn test_accessors_only_match_their_variant() {
        let value = TaggedValue::Integer(3);
        assert_eq!(value.as_integer(), Some(3));
        assert_eq!(value.as_double(), None);
        assert_eq!(value.as_str(), None);
        assert!(!value.is_none());
        assert!(TaggedValue::default().is_none());
    }

    #[test]
    fn test_json_numbers_keep_integer_and_double_apart() {
        let int: TaggedValue = serde_json::from_str("3").unwrap();
        let dbl: TaggedValue = serde_json::from_str("3.25").unwrap();
        let null: TaggedValue = serde_json::from_str("null").unwrap();
        assert_eq!(int, TaggedValue::Integer(3));
        assert_eq!(dbl, TaggedValue::Double(3.25));
        assert_eq!(null, TaggedValue::None);
    }

    #[test]
    fn test_json_arrays_are_rejected() {
        assert!(serde_json::from_str::<TaggedValue>("[1, 2]").is_err());
    }
}
