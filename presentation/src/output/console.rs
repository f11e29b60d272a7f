//! Console output formatter for script runs

use colored::Colorize;
use luna_application::RunScriptOutput;
use luna_domain::{TableObject, TaggedValue};

/// Formats script run output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete run output
    pub fn format(output: &RunScriptOutput) -> String {
        let mut text = String::new();

        if !output.failed_plugins.is_empty() {
            text.push_str(&Self::section_header("Failed plugins"));
            for path in &output.failed_plugins {
                text.push_str(&format!("  {} {}\n", "x".red().bold(), path.display()));
            }
        }

        if !output.results.is_empty() {
            text.push_str(&Self::section_header("Results"));
            for (index, value) in output.results.iter().enumerate() {
                text.push_str(&format!(
                    "  [{}] {}\n",
                    index + 1,
                    Self::describe(value, "      ")
                ));
            }
        }

        for (name, table) in &output.exports {
            text.push_str(&Self::section_header(&format!("Export: {}", name)));
            if table.is_empty() {
                text.push_str(&format!("  {}\n", "(empty)".dimmed()));
            } else {
                text.push_str(&Self::format_table(table, "  "));
            }
        }

        if text.is_empty() {
            text.push_str(&format!("{}\n", "Script finished with no results".dimmed()));
        }

        text
    }

    /// Format as JSON
    pub fn format_json(output: &RunScriptOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format a table as `key = value` lines in key order
    pub fn format_table(table: &TableObject, prefix: &str) -> String {
        let nested = format!("{}  ", prefix);
        table
            .sorted_keys()
            .into_iter()
            .filter_map(|key| table.get(key).map(|value| (key, value)))
            .map(|(key, value)| {
                format!(
                    "{}{} = {}\n",
                    prefix,
                    key.cyan(),
                    Self::describe(value, &nested)
                )
            })
            .collect()
    }

    fn describe(value: &TaggedValue, nested_prefix: &str) -> String {
        match value {
            TaggedValue::Table(table) => {
                format!("{}\n{}", "{".dimmed(), Self::format_table(table, nested_prefix))
                    .trim_end()
                    .to_string()
            }
            TaggedValue::String(s) => format!("{:?}", s),
            TaggedValue::None => "nil".dimmed().to_string(),
            other => format!("{} {}", other, format!("({})", other.tag()).dimmed()),
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}
