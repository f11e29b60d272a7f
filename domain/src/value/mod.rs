//! Native value model for data crossing the script boundary.
//!
//! A [`TableObject`] is a snapshot of a script-side table restricted to
//! string keys; each value is a [`TaggedValue`]. These types know nothing
//! about the interpreter; conversion lives in the infrastructure layer.

mod table;
mod tagged;

pub use table::TableObject;
pub use tagged::{TaggedValue, ValueTag};
