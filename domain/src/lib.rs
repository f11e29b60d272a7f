//! Domain layer for luna
//!
//! This crate contains the interpreter-agnostic types shared by every other
//! layer. It has no dependency on the Lua runtime.
//!
//! # Core Concepts
//!
//! - **Tagged value**: one native value mirroring one script value
//!   (string, integer, double, boolean, nested table, or none)
//! - **Table object**: a string-keyed map of tagged values, the native
//!   snapshot of a script table
//! - **Fence**: a named guard that lets setup code run at most once per
//!   interpreter instance

pub mod fence;
pub mod value;

// Re-export commonly used types
pub use fence::FenceSet;
pub use value::{TableObject, TaggedValue, ValueTag};
