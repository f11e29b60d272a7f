//! Application-level configuration.
//!
//! - [`SandboxPolicy`]: restrictions applied to a script host at startup

pub mod sandbox_policy;

pub use sandbox_policy::SandboxPolicy;
