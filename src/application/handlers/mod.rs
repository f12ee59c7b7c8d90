//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod chat_space;

pub use chat_space::*;
