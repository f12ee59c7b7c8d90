//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `chat_space` - Chat spaces, memberships, and their transition rules

pub mod chat_space;
pub mod foundation;
