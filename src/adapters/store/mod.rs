//! Chat-space store adapters.
//!
//! - `PostgresChatSpaceStore` - Production storage via sqlx
//! - `InMemoryChatSpaceStore` - Deterministic storage for tests

mod in_memory;
mod postgres;

pub use in_memory::InMemoryChatSpaceStore;
pub use postgres::PostgresChatSpaceStore;
