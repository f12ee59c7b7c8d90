//! Member directory adapters.
//!
//! - `PostgresMemberDirectory` - Reads the platform `members` table
//! - `StaticMemberDirectory` - Fixed set of members for tests and tooling

mod postgres;
mod static_directory;

pub use postgres::PostgresMemberDirectory;
pub use static_directory::StaticMemberDirectory;
