//! Command implementations.

pub mod delete;
pub mod ingest;
pub mod query;

pub use self::delete::execute_delete;
pub use self::ingest::execute_ingest;
pub use self::query::{execute_ask, execute_query};
