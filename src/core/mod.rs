/// Core Module for mscli
///
/// Shared infrastructure for the client: the error type and the database
/// layer (connection, query execution, catalog queries).

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{MscliError, Result};
