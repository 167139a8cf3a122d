/// Database Module
///
/// The database layer is split into three concerns:
/// - **Connection Management** (`connection.rs`): the `Connection` seam and the SQL Server implementation
/// - **Query Execution** (`query.rs`): result values, result sets and the query runner
/// - **Catalog Queries** (`schema.rs`): query text behind the `\databases` and `\tables` commands
///
/// All operations report failures through `MscliError`.
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
