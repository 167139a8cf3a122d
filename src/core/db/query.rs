/// Query Execution Module
///
/// This module provides the value model for query results and the query
/// runner that executes text against the open connection and reports the
/// outcome to the console.

use crate::core::db::connection::Connection;
use crate::core::{MscliError, Result};
use crate::pager::{Console, Pager};
use crate::results_grid::ResultsGrid;
use std::fmt;
use std::io::Write;
use tracing::{debug, error};

/// Notice printed when a statement produced no result set.
pub const NO_ROWS_NOTICE: &str = "Query returned no rows.";

/// A single scalar value from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Exact numerics keep the server's textual form
    Decimal(String),
    Text(String),
    Binary(Vec<u8>),
    /// Dates and times, already formatted
    Temporal(String),
}

impl Value {
    /// Whether the value is a number (used for column alignment).
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Decimal(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the value as text if it is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(s) | Value::Text(s) | Value::Temporal(s) => write!(f, "{}", s),
            Value::Binary(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

/// The rows and column names returned by a row-returning query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    /// Column names in server order
    pub columns: Vec<String>,
    /// Rows in server order
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Text values of the first column, skipping NULLs and non-text cells.
    pub fn first_column_text(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(Value::as_text)
            .collect()
    }
}

/// What a successfully executed query produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(ResultSet),
    /// DDL, DML or anything else without a result set
    NoRows,
}

/// Executes queries on the session's connection and reports the results.
///
/// Every failure is absorbed here: `run` never returns an error, so a bad
/// query cannot end the session.
pub struct QueryRunner<'a, C, W, P> {
    connection: C,
    console: &'a mut Console<W, P>,
}

impl<'a, C, W, P> QueryRunner<'a, C, W, P>
where
    C: Connection,
    W: Write,
    P: Pager,
{
    pub fn new(connection: C, console: &'a mut Console<W, P>) -> Self {
        QueryRunner {
            connection,
            console,
        }
    }

    /// Executes a query without reporting anything.
    pub fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        debug!(sql, "executing query");
        self.connection.execute(sql)
    }

    /// Executes a query and renders its result, notice or error.
    pub fn run(&mut self, sql: &str) {
        match self.execute(sql) {
            Ok(QueryOutcome::Rows(result)) => {
                let rendered = ResultsGrid::from_result_set(&result).render();
                self.console.table(&rendered, result.row_count());
            }
            Ok(QueryOutcome::NoRows) => self.console.line(NO_ROWS_NOTICE),
            Err(err) => self.report(&err),
        }
    }

    /// Prints an error; anything that did not come from the server is logged as well.
    pub fn report(&mut self, err: &MscliError) {
        if !err.is_server() {
            error!(error = %err, "query failed outside the server");
        }
        self.console.line(err);
    }

    pub fn console(&mut self) -> &mut Console<W, P> {
        &mut *self.console
    }

    /// Hands the connection back so the session can release it.
    pub fn into_connection(self) -> C {
        self.connection
    }
}
