/// Catalog Query Module
///
/// Builds the query text behind the built-in catalog commands: listing the
/// databases on the server and listing the tables of one or all of them.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Lists every database on the server.
pub const DATABASES_QUERY: &str = "SELECT name FROM sys.databases";

/// The server's built-in databases, never listed by `\tables`.
pub const SYSTEM_DATABASES: [&str; 4] = ["master", "tempdb", "model", "msdb"];

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_@$#]*$").expect("identifier pattern is valid"));

/// Returns the name as it can appear in a query: verbatim when it is a
/// regular identifier, bracket-quoted otherwise.
pub fn quote_identifier(name: &str) -> Cow<'_, str> {
    if PLAIN_IDENTIFIER.is_match(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("[{}]", name.replace(']', "]]")))
    }
}

/// Whether the text is already a bracket-delimited identifier, with every
/// inner `]` doubled.
fn is_delimited(text: &str) -> bool {
    match text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        Some(inner) => !inner.is_empty() && !inner.replace("]]", "").contains(']'),
        None => false,
    }
}

/// A database name as typed after `\tables`: kept verbatim when the user
/// already delimited it, quoted like any other name otherwise.
pub fn database_reference(input: &str) -> Cow<'_, str> {
    if is_delimited(input) {
        Cow::Borrowed(input)
    } else {
        quote_identifier(input)
    }
}

fn tables_query_in(reference: &str) -> String {
    format!("SELECT * FROM {}.INFORMATION_SCHEMA.tables", reference)
}

/// Query listing the tables of one database, given its catalog name.
pub fn tables_query(database: &str) -> String {
    tables_query_in(&quote_identifier(database))
}

/// Query listing the tables of the database named on the command line.
pub fn tables_query_for_input(input: &str) -> String {
    tables_query_in(&database_reference(input))
}

pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES
        .iter()
        .any(|system| system.eq_ignore_ascii_case(name))
}

/// Drops the system databases, keeping server order.
pub fn user_databases<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !is_system_database(name))
        .collect()
}

/// The union of the per-database table queries, or `None` when there is
/// no database to list.
pub fn all_tables_query(databases: &[&str]) -> Option<String> {
    if databases.is_empty() {
        return None;
    }
    let parts: Vec<String> = databases.iter().map(|db| tables_query(db)).collect();
    Some(parts.join(" UNION ALL "))
}
