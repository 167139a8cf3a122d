use crate::core::db::{
    all_tables_query, tables_query_for_input, user_databases, Connection, QueryOutcome, QueryRunner,
    DATABASES_QUERY,
};
use crate::pager::Pager;
use std::io::Write;
use tracing::debug;

/// Marks a line as a client command rather than a query.
pub const COMMAND_PREFIX: char = '\\';

pub const NO_USER_DATABASES: &str = "No user databases found.";

/// Represents a parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Nothing but whitespace
    Empty,
    /// `\databases`
    Databases,
    /// `\tables [database]`
    Tables(Option<String>),
    /// A known command with the wrong arguments; holds its usage line
    Usage(&'static str),
    /// Query text forwarded to the server as-is
    Sql(String),
    /// An unrecognized command, with the original input
    Unknown(String),
}

/// Parses a user input string into a corresponding `Command`.
///
/// If the input starts with a backslash it is interpreted as a command.
/// Otherwise, it is treated as a query.
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }
    let Some(rest) = input.strip_prefix(COMMAND_PREFIX) else {
        return Command::Sql(input.to_string());
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    match (name, args.as_slice()) {
        ("databases", []) => Command::Databases,
        ("databases", _) => Command::Usage("Usage: \\databases"),
        ("tables", []) => Command::Tables(None),
        ("tables", [database]) => Command::Tables(Some(database.to_string())),
        ("tables", _) => Command::Usage("Usage: \\tables [database]"),
        _ => Command::Unknown(input.to_string()),
    }
}

/// Parses one line of input and carries it out.
///
/// Returns the parsed command so callers can see what was done.
pub fn dispatch<C, W, P>(runner: &mut QueryRunner<'_, C, W, P>, input: &str) -> Command
where
    C: Connection,
    W: Write,
    P: Pager,
{
    let command = parse_command(input);
    debug!(?command, "dispatching");
    match &command {
        Command::Empty => {}
        Command::Databases => echo_and_run(runner, DATABASES_QUERY),
        Command::Tables(Some(database)) => {
            echo_and_run(runner, &tables_query_for_input(database))
        }
        Command::Tables(None) => list_all_tables(runner),
        Command::Usage(usage) => runner.console().line(usage),
        Command::Sql(sql) => runner.run(sql),
        Command::Unknown(original) => runner
            .console()
            .line(format!("Unknown command: {}", original)),
    }
    command
}

/// Shows the generated query before sending it.
fn echo_and_run<C, W, P>(runner: &mut QueryRunner<'_, C, W, P>, sql: &str)
where
    C: Connection,
    W: Write,
    P: Pager,
{
    runner.console().line(sql);
    runner.run(sql);
}

fn list_all_tables<C, W, P>(runner: &mut QueryRunner<'_, C, W, P>)
where
    C: Connection,
    W: Write,
    P: Pager,
{
    let databases = match runner.execute(DATABASES_QUERY) {
        Ok(QueryOutcome::Rows(result)) => result,
        Ok(QueryOutcome::NoRows) => Default::default(),
        Err(err) => {
            runner.report(&err);
            return;
        }
    };

    let names = user_databases(databases.first_column_text());
    match all_tables_query(&names) {
        Some(sql) => echo_and_run(runner, &sql),
        None => runner.console().line(NO_USER_DATABASES),
    }
}
