/// # Test Utilities Module
///
/// Fakes for exercising the REPL without a server or a terminal:
/// - `FakeConnection`: canned replies per query text, with a shared log
/// - `ScriptedInput`: a fixed sequence of prompt inputs
/// - `RecordingPager`: captures paged text instead of spawning a program

use crate::core::db::{ConnectParams, Connection, QueryOutcome, ResultSet, Value};
use crate::core::{MscliError, Result};
use crate::pager::{Console, Pager, DEFAULT_PAGER_THRESHOLD};
use crate::session::{Input, LineSource};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;

/// A canned reply to one query.
#[derive(Debug, Clone)]
pub enum Reply {
    Outcome(QueryOutcome),
    ServerError(u32, String),
    /// A failure that does not come from the server
    Fault(String),
}

impl Reply {
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Reply::Outcome(QueryOutcome::Rows(ResultSet::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )))
    }

    pub fn server_error(code: u32, message: &str) -> Self {
        Reply::ServerError(code, message.to_string())
    }

    fn to_result(&self) -> Result<QueryOutcome> {
        match self {
            Reply::Outcome(outcome) => Ok(outcome.clone()),
            Reply::ServerError(code, message) => Err(MscliError::server(*code, message.clone())),
            Reply::Fault(description) => Err(MscliError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                description.clone(),
            ))),
        }
    }
}

/// What happened on a fake connection.
#[derive(Debug, Default)]
pub struct ConnectionLog {
    pub executed: Vec<String>,
    pub closed: bool,
}

/// A connection that answers from a table of replies.
///
/// Queries without a reply succeed without a result set.
#[derive(Debug, Default)]
pub struct FakeConnection {
    replies: HashMap<String, Reply>,
    log: Rc<RefCell<ConnectionLog>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        FakeConnection::default()
    }

    pub fn with_reply(mut self, sql: &str, reply: Reply) -> Self {
        self.replies.insert(sql.to_string(), reply);
        self
    }

    /// Shared handle to the log; stays readable after the connection is consumed.
    pub fn log(&self) -> Rc<RefCell<ConnectionLog>> {
        Rc::clone(&self.log)
    }
}

impl Connection for FakeConnection {
    fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        self.log.borrow_mut().executed.push(sql.to_string());
        match self.replies.get(sql) {
            Some(reply) => reply.to_result(),
            None => Ok(QueryOutcome::NoRows),
        }
    }

    fn close(self) -> Result<()> {
        self.log.borrow_mut().closed = true;
        Ok(())
    }
}

/// Prompt input from a fixed script; ends with `EndOfInput` once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    inputs: VecDeque<Result<Input>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedInput {
            inputs: lines.into_iter().map(|l| Ok(Input::Line(l.into()))).collect(),
        }
    }

    pub fn from_inputs(inputs: Vec<Result<Input>>) -> Self {
        ScriptedInput {
            inputs: inputs.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl LineSource for ScriptedInput {
    fn read_input(&mut self) -> Result<Input> {
        self.inputs.pop_front().unwrap_or(Ok(Input::EndOfInput))
    }
}

/// Keeps paged text in memory.
#[derive(Debug, Default)]
pub struct RecordingPager {
    pub pages: Vec<String>,
    fail: bool,
}

impl RecordingPager {
    /// A pager whose program cannot be started.
    pub fn failing() -> Self {
        RecordingPager {
            pages: Vec::new(),
            fail: true,
        }
    }
}

impl Pager for RecordingPager {
    fn page(&mut self, text: &str) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no pager"));
        }
        self.pages.push(text.to_string());
        Ok(())
    }
}

pub fn test_console() -> Console<Vec<u8>, RecordingPager> {
    Console::new(Vec::new(), RecordingPager::default(), DEFAULT_PAGER_THRESHOLD)
}

/// Everything written directly to the console (paged text excluded).
pub fn output<P: Pager>(console: &Console<Vec<u8>, P>) -> String {
    String::from_utf8_lossy(console.out()).into_owned()
}

pub fn params() -> ConnectParams {
    ConnectParams {
        host: "localhost".to_string(),
        port: 1433,
        username: "sa".to_string(),
        password: "secret".to_string(),
        trust_cert: true,
    }
}

/// Rows `0..count` of a single integer column `n`.
pub fn numbered_rows(count: i64) -> Reply {
    Reply::rows(&["n"], (0..count).map(|i| vec![Value::Int(i)]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_connection_records_queries() {
        let mut connection = FakeConnection::new().with_reply("SELECT 1", numbered_rows(1));
        let log = connection.log();

        assert!(matches!(
            connection.execute("SELECT 1").unwrap(),
            QueryOutcome::Rows(_)
        ));
        assert_eq!(connection.execute("UPDATE t SET a = 1").unwrap(), QueryOutcome::NoRows);
        connection.close().unwrap();

        let log = log.borrow();
        assert_eq!(log.executed, vec!["SELECT 1", "UPDATE t SET a = 1"]);
        assert!(log.closed);
    }

    #[test]
    fn test_scripted_input_ends_with_end_of_input() {
        let mut input = ScriptedInput::new(["a"]);
        assert_eq!(input.read_input().unwrap(), Input::Line("a".to_string()));
        assert_eq!(input.read_input().unwrap(), Input::EndOfInput);
        assert_eq!(input.read_input().unwrap(), Input::EndOfInput);
    }
}
