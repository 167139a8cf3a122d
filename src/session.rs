//! The interactive session: connect, read-dispatch-render until the user
//! interrupts, then release the connection.

use crate::core::db::{ConnectParams, Connection, QueryRunner};
use crate::core::Result;
use crate::pager::{Console, Pager};
use crate::repl;
use std::io::Write;
use tracing::{debug, error, info, warn};

pub const EXITING_NOTICE: &str = "Exiting...";
pub const CLOSED_NOTICE: &str = "Connection closed.";

/// Lifecycle of a session.
///
/// `Connecting → Ready → (Ready ⇄ Executing) → Closing → Closed`, with
/// `Failed` reachable from `Connecting` and `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Ready,
    Executing,
    Closing,
    Closed,
    Failed,
}

/// One unit of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Line(String),
    /// Ctrl-C at the prompt
    Interrupted,
    /// Ctrl-D at the prompt
    EndOfInput,
}

/// Where the session reads its input from.
pub trait LineSource {
    fn read_input(&mut self) -> Result<Input>;
}

fn transition(from: SessionState, to: SessionState) -> SessionState {
    debug!(?from, ?to, "session state change");
    to
}

/// Runs a whole session and returns its terminal state (`Closed` or `Failed`).
///
/// `connect` opens the connection; a failure there is reported and the loop
/// is never entered. Query errors are absorbed by the runner and never end
/// the session.
pub fn run<C, F, L, W, P>(
    params: &ConnectParams,
    connect: F,
    input: &mut L,
    console: &mut Console<W, P>,
) -> SessionState
where
    C: Connection,
    F: FnOnce(&ConnectParams) -> Result<C>,
    L: LineSource,
    W: Write,
    P: Pager,
{
    let mut state = SessionState::Connecting;
    let connection = match connect(params) {
        Ok(connection) => connection,
        Err(err) => {
            warn!(error = %err, host = %params.host, "could not connect");
            console.line(&err);
            return transition(state, SessionState::Failed);
        }
    };
    state = transition(state, SessionState::Ready);

    let mut runner = QueryRunner::new(connection, console);
    let ended = loop {
        match input.read_input() {
            Ok(Input::Line(line)) => {
                state = transition(state, SessionState::Executing);
                repl::dispatch(&mut runner, &line);
                state = transition(state, SessionState::Ready);
            }
            Ok(Input::Interrupted) | Ok(Input::EndOfInput) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    match ended {
        Ok(()) => {
            state = transition(state, SessionState::Closing);
            runner.console().line(EXITING_NOTICE);
            if let Err(err) = runner.into_connection().close() {
                warn!(error = %err, "error while closing the connection");
            }
            console.line(CLOSED_NOTICE);
            info!("session closed");
            transition(state, SessionState::Closed)
        }
        Err(err) => {
            error!(error = %err, "reading input failed");
            runner.console().line(&err);
            drop(runner.into_connection());
            transition(state, SessionState::Failed)
        }
    }
}
