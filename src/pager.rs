//! Console output with paging for long results.
//!
//! Tables with more rows than the configured threshold are handed to the
//! user's pager; everything else is written straight to the output.

use std::env;
use std::fmt::Display;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Row count above which tables are paged.
pub const DEFAULT_PAGER_THRESHOLD: usize = 10;

/// Something that can show long text one screen at a time.
pub trait Pager {
    fn page(&mut self, text: &str) -> io::Result<()>;
}

/// Pipes text into an external pager program (`$PAGER`, else `less`).
#[derive(Debug, Clone, PartialEq)]
pub struct SystemPager {
    program: String,
    args: Vec<String>,
}

impl Default for SystemPager {
    fn default() -> Self {
        SystemPager {
            program: "less".to_string(),
            args: ["-S", "-R", "-F", "-X"].iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl SystemPager {
    /// Uses `$PAGER` when it is set and not blank.
    pub fn from_env() -> Self {
        match env::var("PAGER") {
            Ok(command) => Self::from_command(&command).unwrap_or_default(),
            Err(_) => SystemPager::default(),
        }
    }

    /// Splits a command line like `less -R` into program and arguments.
    pub fn from_command(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(SystemPager {
            program,
            args: parts.collect(),
        })
    }
}

impl Pager for SystemPager {
    fn page(&mut self, text: &str) -> io::Result<()> {
        io::stdout().flush()?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // the user may quit the pager before reading everything
            match stdin.write_all(text.as_bytes()) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        child.wait()?;
        Ok(())
    }
}

/// The user-facing output of a session.
pub struct Console<W, P> {
    out: W,
    pager: P,
    pager_threshold: usize,
}

impl Console<io::Stdout, SystemPager> {
    pub fn stdout(pager_threshold: usize) -> Self {
        Console::new(io::stdout(), SystemPager::from_env(), pager_threshold)
    }
}

impl<W: Write, P: Pager> Console<W, P> {
    pub fn new(out: W, pager: P, pager_threshold: usize) -> Self {
        Console {
            out,
            pager,
            pager_threshold,
        }
    }

    /// Writes one line of text.
    pub fn line(&mut self, text: impl Display) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            warn!(error = %e, "failed to write to the console");
        }
    }

    /// Writes a rendered table, through the pager when it has too many rows.
    pub fn table(&mut self, rendered: &str, row_count: usize) {
        if row_count > self.pager_threshold {
            debug!(row_count, "paging table output");
            match self.pager.page(&format!("{}\n", rendered)) {
                Ok(()) => return,
                Err(e) => warn!(error = %e, "pager failed, writing directly"),
            }
        }
        self.line(rendered);
    }

    pub fn out(&self) -> &W {
        &self.out
    }

    pub fn pager(&self) -> &P {
        &self.pager
    }
}
