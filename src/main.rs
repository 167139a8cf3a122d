use clap::Parser;
use mscli::config::{self, Config, CONFIG_FILE, HISTORY_FILE};
use mscli::core::db::SqlServerConnection;
use mscli::core::Result;
use mscli::credentials::{self, ConnectOverrides, TerminalPrompter};
use mscli::pager::Console;
use mscli::query_editor::QueryEditor;
use mscli::session::{self, SessionState};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Interactive command line client for Microsoft SQL Server
#[derive(Debug, Parser)]
#[command(name = "mscli", version, about)]
struct Cli {
    /// Server host name or address
    #[arg(long)]
    host: Option<String>,

    /// Server TCP port
    #[arg(long)]
    port: Option<u16>,

    /// Login name
    #[arg(long)]
    username: Option<String>,

    /// Login password; prompted for without echo when omitted
    #[arg(long)]
    password: Option<String>,
}

impl From<Cli> for ConnectOverrides {
    fn from(cli: Cli) -> Self {
        ConnectOverrides {
            host: cli.host,
            port: cli.port,
            username: cli.username,
            password: cli.password,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with result tables
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting mscli...");

    match start(cli) {
        Ok(SessionState::Closed) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn start(cli: Cli) -> Result<SessionState> {
    let app_dir = config::ensure_app_dir()?;
    let Config { connection, ui } = config::load_config(app_dir.join(CONFIG_FILE))?;

    let params = credentials::resolve_params(cli.into(), &connection, &mut TerminalPrompter)?;
    let mut editor = QueryEditor::new(&ui, &app_dir.join(HISTORY_FILE))?;
    let mut console = Console::stdout(ui.pager_threshold);

    info!(host = %params.host, port = params.port, "connecting");
    Ok(session::run(
        &params,
        SqlServerConnection::open,
        &mut editor,
        &mut console,
    ))
}
