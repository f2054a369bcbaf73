use bwilcd::display;
use bwilcd::{Command, ConnectTarget, Level, Outcome, Session};
use bwilcd_gateway::{HttpConnector, load_config_or_default, resolve_download_dir};
use bwilcd_ports::Credentials;
use clap::Parser;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const PROMPT: &str = "bwilcd> ";

#[derive(Parser, Debug)]
#[command(name = "bwilcd")]
#[command(version)]
#[command(about = "Interactive client for ILCD-Network / SODA4LCA nodes")]
struct Cli {
    /// Node list (JSON); the built-in list is used when omitted or unreadable
    #[arg(long, short, env = "BWILCD_CONFIG")]
    config: Option<PathBuf>,

    /// Connect to this configured node (by name) on startup
    #[arg(long, short)]
    node: Option<String>,

    /// Datasets per page
    #[arg(long)]
    page_size: Option<u64>,

    /// Where stock archives are saved
    #[arg(long, env = "BWILCD_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long, overrides_with = "verify_tls")]
    insecure: bool,

    /// Verify TLS certificates
    #[arg(long, overrides_with = "insecure")]
    verify_tls: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never break the tables on stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "bwilcd=warn".into()))
        .init();

    let cli = Cli::parse();

    let (mut config, fallback) = load_config_or_default(cli.config.as_deref())?;
    if let Some(err) = fallback {
        eprintln!(
            "{}",
            format!("⚠️  Could not load config ({}); using built-in nodes", err).yellow()
        );
    }

    if let Some(page_size) = cli.page_size {
        config.client.page_size = page_size;
    }
    if cli.insecure {
        config.client.accept_invalid_certs = true;
    }
    if cli.verify_tls {
        config.client.accept_invalid_certs = false;
    }
    let download_dir = resolve_download_dir(
        cli.download_dir.as_deref(),
        config.client.download_dir.as_deref(),
    );
    tracing::debug!(?download_dir, page_size = config.client.page_size, "settings resolved");

    let connector = Arc::new(HttpConnector::new(config.client.clone()));
    let page_size = config.client.page_size;
    let startup = match cli.node.as_deref() {
        Some(name) => Some(Session::target_for(config.find(name)?)?),
        None => None,
    };
    let mut session = Session::new(connector, config, page_size, download_dir);

    let mut editor = DefaultEditor::new()?;
    show_nodes(&session);
    if let Some(target) = startup {
        if !connect(&mut session, &mut editor, target).await? {
            return Ok(());
        }
    }

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        };
        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }

        let result = session.execute(Command::parse(&line)).await;
        match result {
            Ok(Outcome::Quit) => break,
            Ok(outcome) => {
                if !handle(&mut session, &mut editor, outcome).await? {
                    break;
                }
            }
            Err(err) => println!("{}", display::render_error(&err.to_string())),
        }
    }

    println!("{}", "Goodbye!".cyan());
    Ok(())
}

/// Render an outcome, running the follow-up steps that need the terminal.
///
/// Returns `false` when the user asked to leave.
async fn handle(
    session: &mut Session,
    editor: &mut DefaultEditor,
    outcome: Outcome,
) -> anyhow::Result<bool> {
    match outcome {
        Outcome::ShowNodes => show_nodes(session),
        Outcome::ShowStocks => show_stocks(session),
        Outcome::ShowDatasets => show_datasets(session),
        Outcome::ShowDataset(detail) => {
            println!("{}", display::render_dataset(&detail));
            if let Err(ReadlineError::Interrupted | ReadlineError::Eof) =
                editor.readline("\nPress Enter to return to dataset list")
            {
                return Ok(false);
            }
            show_datasets(session);
        }
        Outcome::Help(_) => show_level(session),
        Outcome::Connect(target) => return connect(session, editor, target).await,
        Outcome::Download(stock) => {
            println!("{}", display::render_download_start(&stock));
            let progress = |received: u64, total: u64| {
                if let Some(line) = display::render_progress(received, total) {
                    print!("{}", line);
                    let _ = std::io::stdout().flush();
                }
            };
            match session.download(&stock, &progress).await {
                Ok(path) => println!("{}", display::render_download_done(&path)),
                Err(err) => println!(
                    "\n{}",
                    display::render_error(&format!("Download failed: {}", err))
                ),
            }
        }
        Outcome::Refreshed => {
            show_stocks(session);
            println!("{}", display::render_success("Stocks refreshed successfully"));
        }
        Outcome::Notice(message) => println!("{}", display::render_notice(message)),
        Outcome::Quit => return Ok(false),
        Outcome::Nothing => {}
    }
    Ok(true)
}

/// Ask for credentials when needed, connect, and offer retries
async fn connect(
    session: &mut Session,
    editor: &mut DefaultEditor,
    target: ConnectTarget,
) -> anyhow::Result<bool> {
    loop {
        let credentials = if target.needs_login() {
            match ask_login(editor)? {
                Some(answer) => answer,
                None => return Ok(false),
            }
        } else {
            target.credentials.clone()
        };

        println!("\n⟳ Connecting to server...");
        match session.connect(&target.url, credentials).await {
            Ok(_) => {
                println!("{}", "✓ Connected successfully!".green().bold());
                show_stocks(session);
                return Ok(true);
            }
            Err(err) => {
                println!("{}", display::render_error(&err.to_string()));
                if !err.is_connection_failure() || !ask_retry(editor)? {
                    return Ok(true);
                }
            }
        }
    }
}

/// `Ok(None)` when input was closed
fn ask_login(editor: &mut DefaultEditor) -> anyhow::Result<Option<Option<Credentials>>> {
    let Some(answer) = ask(editor, "Use authentication? (y/N): ")? else {
        return Ok(None);
    };
    if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        return Ok(Some(None));
    }

    loop {
        let Some(username) = ask(editor, "Username: ")? else {
            return Ok(None);
        };
        let Some(password) = ask(editor, "Password: ")? else {
            return Ok(None);
        };
        match Credentials::from_parts(
            Some(username.trim().to_string()),
            Some(password.trim().to_string()),
        ) {
            Ok(credentials) => return Ok(Some(credentials)),
            Err(err) => println!("{}", display::render_error(&err.to_string())),
        }
    }
}

fn ask_retry(editor: &mut DefaultEditor) -> anyhow::Result<bool> {
    Ok(match ask(editor, "Retry? (Y/n): ")? {
        Some(answer) => !matches!(answer.trim().to_lowercase().as_str(), "n" | "no"),
        None => false,
    })
}

fn ask(editor: &mut DefaultEditor, prompt: &str) -> anyhow::Result<Option<String>> {
    match editor.readline(prompt) {
        Ok(answer) => Ok(Some(answer)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

// =============================================================================
// Screens
// =============================================================================

fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", display::render_header());
}

fn show_nodes(session: &Session) {
    clear_screen();
    println!("{}", display::render_nodes(session.nodes()));
    println!("{}", display::render_help(Level::Nodes));
}

fn show_stocks(session: &Session) {
    clear_screen();
    println!("{}", display::render_stocks(session.stocks()));
    println!("{}", display::render_help(Level::Stocks));
}

fn show_datasets(session: &Session) {
    clear_screen();
    if let Some(stock) = session.current_stock() {
        println!("{}", display::render_stock_banner(stock));
    }
    if let Some(page) = session.last_page() {
        println!(
            "{}",
            display::render_datasets(page, session.page(), session.page_size(), session.query())
        );
    }
    println!("{}", display::render_help(Level::Datasets));
}

fn show_level(session: &Session) {
    match session.level() {
        Level::Nodes => show_nodes(session),
        Level::Stocks => show_stocks(session),
        Level::Datasets => show_datasets(session),
    }
}
