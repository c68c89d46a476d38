use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

mod cancel;
mod capture;
mod context;
mod error;
mod journal;
mod models;
mod paths;
mod prompt;
mod restore;
mod script;
mod selector;
mod snapshot;
mod tmux;
mod tmux_conf;
mod ui;

use crate::context::AppContext;
use crate::error::Error;
use crate::paths::Paths;
use crate::prompt::Prompter;

#[derive(Parser)]
#[command(
    name = "tforge",
    author,
    version,
    about = "Capture tmux layouts into reusable scripts",
    long_about = None,
    arg_required_else_help = true
)]
struct Cli {
    /// Base directory used instead of the home directory
    #[arg(long, global = true, env = "TFORGE_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// tmux binary to run
    #[arg(long = "tmux-bin", global = true, env = "TFORGE_TMUX", default_value = "tmux")]
    tmux_bin: String,

    /// Abort external commands after this many seconds
    #[arg(long, global = true, env = "TFORGE_TIMEOUT", value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a tmux session and generate a reusable script
    Capture(CaptureArgs),

    /// Restore a captured session from ~/.tforge/journal.json
    Restore(RestoreArgs),
}

#[derive(Args)]
struct CaptureArgs {
    /// tmux session name to capture
    #[arg(long)]
    session: Option<String>,

    /// Name to save the generated script as (default: session name)
    #[arg(long)]
    name: Option<String>,

    /// Bind prefix + KEY to the script; empty to skip
    #[arg(long)]
    key: Option<String>,

    /// Do not modify ~/.tmux.conf
    #[arg(long)]
    no_bind: bool,
}

#[derive(Args)]
struct RestoreArgs {
    /// Restore this saved session instead of picking one
    #[arg(long)]
    session: Option<String>,
}

fn init_tracing() {
    let filter = std::env::var("TFORGE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let paths = Paths::resolve(cli.home.as_deref())?;
    let inside_tmux = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
    let ctx = AppContext::new(
        paths,
        &cli.tmux_bin,
        inside_tmux,
        cli.timeout.map(Duration::from_secs),
    );
    ctx.cancel.cancel_on_interrupt()?;

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());

    match cli.command {
        Commands::Capture(args) => {
            let opts = capture::CaptureOptions {
                session: args.session,
                name: args.name,
                key: args.key,
                no_bind: args.no_bind,
            };
            capture::capture_tmux_session(&ctx, opts, &mut prompter)
        }
        Commands::Restore(args) => restore::restore_tmux_session(&ctx, args.session, &mut prompter),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<Error>() {
            Some(Error::UserCancelled(what)) => {
                ui::info(format!("{what} cancelled"));
                ExitCode::SUCCESS
            }
            _ => {
                ui::error(format!("{err:#}"));
                ExitCode::FAILURE
            }
        },
    }
}
