//! chordwise: replay key input through the remap engine and action resolver.
//!
//! ```text
//! chordwise --mode insert j @300 jj
//! chordwise --config my.toml 3dw "<leader>w"
//! chordwise --tokens "abc<Esc>d<C-c>"
//! ```
//!
//! Logs go to `chordwise.log` in the working directory; set `RUST_LOG`
//! (e.g. `RUST_LOG=remap=debug,actions.dispatch=trace`) to see engine traces.

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use core_state::Mode;
use tracing_appender::non_blocking::WorkerGuard;

mod replay;

const LOG_FILE: &str = "chordwise.log";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StartMode {
    Normal,
    Insert,
    Visual,
    Replace,
}

impl From<StartMode> for Mode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Normal => Mode::Normal,
            StartMode::Insert => Mode::Insert,
            StartMode::Visual => Mode::Visual,
            StartMode::Replace => Mode::Replace,
        }
    }
}

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "chordwise", version, about = "Modal key-sequence resolution and remapping")]
struct Args {
    /// Key text to replay, in order. `@<ms>` lets that much time pass.
    pub keys: Vec<String>,
    /// Optional configuration file path (overrides discovery of `chordwise.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Mode the replay starts in.
    #[arg(long = "mode", value_enum, default_value = "normal")]
    pub mode: StartMode,
    /// Only show how each argument tokenizes into chords.
    #[arg(long = "tokens")]
    pub tokens: bool,
}

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let log_path = log_dir.join(LOG_FILE);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging();
    install_panic_hook();

    let config = core_config::load_from(args.config.clone())?;
    tracing::info!(
        target: "runtime",
        config_override = args.config.is_some(),
        config_path = ?config.path,
        bindings = config.file.bindings.total(),
        "startup"
    );

    if args.tokens {
        for text in &args.keys {
            println!("{}", replay::token_listing(text, &config.file.input.leader));
        }
        return Ok(());
    }

    for line in replay::run_script(&config.file, args.mode.into(), &args.keys) {
        println!("{line}");
    }
    Ok(())
}
