//! Command-line front end for the mail-composition core.
//!
//! Lets a host editor (or a shell) drive address completion without linking
//! the library:
//!
//! ```bash
//! # Phase 1: where does the address under the cursor start?
//! mailcompose findstart --line 'To: Alice <alice@x.com>, jo' --col 27
//!
//! # Phase 2: candidates for the partial text
//! mailcompose complete jo
//!
//! # Both at once, as JSON
//! mailcompose at --line 'Cc: bo' --col 6
//!
//! # Point completion at another alias file
//! mailcompose config --set-alias-file ~/.mutt/aliases
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mailcompose_core::{Engine, MessageKind, Settings};

#[derive(Parser)]
#[command(name = "mailcompose")]
#[command(version)]
#[command(about = "Address completion for mail-composition buffers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Alias file to use for this invocation (overrides settings.json)
    #[arg(long, global = true)]
    alias_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the zero-based column where completion starts, or -3
    Findstart {
        /// Current line text
        #[arg(long, allow_hyphen_values = true)]
        line: String,

        /// Zero-based byte column of the cursor
        #[arg(long)]
        col: usize,
    },

    /// Print matching addresses, one per line
    Complete {
        /// Partial address text (empty lists every alias)
        #[arg(default_value = "", allow_hyphen_values = true)]
        base: String,
    },

    /// Run both completion phases and print JSON
    At {
        /// Current line text
        #[arg(long, allow_hyphen_values = true)]
        line: String,

        /// Zero-based byte column of the cursor
        #[arg(long)]
        col: usize,
    },

    /// Update and save settings, then print them
    Config {
        /// Absolute path of the alias file to use from now on
        #[arg(long, conflicts_with = "clear_alias_file")]
        set_alias_file: Option<PathBuf>,

        /// Go back to ~/.config/neomutt/aliases
        #[arg(long)]
        clear_alias_file: bool,

        /// Log level: trace, debug, info, warn, error
        #[arg(long)]
        log_level: Option<String>,
    },
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print the engine's message, if any, to stderr.
fn report(engine: &Engine) {
    if engine.message.is_empty() {
        return;
    }
    let prefix = match engine.message_kind {
        MessageKind::Warning => "warning",
        MessageKind::Info => "info",
    };
    eprintln!("mailcompose: {}: {}", prefix, engine.message);
}

fn configure(
    mut settings: Settings,
    set_alias_file: Option<PathBuf>,
    clear_alias_file: bool,
    log_level: Option<String>,
) -> Result<(), String> {
    if let Some(path) = set_alias_file {
        settings.set_alias_file(path)?;
    }
    if clear_alias_file {
        settings.clear_alias_file();
    }
    if let Some(level) = log_level {
        settings.set_log_level(&level)?;
    }
    settings.save().map_err(|e| {
        format!(
            "Failed to write {}: {}",
            Settings::settings_path().display(),
            e
        )
    })?;
    let json = serde_json::to_string_pretty(&settings).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

/// The global `--alias-file` only applies to completion commands.
fn check_args(cli: &Cli) -> Result<(), String> {
    if matches!(cli.command, Commands::Config { .. }) && cli.alias_file.is_some() {
        return Err(
            "--alias-file applies to one completion; use `config --set-alias-file` to save it"
                .to_string(),
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), String> {
    check_args(&cli)?;
    let mut settings = Settings::load();
    init_tracing(&settings);

    if let Commands::Config {
        set_alias_file,
        clear_alias_file,
        log_level,
    } = cli.command
    {
        return configure(settings, set_alias_file, clear_alias_file, log_level);
    }

    if let Some(path) = cli.alias_file {
        settings.set_alias_file(path)?;
    }
    let mut engine = Engine::with_settings(settings);

    match cli.command {
        Commands::Findstart { line, col } => {
            println!("{}", engine.find_start(&line, col).to_host_code());
        }
        Commands::Complete { base } => {
            for candidate in engine.complete_matches(&base) {
                println!("{}", candidate);
            }
        }
        Commands::At { line, col } => {
            let completion = engine.complete_at(&line, col);
            let json = serde_json::to_string(&completion).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Commands::Config { .. } => {}
    }
    report(&engine);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("mailcompose: {}", e);
            ExitCode::FAILURE
        }
    }
}
