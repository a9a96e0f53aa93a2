use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rundown_types::ParserSettings;
use tracing_subscriber::filter::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(version, about = "Turn rundowns and summaries for KoLmafia ascension logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse session logs, preparsed rundowns or XML sessions
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Keep reading past the end of the ascension
        #[arg(long)]
        old_counting: bool,
        /// Ignore `Note:` lines
        #[arg(long)]
        no_notes: bool,
        /// Print summaries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the settings file and its contents
    Config,
}

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let settings: ParserSettings = confy::load("rundown", None).unwrap_or_default();

    let result = match cli.command {
        Commands::Parse {
            files,
            old_counting,
            no_notes,
            json,
        } => {
            let old_counting = old_counting || settings.use_old_ascension_counting;
            let notes = !no_notes && settings.include_log_notes;
            let settings = settings
                .with_old_ascension_counting(old_counting)
                .with_log_notes(notes);
            commands::parse_files(&files, &settings, json)
        }
        Commands::Config => commands::show_settings(&settings),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
