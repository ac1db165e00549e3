//! Command-line interface for timedquiz.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "timedquiz", version, about = "Timed multiple-choice quizzes in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz on stdin/stdout
    Run {
        /// Path to a .toml question bank (default: built-in bank)
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seconds allowed per question
        #[arg(long)]
        time_limit: Option<u64>,

        /// What to do with input for a question that already timed out: detach, discard
        #[arg(long)]
        late_input: Option<String>,

        /// Start immediately instead of waiting for Enter
        #[arg(long)]
        no_intro: bool,

        /// Directory to save the JSON report in
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Print a saved JSON report
    Show {
        /// Report JSON file
        #[arg(long)]
        report: PathBuf,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("timedquiz=info".parse().unwrap())
                .add_directive("timedquiz_core=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            bank,
            config,
            time_limit,
            late_input,
            no_intro,
            output,
        } => {
            commands::run::execute(commands::run::RunArgs {
                bank,
                config,
                time_limit,
                late_input,
                no_intro,
                output,
            })
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Show { report } => commands::show::execute(report),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
