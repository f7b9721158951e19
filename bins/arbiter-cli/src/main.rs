mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbiter-cli")]
#[command(about = "Arbiter CLI - Probe toolchains and judge submissions locally", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a languages.json overriding the built-in toolchain table
    #[arg(long, global = true)]
    languages: Option<PathBuf>,

    /// Per-test execution time limit in milliseconds
    #[arg(long, global = true, default_value = "5000")]
    time_limit_ms: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured languages and probe their toolchains
    Languages,

    /// Run a source file once with custom input
    Run {
        /// Source file to execute
        #[arg(short, long)]
        file: PathBuf,

        /// Language id (e.g. cpp, java, python)
        #[arg(short, long)]
        language: String,

        /// Input fed to the program's stdin (file path or literal text)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Judge a source file against a problem definition
    Judge {
        /// Source file to judge
        #[arg(short, long)]
        file: PathBuf,

        /// Language id (e.g. cpp, java, python)
        #[arg(short, long)]
        language: String,

        /// Problem definition JSON ({"problems": [...], "test_cases": [...]})
        #[arg(short, long)]
        problem: PathBuf,

        /// Problem id within the definition file (defaults to the only one)
        #[arg(long)]
        problem_id: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = commands::Context::new(cli.languages.as_deref(), cli.time_limit_ms)?;

    match cli.command {
        Commands::Languages => commands::languages(&ctx).await,
        Commands::Run {
            file,
            language,
            input,
        } => commands::run(&ctx, &file, &language, input.as_deref()).await,
        Commands::Judge {
            file,
            language,
            problem,
            problem_id,
        } => commands::judge(&ctx, &file, &language, &problem, problem_id).await,
    }
}
