use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mission-chat")]
#[command(about = "Ask natural-language questions about space launch missions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chat HTTP API
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
    },
    /// Load a missions CSV into the dataset database
    Load {
        csv: PathBuf,
        /// Target database (defaults to MISSION_CHAT_DB or missions.db)
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Answer one question and print the bot turn as JSON
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await,
        Commands::Load { csv, db } => commands::load::run(&csv, db),
        Commands::Ask { question } => commands::ask::run(&question).await,
    }
}
