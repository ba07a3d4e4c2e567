use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "parcel-session")]
#[command(about = "Local reporting over the parcel order database")]
#[command(version)]
struct Cli {
    /// Path to the order database
    #[arg(long, global = true, default_value_os_t = parcel_session::db::default_db_path())]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if needed and apply schema migrations
    Migrate,

    /// Show order totals per status
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search orders by a fragment of the name or phone (case-sensitive)
    Find {
        /// Text to look for
        keyword: String,
    },

    /// List orders still waiting for an administrator
    Pending,

    /// Show one order in full
    Show {
        /// Order id
        id: i64,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<u8> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => commands::migrate::run(&cli.db),
        Commands::Stats { json } => commands::stats::run(&cli.db, json),
        Commands::Find { keyword } => commands::find::run(&cli.db, &keyword),
        Commands::Pending => commands::pending::run(&cli.db),
        Commands::Show { id, json } => commands::show::run(&cli.db, id, json),
    }
}
