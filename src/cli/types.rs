//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sqlchat command line.
#[derive(Parser)]
#[command(name = "sqlchat")]
#[command(about = "sqlchat - ask questions of a SQL database in plain language", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Load CSV files into a database
    #[command(subcommand)]
    Prep(PrepCommands),

    /// Ask a single question against a database
    Ask(AskArgs),
}

/// Arguments for `serve`.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind to (defaults to the HOST setting)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (defaults to the PORT setting)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Log agent reasoning steps at info level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Load targets for `prep`.
#[derive(Subcommand, Debug, Clone)]
pub enum PrepCommands {
    /// Load every CSV file in a directory into a SQLite file
    Sqlite {
        /// Directory containing CSV files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// SQLite file to create or update
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load every CSV file in a directory into the configured MySQL database
    Mysql {
        /// Directory containing CSV files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

/// Arguments for `ask`.
#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    /// Database URI, e.g. sqlite:///mydata.db or mysql://user:pw@host:3306/db
    /// (defaults to the SQLite loader output)
    #[arg(long, env = "SQLCHAT_DB_URI")]
    pub db_uri: Option<String>,

    /// LLM provider: openai, groq, openrouter or github
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Log agent reasoning steps
    #[arg(short, long)]
    pub verbose: bool,
}
