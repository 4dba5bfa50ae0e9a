//! sqlchat CLI entry point.

use clap::Parser;

use sqlchat::cli::{handle_error, Cli, Commands};
use sqlchat::infrastructure::config::ConfigLoader;
use sqlchat::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };
    if let Err(err) = LoggerImpl::init(&config.logging) {
        handle_error(err, cli.json);
    }

    let result = match cli.command {
        Commands::Serve(args) => sqlchat::cli::commands::serve::execute(args, config).await,
        Commands::Prep(command) => {
            sqlchat::cli::commands::prep::execute(command, config, cli.json).await
        }
        Commands::Ask(args) => sqlchat::cli::commands::ask::execute(args, config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
