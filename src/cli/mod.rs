//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{AskArgs, Cli, Commands, PrepCommands, ServeArgs};

use console::style;

/// Print a command error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": chain,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {}", style("Error:").red().bold(), err);
        for cause in err.chain().skip(1) {
            eprintln!("  {} {}", style("caused by:").dim(), cause);
        }
    }
    std::process::exit(1);
}
