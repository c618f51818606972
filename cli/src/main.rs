//! # trusty CLI
//!
//! Command-line interface for trusty - ask a chat model whether a package is
//! safe to depend on.
//!
//! ## Usage
//!
//! - `trusty is left-pad safe` - the words are joined into one question
//!
//! Only the answer is written to stdout; logs go to stderr.

use clap::Parser;
use std::process::ExitCode;

mod commands;
mod config;

use commands::run_command;
use config::CliConfigLoader;

/// trusty - dependency safety recommendations
#[derive(Parser)]
#[command(name = "trusty")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ask a chat model whether a package is safe to use")]
#[command(long_about = None)]
struct Cli {
    /// The question, e.g. `is left-pad safe`
    #[arg(required = true, trailing_var_arg = true)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    trusty_core::init_tracing();

    match run_command(cli.query, CliConfigLoader::new()).await {
        Ok(answer) => {
            println!("{}", answer);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let kind = err
                .downcast_ref::<trusty_core::Error>()
                .map_or("Error", trusty_core::Error::kind);
            tracing::error!(kind = kind, "{:#}", err);
            ExitCode::FAILURE
        }
    }
}
