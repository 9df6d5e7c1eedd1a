//! linkdupe - duplicate file finder and hard-link deduplicator
//!
//! Entry point for the linkdupe CLI application.

use clap::Parser;
use linkdupe::{cli::Cli, error::StructuredError, logging::init_logging};

fn main() {
    // Parse command-line arguments; clap exits with 2 on usage errors
    let cli = Cli::parse();
    let json_errors = cli.json_errors;
    init_logging(cli.verbose, cli.quiet);

    match linkdupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = err.exit_code();

            if json_errors {
                let structured = StructuredError::new(&err);
                match serde_json::to_string_pretty(&structured) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
