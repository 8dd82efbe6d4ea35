pub mod cli;
pub mod commands;

use clap::Parser;
use cli::Quill;
use commands::handle_command;
use std::process;
use tracing_subscriber::EnvFilter;

/// Run the quill CLI application
pub fn run_main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Quill::parse();
    if let Err(e) = handle_command(args.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
