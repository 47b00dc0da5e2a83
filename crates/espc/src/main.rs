//! espc: ESP (ECMA Server Page) to JavaScript translator.

mod cli;
mod config;
mod orchestrator;

use clap::Parser;
use cli::Args;
use miette::Result;

fn main() -> Result<()> {
    let args = Args::parse();
    match orchestrator::run(args) {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
