//! templator CLI entry point
//!
//! Parses the command line, runs the selected command and prints a
//! user-friendly report when it fails:
//! - `check` - compile every template in a directory
//! - `render` - render one template with JSON data

use anyhow::Result;
use clap::Parser;
use templator::cli;
use templator::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
