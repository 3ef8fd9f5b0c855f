//! CLI for the shopping list demo.
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing
//! - Version display
//! - Watching, adding and deleting items
//!
//! # Usage
//!
//! ```ignore
//! use realtime_bindings::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args());
//! runtime.block_on(run_cli_command(command))?;
//! ```

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Run a parsed CLI command.
///
/// # Note
///
/// The `Version` command never returns as it calls `std::process::exit(0)`.
pub async fn run_cli_command(command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Invalid(message) => Err(eyre!("{}\n\n{}", message, USAGE)),
        CliCommand::Watch { url } => {
            let source = commands::connect(url.as_deref())?;
            let mut stdout = std::io::stdout();
            let state = commands::watch(&source, &mut stdout).await?;
            eprintln!("change feed {}", state);
            Ok(())
        }
        CliCommand::Add { url, name } => {
            let source = commands::connect(url.as_deref())?;
            let id = commands::add(&source, &name).await?;
            println!("{}", id);
            Ok(())
        }
        CliCommand::Delete { url, id } => {
            let source = commands::connect(url.as_deref())?;
            commands::delete(&source, &id).await
        }
        CliCommand::Clear { url } => {
            let source = commands::connect(url.as_deref())?;
            commands::clear(&source).await
        }
    }
}
