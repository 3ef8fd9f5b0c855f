//! Command-line argument parsing.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

/// Parsed CLI command to execute.
///
/// A missing URL falls back to the configured resource URL.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Print every snapshot of the collection
    Watch { url: Option<String> },
    /// Create an item
    Add { url: Option<String>, name: String },
    /// Delete one item
    Delete { url: Option<String>, id: String },
    /// Delete every item
    Clear { url: Option<String> },
    /// Arguments that do not form a command
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use realtime_bindings::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["realtime-bindings".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let args: Vec<String> = args.skip(1).collect();

    if args.iter().any(|a| a == "--version" || a == "-V") {
        return CliCommand::Version;
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        return CliCommand::Help;
    }

    let Some((command, rest)) = args.split_first() else {
        return CliCommand::Watch { url: None };
    };

    match (command.as_str(), rest) {
        ("watch", []) => CliCommand::Watch { url: None },
        ("watch", [url]) => CliCommand::Watch {
            url: Some(url.clone()),
        },
        ("add", [name]) => CliCommand::Add {
            url: None,
            name: name.clone(),
        },
        ("add", [url, name]) => CliCommand::Add {
            url: Some(url.clone()),
            name: name.clone(),
        },
        ("delete", [id]) => CliCommand::Delete {
            url: None,
            id: id.clone(),
        },
        ("delete", [url, id]) => CliCommand::Delete {
            url: Some(url.clone()),
            id: id.clone(),
        },
        ("clear", []) => CliCommand::Clear { url: None },
        ("clear", [url]) => CliCommand::Clear {
            url: Some(url.clone()),
        },
        ("watch" | "add" | "delete" | "clear", _) => {
            CliCommand::Invalid(format!("wrong number of arguments for `{}`", command))
        }
        _ => CliCommand::Invalid(format!("unknown command `{}`", command)),
    }
}

/// Usage text printed by `--help`.
pub const USAGE: &str = "\
usage: realtime-bindings [command]

commands:
  watch [url]            print the collection after every change (default)
  add [url] <name>       create an item
  delete [url] <id>      delete one item
  clear [url]            delete every item

options:
  -h, --help             show this help
  -V, --version          show version

environment:
  REALTIME_RESOURCE_URL           resource URL when none is given
  REALTIME_CONNECT_TIMEOUT_SECS   connect timeout
  REALTIME_WRITE_TIMEOUT_SECS     timeout for each write
  RUST_LOG                        log filter (default realtime_bindings=info)";
