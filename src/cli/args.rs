//! Command-line argument parsing for the mate CLI.
//!
//! Arguments are parsed by hand; the surface is small enough that a parser
//! crate would add more than it saves.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List conversations
    List,
    /// Send a prompt and stream the reply
    Send {
        /// Continue this conversation instead of starting a new one
        chat: Option<String>,
        prompt: String,
    },
    /// Arguments could not be understood
    Invalid(String),
}

/// Command plus the global flags that apply to every command.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub command: CliCommand,
    /// Number of `-v` flags seen
    pub verbose: u8,
}

pub const USAGE: &str = "\
usage: mate [-v...] [--chat <id>] <prompt...>
       mate [-v...] --list
       mate --version

environment:
  MATE_BASE_URL     streaming server (default http://localhost:5555)
  MATE_GRAPHQL_URL  history endpoint (default <base>/graphql)
  MATE_TOKEN        bearer token
  MATE_LOG          log filter when no -v is given (default warn)";

/// Parse command-line arguments.
///
/// # Examples
///
/// ```
/// use mate::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["mate".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliArgs
where
    I: Iterator<Item = String>,
{
    let mut verbose: u8 = 0;
    let mut chat = None;
    let mut list = false;
    let mut words: Vec<String> = Vec::new();

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if !words.is_empty() {
            // Everything after the first prompt word belongs to the prompt
            words.push(arg);
            continue;
        }
        match arg.as_str() {
            "--version" | "-V" => {
                return CliArgs {
                    command: CliCommand::Version,
                    verbose,
                }
            }
            "--help" | "-h" => {
                return CliArgs {
                    command: CliCommand::Help,
                    verbose,
                }
            }
            "--list" | "-l" => list = true,
            "--chat" | "-c" => match args.next() {
                Some(id) => chat = Some(id),
                None => {
                    return CliArgs {
                        command: CliCommand::Invalid("--chat needs a conversation id".to_string()),
                        verbose,
                    }
                }
            },
            "--" => words.extend(args.by_ref()),
            flag if is_verbose_flag(flag) => {
                verbose = verbose.saturating_add((flag.len() - 1) as u8);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return CliArgs {
                    command: CliCommand::Invalid(format!("unknown option '{}'", flag)),
                    verbose,
                }
            }
            _ => words.push(arg),
        }
    }

    let command = if list {
        CliCommand::List
    } else if words.is_empty() {
        CliCommand::Help
    } else {
        CliCommand::Send {
            chat,
            prompt: words.join(" "),
        }
    };
    CliArgs { command, verbose }
}

fn is_verbose_flag(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v')
}
