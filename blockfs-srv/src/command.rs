// CLASSIFICATION: COMMUNITY
// Filename: command.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Line command parser for the blockfs console and TCP service.

use blockfs::OpenMode;
use thiserror::Error;

/// Commands accepted on a console line.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Command {
    Mkdir { path: String },
    Touch { path: String },
    Ls { path: Option<String> },
    Mv { src: String, dest: String },
    Rm { path: String },
    Rmdir { path: String },
    Open { path: String, mode: OpenMode },
    Close { path: String },
    Write { path: String, data: String },
    Read { path: String },
    Truncate { path: String, count: usize },
    Vtree,
    Vmap,
    Help,
    Exit,
}

impl Command {
    /// Verb token the command was parsed from.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Mkdir { .. } => "mkdir",
            Self::Touch { .. } => "touch",
            Self::Ls { .. } => "ls",
            Self::Mv { .. } => "mv",
            Self::Rm { .. } => "rm",
            Self::Rmdir { .. } => "rmdir",
            Self::Open { .. } => "open",
            Self::Close { .. } => "close",
            Self::Write { .. } => "write",
            Self::Read { .. } => "read",
            Self::Truncate { .. } => "truncate",
            Self::Vtree => "vtree",
            Self::Vmap => "vmap",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    /// Whether a successful run changes the persisted tree.
    #[must_use]
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Mkdir { .. }
                | Self::Touch { .. }
                | Self::Mv { .. }
                | Self::Rm { .. }
                | Self::Rmdir { .. }
                | Self::Write { .. }
                | Self::Truncate { .. }
        )
    }
}

/// Errors surfaced by the line parser.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line.
    #[error("empty command")]
    EmptyLine,
    /// Unknown verb token.
    #[error("unsupported command '{0}'")]
    InvalidVerb(String),
    /// A required operand is absent.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    /// An operand failed to parse.
    #[error("invalid value for argument {0}")]
    InvalidValue(&'static str),
}

/// Usage summary printed by `help`.
pub const HELP: &str = "\
mkdir <dir>               create a directory
touch <file>              create an empty file
ls [dir]                  list a directory (root by default)
mv <file> <dir>           move a file into a directory
rm <file>                 delete a file
rmdir <dir>               delete a directory and everything below it
open <file> r|w           open a file for reading or writing
close <file>              close a file
write <file> <data>       append data to a file open for writing
read <file>               print a file open for reading
truncate <file> <chunks>  drop the last chunks of a file open for writing
vtree                     show the directory tree
vmap                      show the block map
help                      show this text
exit                      end the session";

fn required<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<String, CommandError> {
    args.next()
        .map(str::to_owned)
        .ok_or(CommandError::MissingArgument(name))
}

/// Strip one pair of surrounding double quotes, if present.
fn unquote(data: &str) -> &str {
    data.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(data)
}

/// Parse a single console line.
pub fn parse_line(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CommandError::EmptyLine);
    }
    let (verb, remainder) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };
    let mut args = remainder.split_whitespace();

    match verb {
        "mkdir" => Ok(Command::Mkdir {
            path: required(&mut args, "dir")?,
        }),
        "touch" => Ok(Command::Touch {
            path: required(&mut args, "file")?,
        }),
        "ls" => Ok(Command::Ls {
            path: args.next().map(str::to_owned),
        }),
        "mv" => Ok(Command::Mv {
            src: required(&mut args, "file")?,
            dest: required(&mut args, "dir")?,
        }),
        "rm" => Ok(Command::Rm {
            path: required(&mut args, "file")?,
        }),
        "rmdir" => Ok(Command::Rmdir {
            path: required(&mut args, "dir")?,
        }),
        "open" => {
            let path = required(&mut args, "file")?;
            let mode = args
                .next()
                .ok_or(CommandError::MissingArgument("mode"))?
                .parse::<OpenMode>()
                .map_err(|_| CommandError::InvalidValue("mode"))?;
            Ok(Command::Open { path, mode })
        }
        "close" => Ok(Command::Close {
            path: required(&mut args, "file")?,
        }),
        "write" => {
            let (path, data) = match remainder.split_once(char::is_whitespace) {
                Some((path, data)) => (path, data.trim_start()),
                None => (remainder, ""),
            };
            if path.is_empty() {
                return Err(CommandError::MissingArgument("file"));
            }
            if data.is_empty() {
                return Err(CommandError::MissingArgument("data"));
            }
            Ok(Command::Write {
                path: path.to_owned(),
                data: unquote(data).to_owned(),
            })
        }
        "read" => Ok(Command::Read {
            path: required(&mut args, "file")?,
        }),
        "truncate" => {
            let path = required(&mut args, "file")?;
            let count = args
                .next()
                .ok_or(CommandError::MissingArgument("chunks"))?
                .parse::<usize>()
                .map_err(|_| CommandError::InvalidValue("chunks"))?;
            Ok(Command::Truncate { path, count })
        }
        "vtree" => Ok(Command::Vtree),
        "vmap" => Ok(Command::Vmap),
        "help" => Ok(Command::Help),
        "exit" | "quit" => Ok(Command::Exit),
        other => Err(CommandError::InvalidVerb(other.to_owned())),
    }
}
