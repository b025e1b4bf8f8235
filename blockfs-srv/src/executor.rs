// CLASSIFICATION: COMMUNITY
// Filename: executor.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Runs parsed commands against a filesystem on behalf of one user.

use std::path::PathBuf;
use std::sync::Arc;

use blockfs::{EntryKind, FileSystem, FsResult, Session};
use log::{info, warn};

use crate::command::{parse_line, Command, HELP};

/// Text produced for one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Response body, possibly multi-line.
    pub body: String,
    /// The user asked to end the session.
    pub exit: bool,
}

impl Reply {
    fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            exit: false,
        }
    }
}

/// Per-user command runner owning one filesystem session.
///
/// Files left open are closed when the executor is dropped.
#[derive(Debug)]
pub struct Executor {
    user: String,
    session: Session,
    state_path: Option<PathBuf>,
}

impl Executor {
    /// Bind `user` to a fresh session on `fs`. Mutations are persisted to
    /// `state_path` when set.
    pub fn new(fs: Arc<FileSystem>, user: impl Into<String>, state_path: Option<PathBuf>) -> Self {
        Self {
            user: user.into(),
            session: Session::new(fs),
            state_path,
        }
    }

    /// Name announced by the client.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Parse and run one line. Failures are reported in the reply body.
    pub fn execute_line(&self, line: &str) -> Reply {
        info!("{}: {}", self.user, line.trim());
        let command = match parse_line(line) {
            Ok(command) => command,
            Err(err) => {
                warn!("{}: rejected line: {err}", self.user);
                return Reply::text(format!("error: {err}"));
            }
        };
        self.execute(&command)
    }

    /// Run an already parsed command.
    pub fn execute(&self, command: &Command) -> Reply {
        if matches!(command, Command::Exit) {
            return Reply {
                body: format!("Goodbye {}!", self.user),
                exit: true,
            };
        }
        match self.run(command) {
            Ok(body) => {
                if command.is_mutating() {
                    self.persist();
                }
                Reply::text(body)
            }
            Err(err) => {
                warn!("{}: {} failed: {err}", self.user, command.verb());
                Reply::text(format!("error: {err}"))
            }
        }
    }

    fn run(&self, command: &Command) -> FsResult<String> {
        let fs = self.session.fs();
        match command {
            Command::Mkdir { path } => {
                fs.mkdir(path)?;
                Ok(format!("created directory {path}"))
            }
            Command::Touch { path } => {
                fs.touch(path)?;
                Ok(format!("created file {path}"))
            }
            Command::Ls { path } => {
                let entries = self.session.list(path.as_deref().unwrap_or(""))?;
                if entries.is_empty() {
                    return Ok("(empty)".to_owned());
                }
                Ok(entries
                    .iter()
                    .map(|entry| match entry.kind {
                        EntryKind::Directory => format!("{}/", entry.name),
                        EntryKind::File => entry.name.clone(),
                    })
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Command::Mv { src, dest } => {
                fs.move_file(src, dest)?;
                Ok(format!("moved {src} to {dest}"))
            }
            Command::Rm { path } => {
                fs.delete(path)?;
                Ok(format!("deleted {path}"))
            }
            Command::Rmdir { path } => {
                let files = fs.rmdir(path)?;
                Ok(format!("removed {path} ({files} files)"))
            }
            Command::Open { path, mode } => {
                self.session.open(path, *mode)?;
                Ok(format!("opened {path} for {mode}"))
            }
            Command::Close { path } => {
                self.session.close(path)?;
                Ok(format!("closed {path}"))
            }
            Command::Write { path, data } => {
                self.session.write(path, data)?;
                Ok(format!("wrote {} characters to {path}", data.chars().count()))
            }
            Command::Read { path } => self.session.read(path),
            Command::Truncate { path, count } => {
                self.session.truncate(path, *count)?;
                Ok(format!("truncated {count} blocks from {path}"))
            }
            Command::Vtree => Ok(fs.render_tree().trim_end().to_owned()),
            Command::Vmap => {
                let stats = fs.stats();
                Ok(format!(
                    "{}\n{} of {} blocks free ({} characters each), {} files",
                    fs.render_block_map().trim_end(),
                    stats.free_blocks,
                    stats.block_count,
                    stats.block_size,
                    stats.files
                ))
            }
            Command::Help => Ok(HELP.to_owned()),
            Command::Exit => Ok(String::new()),
        }
    }

    fn persist(&self) {
        let Some(path) = &self.state_path else {
            return;
        };
        if let Err(err) = self.session.fs().save_snapshot(path) {
            warn!("failed to persist state to {}: {err}", path.display());
        }
    }
}
