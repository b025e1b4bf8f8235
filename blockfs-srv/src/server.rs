// CLASSIFICATION: COMMUNITY
// Filename: server.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Line-oriented TCP front end, one thread per client.
//!
//! The client announces its name on the first line. Every server message,
//! the welcome included, ends with a line holding a single `.`; body lines
//! that start with `.` are sent with an extra leading `.`.
//!
//! Bodies travel line by line: `\r\n` arrives as `\n` and a trailing line
//! break is dropped. Content written through `write` is single-line, but a
//! snapshot may hold multi-line files whose `read` replies are therefore not
//! byte-exact.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result as AnyResult};
use blockfs::FileSystem;
use log::{debug, info, warn};

use crate::config::SrvConfig;
use crate::executor::Executor;

/// Message terminator line.
pub const TERMINATOR: &str = ".";

/// Write `body` followed by the terminator line.
pub fn write_message(out: &mut impl Write, body: &str) -> io::Result<()> {
    for line in body.lines() {
        if line.starts_with('.') {
            out.write_all(b".")?;
        }
        out.write_all(line.as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.write_all(TERMINATOR.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}

/// Read one message up to the terminator line. `None` on end of stream.
pub fn read_message(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut lines = Vec::new();
    let mut buf = String::new();
    loop {
        buf.clear();
        if input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        if line == TERMINATOR {
            return Ok(Some(lines.join("\n")));
        }
        lines.push(line.strip_prefix('.').unwrap_or(line).to_owned());
    }
}

/// Load the persisted tree into `fs`, keeping it empty when the snapshot is
/// missing or unreadable.
pub fn restore_state(fs: &FileSystem, state_path: &std::path::Path) {
    if !state_path.exists() {
        info!("no snapshot at {}, starting empty", state_path.display());
        return;
    }
    if let Err(err) = fs.load_snapshot(state_path) {
        warn!(
            "ignoring unreadable snapshot {}: {err}",
            state_path.display()
        );
    }
}

/// TCP service exposing one shared [`FileSystem`].
#[derive(Debug)]
pub struct FsServer {
    listener: TcpListener,
    fs: Arc<FileSystem>,
    state_path: Option<PathBuf>,
}

impl FsServer {
    /// Build the filesystem from `cfg`, restore its snapshot and bind.
    pub fn bind(cfg: &SrvConfig) -> AnyResult<Self> {
        let fs = Arc::new(FileSystem::new(cfg.fs)?);
        if let Some(path) = &cfg.state_path {
            restore_state(&fs, path);
        }
        Self::with_fs(fs, &cfg.listen, cfg.state_path.clone())
    }

    /// Serve an existing filesystem on `addr`.
    pub fn with_fs(
        fs: Arc<FileSystem>,
        addr: impl ToSocketAddrs + std::fmt::Display,
        state_path: Option<PathBuf>,
    ) -> AnyResult<Self> {
        let listener =
            TcpListener::bind(&addr).with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self {
            listener,
            fs,
            state_path,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Filesystem shared by every client.
    #[must_use]
    pub fn fs(&self) -> &Arc<FileSystem> {
        &self.fs
    }

    /// Accept clients until the listener fails.
    pub fn serve(self) -> AnyResult<()> {
        info!("blockfs listening on {}", self.local_addr()?);
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!("accept failed: {err}");
                    continue;
                }
            };
            let fs = Arc::clone(&self.fs);
            let state_path = self.state_path.clone();
            thread::spawn(move || {
                let peer = stream
                    .peer_addr()
                    .map_or_else(|_| "unknown".to_owned(), |addr| addr.to_string());
                if let Err(err) = handle_client(stream, fs, state_path) {
                    warn!("client {peer} dropped: {err}");
                }
            });
        }
        Ok(())
    }
}

fn handle_client(
    stream: TcpStream,
    fs: Arc<FileSystem>,
    state_path: Option<PathBuf>,
) -> io::Result<()> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);

    let mut name = String::new();
    if reader.read_line(&mut name)? == 0 {
        return Ok(());
    }
    let name = match name.trim() {
        "" => "anonymous",
        trimmed => trimmed,
    };
    info!("{name} connected");
    write_message(&mut writer, &format!("Welcome {name}!"))?;

    let executor = Executor::new(fs, name, state_path);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            debug!("{name} closed the connection");
            break;
        }
        let reply = executor.execute_line(&line);
        write_message(&mut writer, &reply.body)?;
        if reply.exit {
            break;
        }
    }
    info!("{} disconnected", executor.user());
    Ok(())
}
