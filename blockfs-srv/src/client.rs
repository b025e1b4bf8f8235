// CLASSIFICATION: COMMUNITY
// Filename: client.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Blocking client for the blockfs TCP service.

use std::io::{self, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};

use crate::server::read_message;

/// Connected client session.
#[derive(Debug)]
pub struct FsClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "server closed the connection")
}

impl FsClient {
    /// Connect and announce `name`. Returns the client and the welcome text.
    pub fn connect(addr: impl ToSocketAddrs, name: &str) -> io::Result<(Self, String)> {
        let writer = TcpStream::connect(addr)?;
        let reader = BufReader::new(writer.try_clone()?);
        let mut client = Self { reader, writer };
        writeln!(client.writer, "{name}")?;
        client.writer.flush()?;
        let welcome = read_message(&mut client.reader)?.ok_or_else(closed)?;
        Ok((client, welcome))
    }

    /// Send one command line and wait for its reply.
    pub fn send(&mut self, line: &str) -> io::Result<String> {
        writeln!(self.writer, "{}", line.trim_end())?;
        self.writer.flush()?;
        read_message(&mut self.reader)?.ok_or_else(closed)
    }
}
