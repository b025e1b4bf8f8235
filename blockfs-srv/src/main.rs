// CLASSIFICATION: COMMUNITY
// Filename: main.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! `blockfs-srv` entry point: TCP service, local shell and remote client.

use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use blockfs::FileSystem;
use blockfs_srv::server::restore_state;
use blockfs_srv::{Executor, FsClient, FsServer, SrvConfig};
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(author = "Lukas Bower", version, about = "Block-backed in-memory filesystem", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Snapshot file restored at start and rewritten after each mutation.
    #[arg(long, value_name = "FILE", global = true)]
    state: Option<PathBuf>,

    /// Characters per block.
    #[arg(long, global = true)]
    block_size: Option<usize>,

    /// Blocks in the pool.
    #[arg(long, global = true)]
    block_count: Option<usize>,

    /// Append log output to this file instead of stderr.
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Raise log verbosity (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve the filesystem over TCP.
    Serve {
        /// Address to bind, e.g. 127.0.0.1:5050.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Run commands against a local filesystem from stdin.
    Shell {
        /// Name recorded in the operation log.
        #[arg(long, default_value = "local")]
        user: String,
    },
    /// Connect to a running service and forward stdin lines.
    Connect {
        /// Service address.
        #[arg(long, default_value = blockfs_srv::config::DEFAULT_LISTEN)]
        addr: String,
        /// Name announced to the service.
        #[arg(long)]
        user: String,
    },
}

fn init_logging(verbose: u8, log_file: Option<&PathBuf>) -> Result<()> {
    let default_level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format_timestamp_millis();
    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }
    let _ = builder.try_init();
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<SrvConfig> {
    let mut cfg = match &cli.config {
        Some(path) => SrvConfig::load(path)?,
        None => SrvConfig::default(),
    };
    cfg.apply_env()?;
    if let Some(state) = &cli.state {
        cfg.state_path = Some(state.clone());
    }
    if let Some(size) = cli.block_size {
        cfg.fs.block_size = size;
    }
    if let Some(count) = cli.block_count {
        cfg.fs.block_count = count;
    }
    if let Mode::Serve {
        listen: Some(listen),
    } = &cli.command
    {
        cfg.listen = listen.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run_shell(cfg: &SrvConfig, user: &str) -> Result<()> {
    let fs = Arc::new(FileSystem::new(cfg.fs)?);
    if let Some(path) = &cfg.state_path {
        restore_state(&fs, path);
    }
    let executor = Executor::new(fs, user, cfg.state_path.clone());
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            write!(stdout, "> ")?;
            stdout.flush()?;
            continue;
        }
        let reply = executor.execute_line(&line);
        writeln!(stdout, "{}", reply.body)?;
        if reply.exit {
            break;
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

fn run_client(addr: &str, user: &str) -> Result<()> {
    let (mut client, welcome) =
        FsClient::connect(addr, user).with_context(|| format!("failed to connect to {addr}"))?;
    println!("{welcome}");
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = client.send(&line)?;
        println!("{reply}");
        if line.trim() == "exit" || line.trim() == "quit" {
            break;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_ref())?;
    match &cli.command {
        Mode::Connect { addr, user } => run_client(addr, user),
        Mode::Shell { user } => {
            let cfg = resolve_config(&cli)?;
            run_shell(&cfg, user)
        }
        Mode::Serve { .. } => {
            let cfg = resolve_config(&cli)?;
            FsServer::bind(&cfg)?.serve()
        }
    }
}
