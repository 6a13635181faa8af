use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Event-sourced sketch logs: render, replay, export and publish.
#[derive(Debug, Clone, Parser)]
#[command(name = "sketchlog")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Project a log document onto a fresh canvas and write it as PNG
    Render {
        log: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Canvas width in pixels (defaults to config)
        #[arg(long)]
        width: Option<u32>,
        /// Canvas height in pixels (defaults to config)
        #[arg(long)]
        height: Option<u32>,
    },
    /// Replay a log one action per tick in real time
    Replay {
        log: PathBuf,
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Cancel after this many ticks
        #[arg(long)]
        stop_after: Option<usize>,
        /// Write the surface as it stands when the replay ends
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write PNG, log and archive to the export directory
    Export {
        log: PathBuf,
        /// Upload the archive and record its hash on the ledger
        #[arg(long)]
        publish: bool,
    },
    /// Print the hash most recently recorded on the ledger
    LedgerHash,
}
