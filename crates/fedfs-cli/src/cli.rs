//! CLI argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fedfs - browse local and federated files as one namespace
#[derive(Parser, Debug)]
#[command(name = "fedfs", version, about = "Browse local and federated files as one namespace")]
pub struct Cli {
    /// Home directory holding config.toml and the listing cache (default: $FEDFS_HOME or ~/.fedfs)
    #[arg(long, value_name = "DIR", global = true)]
    pub home: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print metadata as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List all local and federated files
    Ls,
    /// Print a file's contents
    Cat { name: String },
    /// Show a file's metadata
    Info { name: String },
    /// Write a file from FILE, or stdin when omitted
    Put {
        name: String,
        file: Option<PathBuf>,
    },
    /// Delete a file
    Rm { name: String },
}
