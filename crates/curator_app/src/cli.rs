use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CONFIG_FILENAME;
use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "curator", about = "Browse and curate company collections", version)]
pub struct Cli {
    /// API base URL (can also be set via CURATOR_API_BASE_URL)
    #[arg(short, long, env = "CURATOR_API_BASE_URL", global = true)]
    pub server: Option<String>,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILENAME, global = true)]
    pub config: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List collections with their sizes
    Collections,
    /// Show one page of a collection
    Show(PageArgs),
    /// Mark a company as liked (or unliked with --unlike)
    Like {
        #[command(flatten)]
        page: PageArgs,
        company_id: i64,
        #[arg(long)]
        unlike: bool,
    },
    /// Copy companies from one collection into another and follow progress
    Transfer {
        /// Source collection id or name
        source: String,
        /// Target collection id or name
        target: String,
        /// Company ids to copy; omit for the whole collection
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        ids: Vec<i64>,
        /// Return once the job is queued
        #[arg(long)]
        no_wait: bool,
    },
    /// Create an empty collection
    Create { name: String },
    /// Delete a collection
    Delete {
        /// Collection id or name
        collection: String,
    },
    /// Remove companies from a collection
    Remove {
        /// Collection id or name
        collection: String,
        #[arg(required = true, value_delimiter = ',', num_args = 1..)]
        ids: Vec<i64>,
    },
    /// Inspect or write the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct PageArgs {
    /// Collection id or name
    pub collection: String,
    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    pub page: u64,
    /// Case-insensitive filter over the loaded page
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration
    Show,
    /// Write the resolved configuration to the config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}
