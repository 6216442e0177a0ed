use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "benchdesk")]
#[command(about = "Follow benchmarking tasks and answer their prompts from the terminal")]
#[command(version)]
pub struct Cli {
    /// RON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://127.0.0.1:8100
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long, value_enum)]
    pub transport: Option<TransportArg>,

    #[arg(long, value_enum)]
    pub log: Option<LogArg>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum number of lines kept in the log panel
    #[arg(long)]
    pub max_log_messages: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Attach to the task that is already running
    Follow {
        #[arg(long)]
        title: Option<String>,
        /// JSON array of events to replay before following
        #[arg(long)]
        previous_events: Option<PathBuf>,
        /// Critical warning to acknowledge, as event_id=message
        #[arg(long = "critical", value_parser = parse_field)]
        critical: Vec<(String, String)>,
    },
    /// Submit an action form and follow the task it starts
    Run {
        /// Endpoint path, e.g. /datasets/prepare
        endpoint: String,
        /// Form fields as name=value
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
        #[arg(long)]
        title: Option<String>,
        /// Ask "Are you sure you want to <QUESTION>" before submitting
        #[arg(long)]
        confirm: Option<String>,
    },
    /// List notifications and manage them interactively
    Notifications,
    /// Browse folders on the backend host
    Browse {
        #[arg(long)]
        with_files: bool,
    },
    /// Show a YAML field of an entity
    Yaml {
        entity: String,
        entity_uid: String,
        field: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportArg {
    Poll,
    Stream,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogArg {
    File,
    Terminal,
    Both,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}
