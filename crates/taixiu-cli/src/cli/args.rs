use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "taixiu",
    version,
    about = "Ingest Tài/Xỉu rounds, predict the next one, track accuracy"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a starter config
    Init(InitArgs),
    /// Load and check a config
    Validate(ValidateArgs),
    /// Run recorded rounds through the full pipeline
    Replay(ReplayArgs),
    /// Poll a live feed
    Watch(WatchArgs),
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "taixiu.yaml")]
    pub config: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long, default_value = "taixiu.yaml", env = "TAIXIU_CONFIG")]
    pub config: PathBuf,

    /// Reject unknown config keys
    #[arg(long)]
    pub strict: bool,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReplayArgs {
    /// JSON payload or JSON Lines of raw upstream records
    #[arg(long)]
    pub rounds: PathBuf,

    /// Engine and ledger settings; built-in defaults when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Records delivered per cycle
    #[arg(long, default_value_t = 1)]
    pub batch: usize,

    /// Seed for the engine's coin flip
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct WatchArgs {
    #[arg(long, default_value = "taixiu.yaml", env = "TAIXIU_CONFIG")]
    pub config: PathBuf,

    /// Feed name from the config
    #[arg(long)]
    pub feed: String,

    /// Stop after N cycles (runs until ctrl-c otherwise)
    #[arg(long)]
    pub cycles: Option<u64>,

    /// Overrides poll.interval_ms
    #[arg(long, env = "TAIXIU_INTERVAL_MS")]
    pub interval_ms: Option<u64>,
}
