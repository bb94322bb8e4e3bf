use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use taixiu_core::config::load_config;
use taixiu_server::config;
use taixiu_server::server::Server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Watch config; falls back to TAIXIU_CONFIG, then taixiu.yaml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address; falls back to TAIXIU_BIND.
    #[arg(long)]
    bind: Option<String>,

    #[arg(long)]
    strict: bool,
}

use tracing_subscriber::{fmt, EnvFilter};

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = config::ServerConfig::from_env();
    if let Some(path) = args.config {
        cfg.config_path = path;
    }
    if let Some(bind) = args.bind {
        cfg.bind = bind;
    }

    init_logging(&cfg.log_level);

    let watch = load_config(&cfg.config_path, args.strict)?;
    tracing::info!(
        event = "server_start",
        config_path = %cfg.config_path.display(),
        bind = %cfg.bind,
        feeds = ?watch.feeds.iter().map(|f| f.name.as_str()).collect::<Vec<_>>()
    );

    Server::run(watch, cfg).await
}
