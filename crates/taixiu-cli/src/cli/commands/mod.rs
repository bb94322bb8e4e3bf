use super::args::*;
use std::path::Path;

pub mod replay;
pub mod validate;
pub mod watch;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const COMMAND_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Init(args) => cmd_init(args),
        Command::Validate(args) => validate::run(args),
        Command::Replay(args) => replay::run(args).await,
        Command::Watch(args) => watch::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if write_sample_config_if_missing(&args.config)? {
        Ok(exit_codes::OK)
    } else {
        Ok(exit_codes::COMMAND_FAILED)
    }
}

/// Returns false when the file already exists; it is never overwritten.
fn write_sample_config_if_missing(path: &Path) -> anyhow::Result<bool> {
    if path.exists() {
        eprintln!("refusing to overwrite {} (already exists)", path.display());
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    taixiu_core::config::write_sample_config(path)?;
    eprintln!("created {}", path.display());
    Ok(true)
}
