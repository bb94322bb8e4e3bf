use anyhow::Context;
use serde_json::json;
use std::sync::Arc;
use taixiu_core::config::{load_config, WatchConfig};
use taixiu_core::engine::{PredictionEngine, SeededCoin};
use taixiu_core::providers::replay::ReplayFeed;
use taixiu_core::report::console;
use taixiu_core::sync::{CycleOutcome, SyncOrchestrator};

use super::exit_codes;
use crate::cli::args::ReplayArgs;

pub async fn run(args: ReplayArgs) -> anyhow::Result<i32> {
    let cfg = match &args.config {
        Some(path) => match load_config(path, false) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("config error: {}", e);
                return Ok(exit_codes::CONFIG_ERROR);
            }
        },
        None => WatchConfig::default(),
    };
    cfg.validate_settings()?;

    let feed = Arc::new(
        ReplayFeed::from_path(&args.rounds, args.batch)
            .with_context(|| format!("loading {}", args.rounds.display()))?,
    );
    let engine = match args.seed {
        Some(seed) => {
            PredictionEngine::with_coin(cfg.engine.clone(), Arc::new(SeededCoin::new(seed)))
        }
        None => PredictionEngine::new(cfg.engine.clone()),
    };
    let orch = SyncOrchestrator::with_engine(feed.clone(), &cfg, engine);
    let text = args.format != "json";

    let mut cycles = 0u64;
    let mut outcomes: Vec<CycleOutcome> = Vec::new();
    while feed.remaining().await > 0 {
        let outcome = orch.run_cycle().await;
        cycles += 1;
        if text {
            console::print_cycle(orch.name(), &outcome);
        }
        outcomes.push(outcome);
    }

    let snap = orch.peek(None).await;
    if text {
        console::print_snapshot(&snap);
        console::print_summary(&snap, cycles);
    } else {
        let output = json!({
            "feed": orch.name(),
            "cycles": cycles,
            "snapshot": snap,
            "outcomes": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    if snap.latest.is_none() {
        eprintln!("no usable rounds in {}", args.rounds.display());
        return Ok(exit_codes::COMMAND_FAILED);
    }
    Ok(exit_codes::OK)
}
