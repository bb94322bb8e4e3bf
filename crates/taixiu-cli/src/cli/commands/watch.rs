use std::sync::Arc;
use taixiu_core::config::load_config;
use taixiu_core::providers::http::HttpFeed;
use taixiu_core::report::console;
use taixiu_core::sync::{scheduler, SyncOrchestrator};

use super::exit_codes;
use crate::cli::args::WatchArgs;

pub async fn run(args: WatchArgs) -> anyhow::Result<i32> {
    let cfg = match load_config(&args.config, false) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let Some(feed_cfg) = cfg.feed(&args.feed) else {
        let known: Vec<&str> = cfg.feeds.iter().map(|f| f.name.as_str()).collect();
        eprintln!(
            "config error: unknown feed '{}' (known: {})",
            args.feed,
            known.join(", ")
        );
        return Ok(exit_codes::CONFIG_ERROR);
    };

    let period = match cfg.poll_period(args.interval_ms) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let feed = HttpFeed::from_config(feed_cfg, cfg.poll.timeout_ms);
    let orch = Arc::new(SyncOrchestrator::new(Arc::new(feed), &cfg));
    let name = args.feed.clone();

    let mut cycles = 0u64;
    let looped = scheduler::run_loop(orch.clone(), period, args.cycles, |outcome, snap| {
        cycles += 1;
        console::print_cycle(&name, outcome);
        if outcome.is_completed() {
            console::print_snapshot(snap);
        }
    });

    tokio::select! {
        _ = looped => {}
        _ = tokio::signal::ctrl_c() => eprintln!("\ninterrupted"),
    }

    let snap = orch.peek(None).await;
    console::print_summary(&snap, cycles);
    Ok(exit_codes::OK)
}
