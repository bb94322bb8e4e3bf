use serde_json::json;
use taixiu_core::config::{load_config, WatchConfig};

use super::exit_codes;
use crate::cli::args::ValidateArgs;

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    match load_config(&args.config, args.strict) {
        Ok(cfg) => {
            print_ok(&cfg, &args.format);
            Ok(exit_codes::OK)
        }
        Err(e) => {
            if args.format == "json" {
                let output = json!({
                    "ok": false,
                    "file": args.config,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                eprintln!("❌ config error: {}", e);
            }
            Ok(exit_codes::CONFIG_ERROR)
        }
    }
}

fn print_ok(cfg: &WatchConfig, format: &str) {
    if format == "json" {
        let output = json!({
            "ok": true,
            "version": cfg.version,
            "feeds": cfg.feeds,
            "poll": cfg.poll,
            "history": cfg.history,
            "engine": cfg.engine,
            "ledger": cfg.ledger,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
        );
        return;
    }

    eprintln!("✅ config ok (version {})", cfg.version);
    for f in &cfg.feeds {
        eprintln!("   feed {:<8} {}", f.name, f.url);
    }
    eprintln!(
        "   poll every {}ms (timeout {}ms), history {} rounds, window {}",
        cfg.poll.interval_ms, cfg.poll.timeout_ms, cfg.history.capacity, cfg.engine.window
    );
}
