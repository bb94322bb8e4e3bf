use crate::model::{Outcome, Snapshot, SnapshotStatus};
use crate::sync::CycleOutcome;

fn outcome_label(o: Outcome) -> &'static str {
    match o {
        Outcome::Big => "TÀI",
        Outcome::Small => "XỈU",
    }
}

pub fn print_snapshot(s: &Snapshot) {
    eprintln!("\nFeed: {}", s.feed);
    if s.status == SnapshotStatus::AwaitingData {
        eprintln!("⏳ awaiting data");
        if let Some(err) = &s.sync.last_error {
            eprintln!("    last error: {}", err);
        }
        return;
    }

    if let Some(r) = &s.latest {
        eprintln!(
            "🎲 #{:<10} {}-{}-{} = {:<2} {}",
            r.id,
            r.dice[0],
            r.dice[1],
            r.dice[2],
            r.sum,
            outcome_label(r.outcome)
        );
    }

    match &s.prediction {
        Some(p) => eprintln!(
            "🔮 #{:<10} {} ({:.0}%)  {}",
            p.target_round_id,
            outcome_label(p.outcome),
            p.confidence * 100.0,
            p.rationale
        ),
        None => eprintln!("🔮 prediction not yet available"),
    }

    eprintln!("    History: {}", s.history);
    eprintln!(
        "    Accuracy: {}/{} ({:.1}%), streak {:+}",
        s.stats.total_correct,
        s.stats.total_resolved,
        s.win_rate * 100.0,
        s.stats.current_streak
    );
}

pub fn print_cycle(feed: &str, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Completed(r) => {
            let mut line = format!(
                "✅ {:<8} +{} rounds ({} dup, {} rejected)",
                feed, r.accepted, r.duplicates, r.rejected
            );
            if r.resolved_correct + r.resolved_incorrect > 0 {
                line.push_str(&format!(
                    ", resolved {} ✓ {} ✗",
                    r.resolved_correct, r.resolved_incorrect
                ));
            }
            eprintln!("{}", line);
        }
        CycleOutcome::Empty(r) => {
            eprintln!("⏭️  {:<8} empty batch ({} rejected)", feed, r.rejected);
        }
        CycleOutcome::FetchFailed { error } => {
            eprintln!("💥 {:<8} fetch failed: {}", feed, error);
        }
        CycleOutcome::Skipped => {
            eprintln!("⏭️  {:<8} skipped (cycle in flight)", feed);
        }
    }
}

pub fn print_summary(s: &Snapshot, cycles: u64) {
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} cycles, {} resolved, {} correct ({:.1}%), streak {:+}, {} expired",
        cycles,
        s.stats.total_resolved,
        s.stats.total_correct,
        s.win_rate * 100.0,
        s.stats.current_streak,
        s.expired_predictions
    );
}
