pub mod orchestrator;
pub mod scheduler;
pub mod state;

pub use orchestrator::{CycleOutcome, CycleReport, SyncOrchestrator, SyncPhase};
pub use state::SessionState;
