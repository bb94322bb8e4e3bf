pub mod accuracy;
pub mod config;
pub mod engine;
pub mod errors;
pub mod history;
pub mod ledger;
pub mod model;
pub mod normalize;
pub mod patterns;
pub mod providers;
pub mod report;
pub mod sync;
