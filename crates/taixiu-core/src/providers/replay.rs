use super::{extract_records, RoundFeed};
use crate::errors::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::path::Path;
use tokio::sync::Mutex;

/// Serves recorded upstream records in fixed-size batches, one batch per fetch.
/// Once drained, every fetch returns an empty batch.
pub struct ReplayFeed {
    name: String,
    batches: Mutex<VecDeque<Vec<Value>>>,
}

impl ReplayFeed {
    pub fn from_records(name: impl Into<String>, records: Vec<Value>, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        let mut batches = VecDeque::new();
        let mut it = records.into_iter().peekable();
        while it.peek().is_some() {
            batches.push_back(it.by_ref().take(batch_size).collect());
        }
        Self {
            name: name.into(),
            batches: Mutex::new(batches),
        }
    }

    /// Reads a JSON payload (any shape `extract_records` accepts) or JSON Lines.
    pub fn from_path<P: AsRef<Path>>(path: P, batch_size: usize) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("failed to open rounds file '{}': {}", path.display(), e)
        })?;

        let records = match serde_json::from_str::<Value>(&raw) {
            Ok(payload) => extract_records(payload)?,
            Err(_) => {
                let mut out = Vec::new();
                for (i, line) in raw.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let v: Value = serde_json::from_str(line)
                        .map_err(|e| anyhow::anyhow!("line {}: parse error: {}", i + 1, e))?;
                    out.push(v);
                }
                out
            }
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "replay".to_string());
        Ok(Self::from_records(name, records, batch_size))
    }

    pub async fn remaining(&self) -> usize {
        self.batches.lock().await.len()
    }
}

#[async_trait]
impl RoundFeed for ReplayFeed {
    async fn fetch(&self) -> Result<Vec<Value>, FetchError> {
        Ok(self.batches.lock().await.pop_front().unwrap_or_default())
    }

    fn feed_name(&self) -> &str {
        &self.name
    }
}
