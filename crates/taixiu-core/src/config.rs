use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const MIN_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_version", rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            poll: PollConfig::default(),
            history: HistoryConfig::default(),
            engine: EngineConfig::default(),
            ledger: LedgerConfig::default(),
            snapshot: SnapshotConfig::default(),
            feeds: Vec::new(),
        }
    }
}

impl WatchConfig {
    pub fn feed(&self, name: &str) -> Option<&FeedConfig> {
        self.feeds.iter().find(|f| f.name == name)
    }

    /// Poll period, honoring an outside override (env or flag) under the same floor.
    pub fn poll_period(&self, override_ms: Option<u64>) -> Result<Duration, ConfigError> {
        let ms = match override_ms {
            Some(ms) => {
                check_interval("interval override", ms)?;
                ms
            }
            None => self.poll.interval_ms,
        };
        Ok(Duration::from_millis(ms))
    }

    /// Checks everything except the feed list.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        check_interval("poll.interval_ms", self.poll.interval_ms)?;
        if self.poll.timeout_ms == 0 {
            return Err(ConfigError("poll.timeout_ms must be > 0".into()));
        }
        if self.history.capacity < self.engine.window {
            return Err(ConfigError(format!(
                "history.capacity ({}) must be >= engine.window ({})",
                self.history.capacity, self.engine.window
            )));
        }
        if self.ledger.expiry_horizon == 0 || self.ledger.max_live == 0 {
            return Err(ConfigError(
                "ledger.expiry_horizon and ledger.max_live must be > 0".into(),
            ));
        }
        self.engine.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;

        if self.feeds.is_empty() {
            return Err(ConfigError("config has no feeds".into()));
        }
        let mut seen = HashSet::new();
        for f in &self.feeds {
            if f.name.trim().is_empty() {
                return Err(ConfigError("feed name must not be empty".into()));
            }
            if !seen.insert(f.name.as_str()) {
                return Err(ConfigError(format!("duplicate feed name '{}'", f.name)));
            }
            if !(f.url.starts_with("http://") || f.url.starts_with("https://")) {
                return Err(ConfigError(format!(
                    "feed '{}' url must be http(s): {}",
                    f.name, f.url
                )));
            }
        }
        Ok(())
    }
}

fn check_interval(what: &str, ms: u64) -> Result<(), ConfigError> {
    if ms < MIN_POLL_INTERVAL_MS {
        return Err(ConfigError(format!(
            "{} must be >= {} (got {})",
            what, MIN_POLL_INTERVAL_MS, ms
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            timeout_ms: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: crate::history::DEFAULT_CAPACITY,
        }
    }
}

/// Heuristic thresholds for the prediction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pattern window length L.
    pub window: usize,
    pub run_length: usize,
    pub alternation_length: usize,
    /// Checked in order; the first window reaching the threshold wins.
    pub majority_windows: Vec<usize>,
    pub majority_threshold: f64,
    pub pattern_confidence: f64,
    pub insufficient_confidence: f64,
    pub run_confidence: f64,
    pub alternation_confidence: f64,
    pub majority_confidence: f64,
    pub reversal_confidence: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: crate::patterns::DEFAULT_WINDOW,
            run_length: 4,
            alternation_length: 4,
            majority_windows: vec![5, 10, 20],
            majority_threshold: 0.70,
            pattern_confidence: 0.85,
            insufficient_confidence: 0.55,
            run_confidence: 0.70,
            alternation_confidence: 0.65,
            majority_confidence: 0.62,
            reversal_confidence: 0.52,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == 0 {
            return Err(ConfigError("engine.window must be > 0".into()));
        }
        if self.run_length < 2 || self.alternation_length < 2 {
            return Err(ConfigError(
                "engine.run_length and engine.alternation_length must be >= 2".into(),
            ));
        }
        if self.majority_windows.is_empty() || self.majority_windows.contains(&0) {
            return Err(ConfigError(
                "engine.majority_windows must be non-empty and positive".into(),
            ));
        }
        if !(self.majority_threshold > 0.5 && self.majority_threshold <= 1.0) {
            return Err(ConfigError(format!(
                "engine.majority_threshold must be in (0.5, 1.0] (got {})",
                self.majority_threshold
            )));
        }
        let confidences = [
            ("pattern_confidence", self.pattern_confidence),
            ("insufficient_confidence", self.insufficient_confidence),
            ("run_confidence", self.run_confidence),
            ("alternation_confidence", self.alternation_confidence),
            ("majority_confidence", self.majority_confidence),
            ("reversal_confidence", self.reversal_confidence),
        ];
        for (name, v) in confidences {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError(format!(
                    "engine.{name} must be within [0, 1] (got {v})"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Unresolved predictions trailing the latest round by more than this many ids expire.
    pub expiry_horizon: u64,
    pub max_live: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            expiry_horizon: 20,
            max_live: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub history_len: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { history_len: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub name: String,
    pub url: String,
}

pub fn load_config(path: &Path, strict: bool) -> Result<WatchConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))
}

pub fn parse_config(raw: &str, strict: bool) -> Result<WatchConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let mut cfg: WatchConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // YAML anchors and extension keys are allowed anywhere.
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| {
            let leaf = k.rsplit('.').next().unwrap_or(k.as_str());
            !leaf.starts_with('_') && !leaf.starts_with("x-")
        })
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(
            event = "config.unknown_fields",
            fields = ?meaningful_unknowns,
            "ignored unknown config fields"
        );
    }

    // 0 is the legacy spelling of the first schema.
    if cfg.version == 0 {
        cfg.version = SUPPORTED_CONFIG_VERSION;
    }
    if cfg.version != SUPPORTED_CONFIG_VERSION {
        return Err(ConfigError(format!(
            "unsupported config version {} (supported: 0, {})",
            cfg.version, SUPPORTED_CONFIG_VERSION
        )));
    }

    cfg.validate()?;
    Ok(cfg)
}

pub const SAMPLE_CONFIG: &str = r#"version: 1
poll:
  interval_ms: 5000   # one sync cycle per tick; overlapping ticks are skipped
  timeout_ms: 4000
history:
  capacity: 100       # rounds kept per feed
engine:
  window: 14
  run_length: 4
  alternation_length: 4
  majority_windows: [5, 10, 20]
  majority_threshold: 0.7
ledger:
  expiry_horizon: 20  # unresolved predictions this far behind are dropped
  max_live: 64
snapshot:
  history_len: 20
feeds:
  - name: tx
    url: "https://example.invalid/huddd"
  - name: md5
    url: "https://example.invalid/md5dd"
"#;

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError(format!(
            "refusing to overwrite existing file {}",
            path.display()
        )));
    }
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses_strict() {
        let cfg = parse_config(SAMPLE_CONFIG, true).unwrap();
        assert_eq!(cfg.feeds.len(), 2);
        assert_eq!(cfg.engine, EngineConfig::default());
        assert_eq!(cfg.feed("md5").unwrap().url, "https://example.invalid/md5dd");
    }

    #[test]
    fn test_strict_rejects_unknown_fields() {
        let raw = "version: 1\nfeeds:\n  - name: a\n    url: http://x\npolling: 3\n";
        let err = parse_config(raw, true).unwrap_err();
        assert!(err.0.contains("polling"), "{}", err);
        assert!(parse_config(raw, false).is_ok());
    }

    #[test]
    fn test_legacy_version_zero_accepted() {
        let raw = "version: 0\nfeeds:\n  - name: a\n    url: http://x\n";
        assert_eq!(parse_config(raw, true).unwrap().version, 1);
        let raw = "version: 7\nfeeds:\n  - name: a\n    url: http://x\n";
        assert!(parse_config(raw, true).is_err());
    }

    #[test]
    fn test_validation_rules() {
        let mut cfg = WatchConfig {
            feeds: vec![FeedConfig {
                name: "a".into(),
                url: "https://a".into(),
            }],
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());

        cfg.feeds.push(cfg.feeds[0].clone());
        assert!(cfg.validate().unwrap_err().0.contains("duplicate"));
        cfg.feeds.pop();

        cfg.history.capacity = 5;
        assert!(cfg.validate().is_err());
        cfg.history.capacity = 100;

        cfg.engine.majority_threshold = 0.5;
        assert!(cfg.validate().is_err());
        cfg.engine.majority_threshold = 0.7;

        cfg.poll.interval_ms = 100;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_poll_period_override_respects_floor() {
        let cfg = WatchConfig::default();
        assert_eq!(cfg.poll_period(None).unwrap(), Duration::from_millis(5000));
        assert_eq!(cfg.poll_period(Some(750)).unwrap(), Duration::from_millis(750));
        assert!(cfg.poll_period(Some(0)).unwrap_err().0.contains(">= 500"));
        assert!(cfg.poll_period(Some(499)).is_err());
    }

    #[test]
    fn test_no_feeds_is_an_error() {
        assert!(parse_config("version: 1\n", false)
            .unwrap_err()
            .0
            .contains("no feeds"));
    }
}
