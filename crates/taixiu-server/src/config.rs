use std::env;
use std::path::PathBuf;
use std::time::Duration;
use taixiu_core::config::WatchConfig;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub config_path: PathBuf,
    /// Overrides `poll.interval_ms` from the watch config when set.
    pub interval_ms: Option<u64>,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            config_path: PathBuf::from("taixiu.yaml"),
            interval_ms: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("TAIXIU_BIND") {
            cfg.bind = v;
        }
        if let Ok(v) = env::var("TAIXIU_CONFIG") {
            cfg.config_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("TAIXIU_INTERVAL_MS") {
            if let Ok(n) = v.parse() {
                cfg.interval_ms = Some(n);
            }
        }
        if let Ok(v) = env::var("TAIXIU_LOG") {
            cfg.log_level = v;
        }
        cfg
    }

    /// Scheduler period for every feed; `TAIXIU_INTERVAL_MS` wins over the file.
    pub fn poll_period(&self, watch: &WatchConfig) -> anyhow::Result<Duration> {
        watch
            .poll_period(self.interval_ms)
            .map_err(|e| anyhow::anyhow!("config error: {}", e))
    }
}
