use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of backend attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

impl RetryConfig {
    /// Convert to the runtime policy. The attempt budget is clamped to >= 1.
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/phishgate/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Remote inference endpoint receiving `{"data": ["<text>"]}` POSTs.
    pub backend_url: String,
    /// Connect timeout for one backend attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-attempt timeout (connect + transfer), in seconds.
    pub timeout_per_attempt_secs: u64,
    /// Answer trust-list matches locally without contacting the backend.
    pub trust_list_enabled: bool,
    /// Trusted-source list file; defaults to `trusted.txt` next to the config.
    #[serde(default)]
    pub trust_list_path: Option<PathBuf>,
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: "https://ajay1311-cyberswaraksha.hf.space/run/analyze_phishing"
                .to_string(),
            connect_timeout_secs: 10,
            timeout_per_attempt_secs: 30,
            trust_list_enabled: true,
            trust_list_path: None,
            listen_addr: "0.0.0.0:8080".to_string(),
            retry: None,
        }
    }
}

impl GatewayConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::to_policy)
            .unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout_per_attempt(&self) -> Duration {
        Duration::from_secs(self.timeout_per_attempt_secs)
    }

    /// Resolve the trust-list file path (configured or XDG default).
    pub fn trust_list_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.trust_list_path {
            return Ok(path.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("phishgate")?;
        Ok(xdg_dirs.get_config_home().join("trusted.txt"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("phishgate")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GatewayConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GatewayConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GatewayConfig = toml::from_str(&data)?;
    Ok(cfg)
}
