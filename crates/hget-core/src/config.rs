use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Transport settings for the curl client (`[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Hard wall-clock limit for a whole request in seconds.
    pub timeout_secs: u64,
    /// Abort when throughput stays below this many bytes/s ...
    pub low_speed_limit: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Maximum number of redirects followed per request.
    pub max_redirections: u32,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 3600,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            max_redirections: 10,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/hget/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetterConfig {
    /// Add credentials from the user's `.netrc` to requests without user info.
    #[serde(default = "default_netrc")]
    pub netrc: bool,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_netrc() -> bool {
    true
}

impl Default for GetterConfig {
    fn default() -> Self {
        Self {
            netrc: default_netrc(),
            http: HttpConfig::default(),
        }
    }
}

impl GetterConfig {
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("hget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GetterConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GetterConfig::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, default_cfg.to_toml()?)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: GetterConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = GetterConfig::default();
        assert!(cfg.netrc);
        assert_eq!(cfg.http.connect_timeout_secs, 15);
        assert_eq!(cfg.http.timeout_secs, 3600);
        assert_eq!(cfg.http.max_redirections, 10);
        assert!(cfg.http.user_agent.is_none());
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = GetterConfig::default();
        cfg.http.user_agent = Some("hget/0.1".to_string());
        let parsed: GetterConfig = toml::from_str(&cfg.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: GetterConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, GetterConfig::default());
    }

    #[test]
    fn partial_http_section() {
        let toml = r#"
            netrc = false

            [http]
            timeout_secs = 120
            user_agent = "custom-agent"
        "#;
        let cfg: GetterConfig = toml::from_str(toml).unwrap();
        assert!(!cfg.netrc);
        assert_eq!(cfg.http.timeout_secs, 120);
        assert_eq!(cfg.http.connect_timeout_secs, 15);
        assert_eq!(cfg.http.user_agent.as_deref(), Some("custom-agent"));
    }
}
