use crate::error::{Result, VoteError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Voting on a resolution lasts exactly four days from promotion.
pub const DEFAULT_VOTING_DURATION_SECS: i64 = 4 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// The API rejects anonymous clients; identify the operator here.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.nationstates.net".to_string()
}

fn default_user_agent() -> String {
    "WA voting recorder (votewatch)".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_request_interval_ms() -> u64 {
    700
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            page_size: default_page_size(),
            request_interval_ms: default_request_interval_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Chambers polled each tick, in this order.
    #[serde(default = "default_chambers")]
    pub chambers: Vec<String>,
    #[serde(default = "default_voting_duration")]
    pub voting_duration_secs: i64,
    /// How far back the event log is still served.
    #[serde(default = "default_log_retention")]
    pub log_retention_secs: i64,
    #[serde(default)]
    pub api: ApiConfig,
}

fn default_version() -> u32 {
    1
}

fn default_chambers() -> Vec<String> {
    vec!["1".to_string(), "2".to_string()]
}

fn default_voting_duration() -> i64 {
    DEFAULT_VOTING_DURATION_SECS
}

fn default_log_retention() -> i64 {
    7 * 24 * 60 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            chambers: default_chambers(),
            voting_duration_secs: default_voting_duration(),
            log_retention_secs: default_log_retention(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(VoteError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.chambers.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no chambers configured; ticks will do nothing".to_string(),
            });
        }
        for chamber in &self.chambers {
            if paths::validate_chamber(chamber).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("invalid chamber id '{chamber}'"),
                });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for chamber in &self.chambers {
            if !seen.insert(chamber) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("chamber '{chamber}' listed more than once"),
                });
            }
        }

        if self.voting_duration_secs <= 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "voting_duration_secs must be positive (got {})",
                    self.voting_duration_secs
                ),
            });
        }

        // Closed votes are backfilled up to an hour late, so the log has to
        // reach back at least one full voting period.
        if self.log_retention_secs < self.voting_duration_secs {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "log_retention_secs ({}) is shorter than the voting duration ({}); \
                     late votes may be unrecoverable",
                    self.log_retention_secs, self.voting_duration_secs
                ),
            });
        }

        if self.api.page_size == 0 || self.api.page_size > 200 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "api.page_size must be between 1 and 200 (got {})",
                    self.api.page_size
                ),
            });
        }

        if self.api.user_agent.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "api.user_agent is empty; the API rejects anonymous clients".into(),
            });
        }

        let base_url = &self.api.base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("api.base_url '{base_url}' is not an http(s) URL"),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        Config::default().save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.chambers, vec!["1", "2"]);
        assert_eq!(loaded.voting_duration_secs, 345_600);
        assert_eq!(loaded.api.page_size, 100);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_yaml::from_str("chambers: ['2']\napi:\n  page_size: 50\n").unwrap();
        assert_eq!(cfg.chambers, vec!["2"]);
        assert_eq!(cfg.api.page_size, 50);
        assert_eq!(cfg.api.request_interval_ms, 700);
        assert_eq!(cfg.voting_duration_secs, DEFAULT_VOTING_DURATION_SECS);
    }

    #[test]
    fn load_without_init() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(Config::load(dir.path()), Err(VoteError::NotInitialized)));
    }

    #[test]
    fn default_config_is_clean() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::default();
        cfg.chambers = vec!["1".to_string(), "1".to_string(), "../x".to_string()];
        cfg.api.page_size = 0;
        cfg.api.user_agent = " ".to_string();
        cfg.log_retention_secs = 60;

        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 4);
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("log_retention_secs")));
    }
}
