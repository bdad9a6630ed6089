//! Server configuration
//!
//! Loaded from a TOML file (path in `IDSCAN_CONFIG`), then patched from a few
//! environment variables. Every section falls back to its defaults.

use anyhow::{Context, Result};
use idscan_core::MergePolicy;
use idscan_ocr::PreprocessOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub ocr: OcrConfig,
    pub corrections: CorrectionsConfig,
    pub log: LogConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Largest accepted request body; captures arrive base64-encoded.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:5000".to_string(), max_body_bytes: 10 * 1024 * 1024 }
    }
}

/// Capture session lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is dropped.
    pub ttl_secs: u64,
    /// How often expired sessions are swept.
    pub sweep_secs: u64,
    pub merge_policy: MergePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_secs: 30 * 60, sweep_secs: 60, merge_policy: MergePolicy::Overwrite }
    }
}

impl SessionConfig {
    /// Fails when `ttl_secs` is beyond what `chrono::Duration` can hold.
    pub fn ttl(&self) -> Result<chrono::Duration> {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .with_context(|| format!("session.ttl_secs = {} is out of range", self.ttl_secs))
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_secs.max(1))
    }
}

/// Preprocessing and OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    #[serde(flatten)]
    pub preprocess: PreprocessOptions,
    /// Tesseract data directory; system default when unset.
    pub tessdata: Option<String>,
    pub lang: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self { preprocess: PreprocessOptions::default(), tessdata: None, lang: "eng".to_string() }
    }
}

/// Optional replacement correction tables
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrectionsConfig {
    pub normalizer: Option<PathBuf>,
    pub address: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Read the TOML file at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate().with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Checks values that parse but cannot be used.
    pub fn validate(&self) -> Result<()> {
        self.session.ttl()?;
        Ok(())
    }

    /// Apply `IDSCAN_BIND` and `IDSCAN_MERGE_POLICY` through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(bind) = lookup("IDSCAN_BIND") {
            self.server.bind = bind;
        }
        if let Some(policy) = lookup("IDSCAN_MERGE_POLICY") {
            self.session.merge_policy = policy.parse().map_err(anyhow::Error::msg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind, "0.0.0.0:5000");
        assert_eq!(config.session.merge_policy, MergePolicy::Overwrite);
        assert_eq!(config.ocr.preprocess.crop_margin, 0.1);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idscan.toml");
        std::fs::write(
            &path,
            r#"
            [session]
            merge_policy = "keep_existing"

            [ocr]
            crop_margin = 0.05
            lang = "eng+hin"

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.session.merge_policy, MergePolicy::KeepExisting);
        assert_eq!(config.session.ttl_secs, 1800);
        assert_eq!(config.ocr.preprocess.crop_margin, 0.05);
        assert_eq!(config.ocr.preprocess.max_dimension, 2800);
        assert_eq!(config.ocr.lang, "eng+hin");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn missing_file_is_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/idscan.toml"))).is_err());
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> =
            [("IDSCAN_BIND", "127.0.0.1:8080"), ("IDSCAN_MERGE_POLICY", "keep_existing")].into();
        let mut config = Config::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.session.merge_policy, MergePolicy::KeepExisting);
    }

    #[test]
    fn bad_merge_policy_override_is_error() {
        let mut config = Config::default();
        assert!(config.apply_env_overrides(|_| Some("whenever".to_string())).is_err());
    }

    #[test]
    fn ttl_conversion() {
        let s = SessionConfig { ttl_secs: 90, sweep_secs: 0, ..Default::default() };
        assert_eq!(s.ttl().unwrap(), chrono::Duration::seconds(90));
        assert_eq!(s.sweep_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn huge_ttl_is_error_not_panic() {
        let s = SessionConfig { ttl_secs: u64::MAX, ..Default::default() };
        assert!(s.ttl().is_err());
        let s = SessionConfig { ttl_secs: i64::MAX as u64, ..Default::default() };
        assert!(s.ttl().is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("idscan.toml");
        std::fs::write(&path, "[session]\nttl_secs = 9223372036854775807\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("ttl_secs"));
    }
}
