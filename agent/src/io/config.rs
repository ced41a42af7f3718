//! Agent configuration stored as TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::AdsMode;
use crate::io::invoker::RetryPolicy;

/// Agent configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Directory where run traces and reports are written.
    pub trace_dir: PathBuf,

    /// Ads metrics aggregation level.
    pub ads_mode: AdsMode,

    /// How many belief updates to fold into each hypothesis rationale.
    pub rationale_depth: usize,

    pub tool: ToolConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolConfig {
    /// Per-invocation wall-clock budget in seconds.
    pub timeout_secs: u64,

    /// Total attempts per tool (initial call plus retries).
    pub max_attempts: u32,

    /// Base retry backoff in milliseconds, doubled per retry.
    pub backoff_ms: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_attempts: 2,
            backoff_ms: 500,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            trace_dir: PathBuf::from("traces"),
            ads_mode: AdsMode::Keyword,
            rationale_depth: 4,
            tool: ToolConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trace_dir.as_os_str().is_empty() {
            return Err(anyhow!("trace_dir must be non-empty"));
        }
        if self.rationale_depth == 0 {
            return Err(anyhow!("rationale_depth must be > 0"));
        }
        if self.tool.timeout_secs == 0 {
            return Err(anyhow!("tool.timeout_secs must be > 0"));
        }
        if self.tool.max_attempts == 0 {
            return Err(anyhow!("tool.max_attempts must be > 0"));
        }
        Ok(())
    }

    /// The retry policy this configuration prescribes for tool calls.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.tool.timeout_secs),
            max_attempts: self.tool.max_attempts,
            backoff: Duration::from_millis(self.tool.backoff_ms),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    if !path.exists() {
        let cfg = AgentConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &AgentConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, AgentConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let cfg = AgentConfig {
            ads_mode: AdsMode::Campaign,
            tool: ToolConfig {
                max_attempts: 3,
                ..ToolConfig::default()
            },
            ..AgentConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = AgentConfig {
            tool: ToolConfig {
                timeout_secs: 0,
                ..ToolConfig::default()
            },
            ..AgentConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn retry_policy_reflects_tool_settings() {
        let cfg = AgentConfig {
            tool: ToolConfig {
                timeout_secs: 5,
                backoff_ms: 100,
                ..ToolConfig::default()
            },
            ..AgentConfig::default()
        };
        let policy = cfg.retry_policy();
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert_eq!(policy.backoff, Duration::from_millis(100));
    }
}
