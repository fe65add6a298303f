// src/ingest/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "FEEDS_CONFIG_PATH";
const ENV_REVALIDATE: &str = "FEEDS_REVALIDATE_SECS";

fn default_revalidate_secs() -> u64 {
    6 * 3600
}
fn default_adapter_timeout_secs() -> u64 {
    10
}
fn default_response_budget_secs() -> u64 {
    15
}
/// OpenAlex routes requests carrying a contact address to its polite pool.
fn default_user_agent() -> String {
    concat!("topic-feeds/", env!("CARGO_PKG_VERSION"), " (contact@ssip-pl.ch)").to_string()
}

/// Base URLs of every upstream. Overridable so a deployment can point at a mirror.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamUrls {
    pub spaceflight: String,
    pub arxiv: String,
    pub pubmed: String,
    pub openalex: String,
    pub krebs_feed: String,
    pub bleeping_feed: String,
}

impl Default for UpstreamUrls {
    fn default() -> Self {
        Self {
            spaceflight: "https://api.spaceflightnewsapi.net/v4/articles/".into(),
            arxiv: "https://export.arxiv.org/api/query".into(),
            pubmed: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".into(),
            openalex: "https://api.openalex.org/works".into(),
            krebs_feed: "https://krebsonsecurity.com/feed/".into(),
            bleeping_feed: "https://www.bleepingcomputer.com/feed/".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FeedsConfig {
    /// How long a per-topic result is served from cache before the pipeline re-runs.
    #[serde(default = "default_revalidate_secs")]
    pub revalidate_secs: u64,
    /// Upper bound for one upstream call (one leaf of a fan-out).
    #[serde(default = "default_adapter_timeout_secs")]
    pub adapter_timeout_secs: u64,
    /// Response-time budget for a whole topic request. Must exceed the adapter timeout.
    #[serde(default = "default_response_budget_secs")]
    pub response_budget_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub upstreams: UpstreamUrls,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            revalidate_secs: default_revalidate_secs(),
            adapter_timeout_secs: default_adapter_timeout_secs(),
            response_budget_secs: default_response_budget_secs(),
            user_agent: default_user_agent(),
            upstreams: UpstreamUrls::default(),
        }
    }
}

impl FeedsConfig {
    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    pub fn response_budget(&self) -> Duration {
        Duration::from_secs(self.response_budget_secs)
    }

    /// A slow upstream must give up before the caller's budget runs out.
    pub fn validate(&self) -> Result<()> {
        if self.revalidate_secs == 0 {
            bail!("revalidate_secs must be > 0");
        }
        if self.adapter_timeout_secs == 0 {
            bail!("adapter_timeout_secs must be > 0");
        }
        if self.adapter_timeout_secs >= self.response_budget_secs {
            bail!(
                "adapter_timeout_secs ({}) must be shorter than response_budget_secs ({})",
                self.adapter_timeout_secs,
                self.response_budget_secs
            );
        }
        if self.user_agent.trim().is_empty() {
            bail!("user_agent must not be empty");
        }
        Ok(())
    }

    fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(raw) = std::env::var(ENV_REVALIDATE) {
            self.revalidate_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_REVALIDATE}={raw:?} is not a number"))?;
        }
        Ok(self)
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_config_from(path: &Path) -> Result<FeedsConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feeds config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_config(&content, ext.as_str())?.apply_env_overrides()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config using env var + fallbacks:
/// 1) $FEEDS_CONFIG_PATH
/// 2) config/feeds.toml
/// 3) config/feeds.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<FeedsConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        }
        return Err(anyhow!("{ENV_PATH} points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/feeds.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/feeds.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    let cfg = FeedsConfig::default().apply_env_overrides()?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_config(s: &str, hint_ext: &str) -> Result<FeedsConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing feeds config json");
    }
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!(toml_err).context("unsupported feeds config format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config(
            r#"
revalidate_secs = 60
[upstreams]
arxiv = "http://localhost:9000/api/query"
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.revalidate_secs, 60);
        assert_eq!(cfg.adapter_timeout_secs, 10);
        assert_eq!(cfg.upstreams.arxiv, "http://localhost:9000/api/query");
        assert_eq!(cfg.upstreams.pubmed, UpstreamUrls::default().pubmed);
    }

    #[test]
    fn json_is_accepted_without_hint() {
        let cfg = parse_config(r#"{"adapter_timeout_secs": 3}"#, "").unwrap();
        assert_eq!(cfg.adapter_timeout_secs, 3);
    }

    #[test]
    fn default_user_agent_carries_a_contact() {
        let ua = FeedsConfig::default().user_agent;
        assert!(ua.starts_with("topic-feeds/"), "{ua}");
        assert!(ua.ends_with("(contact@ssip-pl.ch)"), "{ua}");
    }

    #[test]
    fn adapter_timeout_must_be_below_budget() {
        let cfg = FeedsConfig {
            adapter_timeout_secs: 15,
            response_budget_secs: 15,
            ..FeedsConfig::default()
        };
        assert!(cfg.validate().is_err());
        assert!(FeedsConfig::default().validate().is_ok());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_PATH);
        env::remove_var(ENV_REVALIDATE);

        // nothing on disk -> defaults
        assert_eq!(load_config_default().unwrap(), FeedsConfig::default());

        // env path wins, env override on top of file
        let p = tmp.path().join("feeds.json");
        fs::write(&p, r#"{"revalidate_secs": 120}"#).unwrap();
        env::set_var(ENV_PATH, p.display().to_string());
        assert_eq!(load_config_default().unwrap().revalidate_secs, 120);
        env::set_var(ENV_REVALIDATE, "30");
        assert_eq!(load_config_default().unwrap().revalidate_secs, 30);

        env::remove_var(ENV_PATH);
        env::remove_var(ENV_REVALIDATE);
        env::set_current_dir(&old).unwrap();
    }
}
