// tests/ingest_config.rs
use std::{env, fs};

use topic_feeds::ingest::config::{load_config_default, load_config_from};
use topic_feeds::FeedsConfig;

#[serial_test::serial]
#[test]
fn parse_toml_and_json_paths() {
    env::remove_var("FEEDS_REVALIDATE_SECS");
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("feeds.toml");
    fs::write(
        &p_toml,
        r#"
revalidate_secs = 900
user_agent = "feeds-test/1"

[upstreams]
spaceflight = "http://127.0.0.1:8080/v4/articles/"
"#,
    )
    .unwrap();
    let cfg = load_config_from(&p_toml).unwrap();
    assert_eq!(cfg.revalidate_secs, 900);
    assert_eq!(cfg.user_agent, "feeds-test/1");
    assert_eq!(cfg.upstreams.spaceflight, "http://127.0.0.1:8080/v4/articles/");
    assert_eq!(cfg.response_budget_secs, 15);

    let p_json = dir.path().join("feeds.json");
    fs::write(&p_json, r#"{"adapter_timeout_secs": 4, "response_budget_secs": 8}"#).unwrap();
    let cj = load_config_from(&p_json).unwrap();
    assert_eq!(cj.adapter_timeout(), std::time::Duration::from_secs(4));
    assert_eq!(cj.revalidate_secs, FeedsConfig::default().revalidate_secs);
}

#[serial_test::serial]
#[test]
fn rejects_timeout_that_exceeds_budget() {
    env::remove_var("FEEDS_REVALIDATE_SECS");
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("feeds.toml");
    fs::write(&p, "adapter_timeout_secs = 20\nresponse_budget_secs = 15\n").unwrap();
    assert!(load_config_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // isolate CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var("FEEDS_CONFIG_PATH");
    env::remove_var("FEEDS_REVALIDATE_SECS");

    // 1) nothing on disk -> defaults
    assert_eq!(load_config_default().unwrap(), FeedsConfig::default());

    // 2) fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("feeds.toml"), "revalidate_secs = 600\n").unwrap();
    assert_eq!(load_config_default().unwrap().revalidate_secs, 600);

    // 3) env path takes precedence
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"revalidate_secs": 45}"#).unwrap();
    env::set_var("FEEDS_CONFIG_PATH", p_env.display().to_string());
    assert_eq!(load_config_default().unwrap().revalidate_secs, 45);

    // 4) a dangling env path is an error, not a silent fallback
    env::set_var("FEEDS_CONFIG_PATH", tmp.path().join("missing.toml").display().to_string());
    assert!(load_config_default().is_err());

    // 5) garbage in the revalidate override is an error too
    env::remove_var("FEEDS_CONFIG_PATH");
    env::set_var("FEEDS_REVALIDATE_SECS", "six hours");
    assert!(load_config_default().is_err());

    env::remove_var("FEEDS_REVALIDATE_SECS");
    env::set_current_dir(&old).unwrap();
}
