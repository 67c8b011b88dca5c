// tests/config_load.rs
use std::collections::HashMap;
use std::{env, fs};

use crypto_news_relay::config::{AppConfig, ENV_CONFIG_PATH};
use crypto_news_relay::RelayError;

fn lookup(pairs: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    move |k| map.get(k).cloned()
}

#[serial_test::serial]
#[test]
fn default_path_then_env_path_then_env_overrides() {
    // isolate cwd so the repo's own config/ is never read
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    // 1) nothing on disk → built-in defaults
    let cfg = AppConfig::load_with(lookup(&[])).unwrap();
    assert_eq!(cfg.flash.window_minutes, 30);
    assert_eq!(cfg.feeds.len(), 11);

    // 2) ./config/relay.toml is picked up
    fs::create_dir_all("config").unwrap();
    fs::write(
        "config/relay.toml",
        r#"
feeds = ["https://a.test/rss"]
[flash]
window_minutes = 15
ledger_cap = 100
"#,
    )
    .unwrap();
    let cfg = AppConfig::load_with(lookup(&[])).unwrap();
    assert_eq!(cfg.feeds, vec!["https://a.test/rss".to_string()]);
    assert_eq!(cfg.flash.window_minutes, 15);

    // 3) explicit path wins over the default location
    let other = tmp.path().join("other.toml");
    fs::write(&other, "[digest]\nhours = 12\n").unwrap();
    let cfg = AppConfig::load_with(lookup(&[(ENV_CONFIG_PATH, other.display().to_string())])).unwrap();
    assert_eq!(cfg.digest.hours, 12);
    assert_eq!(cfg.flash.window_minutes, 30);

    // 4) env beats the file
    let cfg = AppConfig::load_with(lookup(&[("POSTED_LINKS_CAP", "5".into())])).unwrap();
    assert_eq!(cfg.flash.ledger_cap, 5);
    assert_eq!(cfg.flash.window_minutes, 15);

    env::set_current_dir(old).unwrap();
}

#[serial_test::serial]
#[test]
fn malformed_file_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("bad.toml");
    fs::write(&p, "feeds = [unterminated").unwrap();
    let err = AppConfig::load_with(lookup(&[(ENV_CONFIG_PATH, p.display().to_string())])).unwrap_err();
    assert!(matches!(err, RelayError::Config(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn missing_webhook_is_reported_by_name() {
    let cfg = AppConfig::default();
    let err = cfg.flash_webhook().unwrap_err();
    assert_eq!(err.to_string(), "DISCORD_WEBHOOK_URL_30M is not set");
    assert_eq!(err.exit_code(), 2);
    assert!(cfg.digest_webhook().is_err());
}

#[test]
fn example_config_parses() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/relay.example.toml");
    let cfg = AppConfig::from_toml_file(&path).unwrap();
    assert!(!cfg.feeds.is_empty());
    assert!(cfg.flash.webhook_url.is_none());
}
