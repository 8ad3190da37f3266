//! Tests for configuration loading and config file resolution
//!
//! Tests that manipulate QUOTER_CONFIG are marked #[serial] so they run
//! sequentially, not in parallel.

use quoter_common::config::{load_config, load_config_file, resolve_config_path, TomlConfig};
use quoter_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_config_file(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_full_file_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quoter.toml");
    std::fs::write(
        &path,
        r#"
bind_addr = "0.0.0.0:8080"
database_path = "/var/lib/quoter/quoter.db"
music_dir = "/srv/music"
static_dir = "styles"
access_key_sha256 = "bf077926f1f26e2e3552001461c1e51ec078c7d488f1519bd570cc86f0efeb1a"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_config_file(&path).unwrap();
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.database_path, PathBuf::from("/var/lib/quoter/quoter.db"));
    assert_eq!(config.music_dir, Some(PathBuf::from("/srv/music")));
    assert_eq!(config.static_dir, Some(PathBuf::from("styles")));
    assert!(config.access_key_sha256.is_some());
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("quoter.toml");
    std::fs::write(&path, "bind_addr = ").unwrap();

    assert!(matches!(load_config_file(&path), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("from-env.toml");
    std::fs::write(&path, "bind_addr = \"127.0.0.1:9999\"\n").unwrap();

    env::set_var("QUOTER_CONFIG", &path);
    let resolved = resolve_config_path(None);
    let config = load_config(None).unwrap();
    env::remove_var("QUOTER_CONFIG");

    assert_eq!(resolved, Some(path));
    assert_eq!(config.bind_addr, "127.0.0.1:9999");
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    let dir = TempDir::new().unwrap();
    let cli_path = dir.path().join("cli.toml");
    let env_path = dir.path().join("env.toml");
    std::fs::write(&cli_path, "bind_addr = \"127.0.0.1:1111\"\n").unwrap();
    std::fs::write(&env_path, "bind_addr = \"127.0.0.1:2222\"\n").unwrap();

    env::set_var("QUOTER_CONFIG", &env_path);
    let config = load_config(Some(&cli_path)).unwrap();
    env::remove_var("QUOTER_CONFIG");

    assert_eq!(config.bind_addr, "127.0.0.1:1111");
}
