//! Tests for configuration handling.

use std::fs;
use tempfile::TempDir;
use weave_utils::{Config, LinkerOptions};

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert!(config.linker.inlining);
    assert!(config.linker.cleanup);
    assert_eq!(config.linker.max_cleanup_iterations, 10);
}

#[test]
fn test_missing_keys_use_defaults() {
    let config = Config::parse("[linker]\ninlining = false\n").unwrap();
    assert!(!config.linker.inlining);
    assert!(config.linker.cleanup);
    assert_eq!(config.linker.max_cleanup_iterations, 10);

    let empty = Config::parse("").unwrap();
    assert_eq!(empty, Config::default());
}

#[test]
fn test_invalid_config_is_rejected() {
    assert!(Config::parse("[linker]\ninlining = \"yes\"\n").is_err());
}

#[test]
fn test_config_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("weave.toml");

    let config = Config {
        linker: LinkerOptions {
            cleanup: false,
            max_cleanup_iterations: 3,
            ..LinkerOptions::default()
        },
    };
    config.save(&config_path).unwrap();

    let loaded = Config::load(&config_path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_find_from_subdirectory() {
    let temp_dir = TempDir::new().unwrap();
    let project_dir = temp_dir.path();

    let config = Config {
        linker: LinkerOptions::without_inlining(),
    };
    config.save(project_dir.join("weave.toml")).unwrap();

    let sub_dir = project_dir.join("src").join("aspects");
    fs::create_dir_all(&sub_dir).unwrap();

    let (found_config, found_dir) = Config::find_from(&sub_dir).unwrap();
    assert!(!found_config.linker.inlining);
    assert_eq!(found_dir, project_dir);
}

#[test]
fn test_config_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    assert!(Config::load(temp_dir.path().join("missing.toml")).is_err());
}
