use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn causticwall(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_causticwall"))
        .env("CAUSTICWALL_CONFIG_DIR", config_dir)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run causticwall")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn stored_dark_theme_resolves_to_dark_flag() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");

    let set = causticwall(&config_dir, &["theme", "set", "dark"]);
    assert!(set.status.success());
    let stored = fs::read_to_string(config_dir.join("preferences.toml")).unwrap();
    assert!(stored.contains("dark"), "unexpected preferences: {stored}");

    // The stored value wins over the desktop scheme.
    let get = causticwall(&config_dir, &["theme", "get", "--system", "light"]);
    assert!(get.status.success());
    assert_eq!(stdout(&get).trim(), "dark (flag 1.0)");
}

#[test]
fn cleared_preference_follows_system_light() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");

    assert!(causticwall(&config_dir, &["theme", "set", "dark"]).status.success());
    assert!(causticwall(&config_dir, &["theme", "clear"]).status.success());

    let get = causticwall(&config_dir, &["theme", "get", "--system", "light"]);
    assert!(get.status.success());
    assert_eq!(stdout(&get).trim(), "light (flag 0.0)");

    let get = causticwall(&config_dir, &["theme", "get", "--system", "dark"]);
    assert_eq!(stdout(&get).trim(), "dark (flag 1.0)");
}

#[test]
fn toggle_flips_and_persists() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");

    assert!(causticwall(&config_dir, &["theme", "set", "light"]).status.success());
    let toggled = causticwall(&config_dir, &["theme", "toggle"]);
    assert!(toggled.status.success());
    assert_eq!(stdout(&toggled).trim(), "dark (flag 1.0)");

    let get = causticwall(&config_dir, &["theme", "get"]);
    assert_eq!(stdout(&get).trim(), "dark (flag 1.0)");
}

#[test]
fn configured_default_applies_when_nothing_is_stored() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[theme]\ndefault = \"dark\"\n",
    )
    .unwrap();

    let get = causticwall(&config_dir, &["theme", "get", "--system", "light"]);
    assert!(get.status.success());
    assert_eq!(stdout(&get).trim(), "dark (flag 1.0)");
}

#[test]
fn invalid_configuration_is_reported() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[render]\ndownscale = 4.0\n").unwrap();

    let get = causticwall(&config_dir, &["theme", "get"]);
    assert!(!get.status.success());
    let stderr = String::from_utf8_lossy(&get.stderr);
    assert!(stderr.contains("downscale"), "unexpected stderr: {stderr}");
}
