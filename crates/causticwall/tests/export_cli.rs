use std::process::Command;

use tempfile::TempDir;

fn mean_luma(path: &std::path::Path) -> f64 {
    let image = image::open(path).unwrap().to_luma8();
    let total: u64 = image.pixels().map(|pixel| u64::from(pixel.0[0])).sum();
    total as f64 / (image.width() * image.height()) as f64
}

#[test]
fn export_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("frame.png");

    let status = Command::new(env!("CARGO_BIN_EXE_causticwall"))
        .env("CAUSTICWALL_CONFIG_DIR", root.path().join("config"))
        .args(["export", "--size", "48x27", "--time", "1.5", "--output"])
        .arg(&output)
        .status()
        .expect("failed to run causticwall export");

    assert!(status.success());
    let image = image::open(&output).unwrap();
    assert_eq!((image.width(), image.height()), (48, 27));
}

#[test]
fn dark_export_is_darker_than_light() {
    let root = TempDir::new().unwrap();
    let light = root.path().join("light.png");
    let dark = root.path().join("dark.png");

    for (theme, path) in [("light", &light), ("dark", &dark)] {
        let status = Command::new(env!("CARGO_BIN_EXE_causticwall"))
            .env("CAUSTICWALL_CONFIG_DIR", root.path().join("config"))
            .args(["export", "--size", "32x18", "--pointer", "0.3,0.7", "--theme", theme])
            .arg("--output")
            .arg(path)
            .status()
            .expect("failed to run causticwall export");
        assert!(status.success());
    }

    assert!(mean_luma(&dark) < mean_luma(&light));
}

#[test]
fn export_rejects_malformed_size() {
    let root = TempDir::new().unwrap();
    let status = Command::new(env!("CARGO_BIN_EXE_causticwall"))
        .env("CAUSTICWALL_CONFIG_DIR", root.path().join("config"))
        .args(["export", "--size", "0x10", "--output"])
        .arg(root.path().join("never.png"))
        .status()
        .expect("failed to run causticwall export");

    assert!(!status.success());
    assert!(!root.path().join("never.png").exists());
}

#[test]
fn export_rejects_oversized_frame() {
    let root = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_causticwall"))
        .env("CAUSTICWALL_CONFIG_DIR", root.path().join("config"))
        .args(["export", "--size", "100000x100000", "--output"])
        .arg(root.path().join("huge.png"))
        .output()
        .expect("failed to run causticwall export");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("16384"));
    assert!(!root.path().join("huge.png").exists());
}

#[test]
fn exported_pointer_matches_requested_position() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("still.png");

    let status = Command::new(env!("CARGO_BIN_EXE_causticwall"))
        .env("CAUSTICWALL_CONFIG_DIR", root.path().join("config"))
        .args(["export", "--size", "16x9", "--time", "0.5"])
        .args(["--pointer", "0.1,0.9", "--theme", "light"])
        .arg("--output")
        .arg(&output)
        .status()
        .expect("failed to run causticwall export");
    assert!(status.success());

    let expected = caustics::render_frame(&caustics::FrameParameters::new(
        0.5,
        glam::Vec2::new(16.0, 9.0),
        glam::Vec2::new(0.1, 0.9),
        caustics::Theme::Light,
    ));
    let written = image::open(&output).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), expected.dimensions());
    let max_delta = written
        .pixels()
        .zip(expected.pixels())
        .flat_map(|(a, b)| a.0.iter().zip(b.0.iter()).map(|(x, y)| x.abs_diff(*y)))
        .max()
        .unwrap();
    assert!(max_delta <= 1, "pixels differ by {max_delta}");
}
