use std::process::Command;

fn medimage() -> Command {
    Command::new(env!("CARGO_BIN_EXE_medimage"))
}

#[test]
fn test_nonexistent_file_exits_with_one() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nowhere.dcm");

    let output = medimage().arg(&missing).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nowhere.dcm"), "stderr: {}", stderr);
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unreadable_image_is_reported_not_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not an image").unwrap();

    let output = medimage().arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Failed to process the image"), "stdout: {}", stdout);
}

#[test]
fn test_synthetic_run_prints_report() {
    let output = medimage()
        .args(["--synthetic", "--seed", "7"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Top finding:"), "stdout: {}", stdout);
}
