use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn superview_cmd() -> Command {
    Command::cargo_bin("superview").expect("Failed to find superview binary")
}

#[test]
fn test_help_lists_the_classic_flags() -> Result<(), Box<dyn Error>> {
    superview_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--input").and(contains("--squeeze")).and(contains("--bitrate")));
    Ok(())
}

#[test]
fn test_missing_input_flag_is_rejected() -> Result<(), Box<dyn Error>> {
    superview_cmd()
        .arg("-o")
        .arg("out.mp4")
        .assert()
        .failure()
        .stderr(contains("--input"));
    Ok(())
}

#[test]
fn test_non_existent_input_fails_before_encoding() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("surely/this/does/not/exist.mp4");

    superview_cmd()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out.mp4"))
        .assert()
        .code(1)
        .stderr(contains("does not exist"));
    Ok(())
}

#[test]
fn test_output_equal_to_input_is_rejected() -> Result<(), Box<dyn Error>> {
    superview_cmd()
        .args(["-i", "clip.mp4", "-o", "clip.mp4"])
        .assert()
        .code(1)
        .stderr(contains("overwrite the input"));
    Ok(())
}

#[test]
fn test_zero_bitrate_is_rejected() -> Result<(), Box<dyn Error>> {
    superview_cmd()
        .args(["-i", "clip.mp4", "-b", "0"])
        .assert()
        .code(1)
        .stderr(contains("bitrate must be greater than zero"));
    Ok(())
}

#[test]
fn test_non_numeric_bitrate_is_a_usage_error() -> Result<(), Box<dyn Error>> {
    superview_cmd()
        .args(["-i", "clip.mp4", "-b", "fast"])
        .assert()
        .code(2)
        .stderr(contains("invalid value"));
    Ok(())
}

#[test]
fn test_log_file_receives_records() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let log_file = dir.path().join("logs").join("superview.log");

    superview_cmd()
        .arg("-i")
        .arg(dir.path().join("missing.mp4"))
        .arg("--log-file")
        .arg(&log_file)
        .assert()
        .code(1);

    let contents = std::fs::read_to_string(&log_file)?;
    assert!(contents.contains("[ERROR]"));
    assert!(contents.contains("does not exist"));
    Ok(())
}
