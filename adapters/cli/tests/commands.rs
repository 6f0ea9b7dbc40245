use std::process::{Command, Output};

use gem_cascade_core::{LevelConfig, LevelId, Rules};
use gem_cascade_system_level_generation::LevelGenerator;

fn gem_cascade(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gem-cascade"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch gem-cascade")
}

#[test]
fn generate_prints_the_generated_level() {
    let output = gem_cascade(&["generate", "--level", "3"]);
    assert!(output.status.success());

    let level: LevelConfig =
        serde_json::from_slice(&output.stdout).expect("generate prints a level as JSON");
    assert_eq!(
        level,
        LevelGenerator::default().generate(LevelId::new(3), &Rules::default())
    );
}

#[test]
fn play_prints_a_resume_code() {
    let output = gem_cascade(&["play", "--level", "1", "--seed", "7"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(
        stdout.lines().any(|line| line.starts_with("resume: gems:v1:")),
        "{stdout}"
    );
}

#[test]
fn validate_fails_for_a_missing_table() {
    let output = gem_cascade(&["validate", "no-such-levels.json"]);
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}
