// tests/publish_flow.rs
use std::sync::Mutex;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use elon_daily_digest::publish::{publish, GitRunner, PublishOutcome};
use tempfile::TempDir;

/// Records every git invocation; optionally fails once a marker arg shows up.
struct RecordingRunner {
    calls: Mutex<Vec<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl RecordingRunner {
    fn new() -> Self {
        Self {
            calls: Mutex::new(vec![]),
            fail_on: None,
        }
    }

    fn failing_on(subcommand: &'static str) -> Self {
        Self {
            calls: Mutex::new(vec![]),
            fail_on: Some(subcommand),
        }
    }

    fn recorded(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl GitRunner for RecordingRunner {
    fn run(&self, args: &[&str]) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(args.iter().map(|s| s.to_string()).collect());
        if self.fail_on == Some(args[0]) {
            bail!("simulated git {} failure", args[0]);
        }
        Ok(())
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 16).unwrap()
}

#[test]
#[serial_test::serial]
fn fresh_directory_gets_init_remote_add_commit_push_in_order() {
    let tmp = TempDir::new().unwrap();
    let runner = RecordingRunner::new();
    let before = std::env::current_dir().unwrap();

    let outcome = publish(
        tmp.path(),
        Some("git@example.test:elon/daily.git"),
        date(),
        &runner,
    );

    assert_eq!(outcome, PublishOutcome::Published);
    let calls = runner.recorded();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], ["init"]);
    assert_eq!(
        calls[1],
        ["remote", "add", "origin", "git@example.test:elon/daily.git"]
    );
    assert_eq!(calls[2], ["add", "."]);
    assert_eq!(
        calls[3],
        ["commit", "-m", "feat: 添加 2025-07-16 Elon 行为总结"]
    );
    assert_eq!(calls[4], ["push", "origin", "master"]);
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial_test::serial]
fn existing_repo_skips_init_and_remote_registration() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join(".git")).unwrap();
    let runner = RecordingRunner::new();

    let outcome = publish(tmp.path(), Some("git@example.test:x.git"), date(), &runner);

    assert_eq!(outcome, PublishOutcome::Published);
    let subcommands: Vec<String> = runner.recorded().iter().map(|c| c[0].clone()).collect();
    assert_eq!(subcommands, ["add", "commit", "push"]);
}

#[test]
#[serial_test::serial]
fn failed_push_is_contained_and_cwd_is_restored() {
    let tmp = TempDir::new().unwrap();
    let runner = RecordingRunner::failing_on("push");
    let before = std::env::current_dir().unwrap();

    let outcome = publish(tmp.path(), Some("git@example.test:x.git"), date(), &runner);

    match outcome {
        PublishOutcome::Failed(msg) => assert!(msg.contains("push")),
        other => panic!("expected Failed, got {other:?}"),
    }
    // Earlier steps still ran; only push blew up. Artifacts are untouched.
    assert_eq!(runner.recorded().len(), 5);
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial_test::serial]
fn missing_directory_or_url_skips_without_running_git() {
    let tmp = TempDir::new().unwrap();
    let runner = RecordingRunner::new();

    let gone = tmp.path().join("nope");
    assert_eq!(
        publish(&gone, Some("git@example.test:x.git"), date(), &runner),
        PublishOutcome::Skipped
    );
    assert_eq!(
        publish(tmp.path(), None, date(), &runner),
        PublishOutcome::Skipped
    );
    assert!(runner.recorded().is_empty());
}
