// src/publish.rs
//! Best-effort upload of the summaries directory to its archive repository.
//! Failures here are logged and contained; they never affect the artifacts
//! or exit status of the stages that ran before.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::daily;

/// Seam over the five git primitives we consume. Commands run in the
/// process working directory, which `publish` scopes to the summaries dir.
pub trait GitRunner: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<()>;
}

/// Shells out to the real `git` binary.
pub struct GitCli;

impl GitRunner for GitCli {
    fn run(&self, args: &[&str]) -> Result<()> {
        let status = Command::new("git")
            .args(args)
            .status()
            .with_context(|| format!("spawning git {}", args.join(" ")))?;
        if !status.success() {
            bail!("git {} exited with {status}", args.join(" "));
        }
        Ok(())
    }
}

/// Scoped working-directory change, restored on every exit path.
pub(crate) struct CwdGuard {
    original: PathBuf,
}

impl CwdGuard {
    pub(crate) fn enter(dir: &Path) -> Result<Self> {
        let original = env::current_dir().context("reading current dir")?;
        env::set_current_dir(dir)
            .with_context(|| format!("entering {}", dir.display()))?;
        Ok(Self { original })
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            tracing::warn!(error = ?e, "failed to restore working directory");
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing to do: directory missing or no repository URL configured.
    Skipped,
    Published,
    Failed(String),
}

fn commit_message(date: NaiveDate) -> String {
    format!("feat: 添加 {} Elon 行为总结", daily::day_key(date))
}

fn push_sequence(
    runner: &dyn GitRunner,
    repo_url: &str,
    date: NaiveDate,
    has_git_dir: bool,
) -> Result<()> {
    if !has_git_dir {
        runner.run(&["init"])?;
        runner.run(&["remote", "add", "origin", repo_url])?;
    }
    runner.run(&["add", "."])?;
    runner.run(&["commit", "-m", &commit_message(date)])?;
    runner.run(&["push", "origin", "master"])?;
    Ok(())
}

/// Commit and push today's artifacts. Never propagates an error; callers
/// that care inspect the returned outcome instead of log output.
pub fn publish(
    summaries_dir: &Path,
    repo_url: Option<&str>,
    date: NaiveDate,
    runner: &dyn GitRunner,
) -> PublishOutcome {
    if !summaries_dir.exists() {
        tracing::info!(dir = %summaries_dir.display(), "summaries 目录不存在");
        return PublishOutcome::Skipped;
    }
    let repo_url = match repo_url {
        Some(u) => u,
        None => {
            tracing::info!("未配置总结仓库地址，跳过上传");
            return PublishOutcome::Skipped;
        }
    };

    let has_git_dir = summaries_dir.join(".git").exists();
    let guard = match CwdGuard::enter(summaries_dir) {
        Ok(g) => g,
        Err(e) => {
            tracing::warn!(error = ?e, "自动上传失败");
            return PublishOutcome::Failed(format!("{e:#}"));
        }
    };

    let outcome = match push_sequence(runner, repo_url, date, has_git_dir) {
        Ok(()) => {
            tracing::info!("总结已上传到独立仓库");
            PublishOutcome::Published
        }
        Err(e) => {
            tracing::warn!(error = ?e, "自动上传失败");
            PublishOutcome::Failed(format!("{e:#}"))
        }
    };
    drop(guard);
    outcome
}
