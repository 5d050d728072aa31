// src/monitor/mod.rs
//! Archive watcher: pull the published summaries repository, pick up summary
//! markdown files that appeared since the last check, and forward each to a
//! chat webhook. Runs as its own once-a-day invocation, independent of the
//! other stages.

pub mod wechat;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::monitor::wechat::SummaryNotifier;
use crate::publish::{CwdGuard, GitRunner};

pub const DEFAULT_STATE_FILE: &str = "last_check.json";

/// A summary file that changed since the last check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSummary {
    pub filename: String,
    pub content: String,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CheckState {
    last_check: DateTime<Utc>,
}

/// Load the last check time. A missing state file means "look one day back",
/// so a fresh deployment still picks up today's summary.
pub fn load_last_check(path: &Path) -> Result<DateTime<Utc>> {
    if !path.exists() {
        return Ok(Utc::now() - chrono::Duration::days(1));
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading check state {}", path.display()))?;
    let state: CheckState = serde_json::from_str(&raw)
        .with_context(|| format!("parsing check state {}", path.display()))?;
    Ok(state.last_check)
}

pub fn save_last_check(path: &Path, at: DateTime<Utc>) -> Result<()> {
    let state = CheckState { last_check: at };
    let json = serde_json::to_string_pretty(&state).context("serializing check state")?;
    fs::write(path, json).with_context(|| format!("writing check state {}", path.display()))?;
    Ok(())
}

/// Top-level `*.md` files in the repo modified after `since`, sorted by file
/// name so delivery order is stable.
pub fn new_summaries_since(repo_dir: &Path, since: DateTime<Utc>) -> Result<Vec<NewSummary>> {
    let mut found = Vec::new();
    let entries = fs::read_dir(repo_dir)
        .with_context(|| format!("listing {}", repo_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }
        let modified: DateTime<Utc> = entry
            .metadata()
            .and_then(|m| m.modified())
            .with_context(|| format!("reading mtime of {}", path.display()))?
            .into();
        if modified <= since {
            continue;
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        found.push(NewSummary {
            filename: entry.file_name().to_string_lossy().to_string(),
            content,
            modified,
        });
    }
    found.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(found)
}

#[derive(Debug, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Pull failed; the state file is left untouched so the next run retries
    /// the same window.
    PullFailed,
    /// `found` new files, `delivered` of them accepted by the webhook.
    Checked { found: usize, delivered: usize },
}

/// Run one monitor pass. The repository must already be cloned; a missing
/// directory is a setup failure, not a routine condition.
pub async fn run_monitor(
    repo_dir: &Path,
    state_path: &Path,
    notifier: &dyn SummaryNotifier,
    git: &dyn GitRunner,
) -> Result<MonitorOutcome> {
    if !repo_dir.exists() {
        bail!("仓库路径不存在: {}", repo_dir.display());
    }

    let last_check = load_last_check(state_path)?;
    tracing::info!(repo = %repo_dir.display(), %last_check, "开始检查 Elon 总结更新...");

    {
        let _guard = CwdGuard::enter(repo_dir)?;
        if let Err(e) = git.run(&["pull", "origin", "master"]) {
            tracing::warn!(error = ?e, "Git pull 失败");
            return Ok(MonitorOutcome::PullFailed);
        }
    }

    let now = Utc::now();
    let new_summaries = new_summaries_since(repo_dir, last_check)?;
    if new_summaries.is_empty() {
        tracing::info!("没有发现新的总结文件");
    } else {
        tracing::info!(count = new_summaries.len(), "发现新的总结文件");
    }

    let mut delivered = 0usize;
    for (i, summary) in new_summaries.iter().enumerate() {
        if i > 0 {
            // Pace deliveries so the webhook does not throttle us.
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        tracing::info!(file = %summary.filename, "正在发送");
        match notifier.send(&summary.filename, &summary.content).await {
            Ok(()) => delivered += 1,
            Err(e) => tracing::warn!(file = %summary.filename, error = ?e, "发送失败"),
        }
    }

    // Advance the window even if some sends failed, like the rest of the
    // pipeline: a failed delivery is logged, not replayed forever.
    save_last_check(state_path, now)?;
    tracing::info!(found = new_summaries.len(), delivered, "检查完成");

    Ok(MonitorOutcome::Checked {
        found: new_summaries.len(),
        delivered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn missing_state_file_defaults_to_one_day_back() {
        let tmp = tempfile::tempdir().unwrap();
        let since = load_last_check(&tmp.path().join(DEFAULT_STATE_FILE)).unwrap();
        let age = Utc::now() - since;
        assert!(age >= ChronoDuration::hours(23) && age <= ChronoDuration::hours(25));
    }

    #[test]
    fn state_round_trips_through_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DEFAULT_STATE_FILE);
        let at = "2025-07-16T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        save_last_check(&path, at).unwrap();
        assert_eq!(load_last_check(&path).unwrap(), at);
    }

    #[test]
    fn only_markdown_newer_than_the_window_is_detected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("2025-07-16-elon-summary.md"), "today").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "not markdown").unwrap();

        let past = Utc::now() - ChronoDuration::hours(1);
        let found = new_summaries_since(tmp.path(), past).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].filename, "2025-07-16-elon-summary.md");
        assert_eq!(found[0].content, "today");

        // Files written before the window are old news.
        let future = Utc::now() + ChronoDuration::hours(1);
        assert!(new_summaries_since(tmp.path(), future).unwrap().is_empty());
    }
}
