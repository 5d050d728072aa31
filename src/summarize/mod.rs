// src/summarize/mod.rs
//! Daily summarization: filter the tracked author's posts, assemble one
//! prompt, call the completion API once, write the two artifacts.

pub mod openai;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::config::Config;
use crate::daily;
use crate::ingest::types::Post;
use crate::summarize::openai::CompletionClient;

/// Preamble demands: summarize concisely, cite permalinks when quoting.
const PROMPT_PREAMBLE: &str =
    "这是我抓取的马斯克的推文，帮我看看这家伙今天都干了啥。总结一下，尽量简洁一些，如果引用原来的推文，请附带原文链接。";

/// Case-insensitive match on the tracked handle, original order preserved.
pub fn filter_by_handle(posts: &[Post], handle: &str) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| p.user.screen_name.eq_ignore_ascii_case(handle))
        .cloned()
        .collect()
}

/// Media annotation, leading space included so it concatenates directly
/// after the post text. Four cases: both kinds, images only, videos only,
/// neither (empty string).
pub fn format_media_annotation(images: usize, videos: usize) -> String {
    match (images, videos) {
        (0, 0) => String::new(),
        (i, 0) => format!(" [包含{i}张图片]"),
        (0, v) => format!(" [包含{v}个视频]"),
        (i, v) => format!(" [包含{i}张图片, {v}个视频]"),
    }
}

/// Accepts both RFC 3339 and the legacy `Wed Jul 16 08:00:00 +0000 2025`
/// form the read API emits.
pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let dt = DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y")
        .with_context(|| format!("unparseable createdAt: {raw}"))?;
    Ok(dt.with_timezone(&Utc))
}

/// `N. [HH:mm] text [media]` with the permalink on its own line when present.
/// Index is 1-based; the time is the post's UTC clock time.
pub fn format_post_line(index: usize, post: &Post) -> Result<String> {
    let time = parse_created_at(&post.created_at)?.format("%H:%M");
    let media = format_media_annotation(post.images.len(), post.videos.len());
    let url = if post.tweet_url.is_empty() {
        String::new()
    } else {
        format!("\n链接: {}", post.tweet_url)
    };
    Ok(format!("{index}. [{time}] {}{media}{url}", post.full_text))
}

/// Assemble the full prompt: preamble + numbered post lines in original
/// order. Deterministic for identical input.
pub fn build_prompt(posts: &[Post]) -> Result<String> {
    let mut lines = Vec::with_capacity(posts.len());
    for (i, post) in posts.iter().enumerate() {
        lines.push(format_post_line(i + 1, post)?);
    }
    Ok(format!(
        "{PROMPT_PREAMBLE}\n\n---\n今天的推文内容：\n{}\n",
        lines.join("\n")
    ))
}

pub fn prompt_path(summaries_dir: &Path, date: NaiveDate) -> PathBuf {
    summaries_dir.join(format!("{}-elon-tweets.txt", daily::day_key(date)))
}

pub fn summary_path(summaries_dir: &Path, date: NaiveDate) -> PathBuf {
    summaries_dir.join(format!("{}-elon-summary.md", daily::day_key(date)))
}

/// Wrap the raw completion in the summary document: title with the date,
/// body, rule, footer with generation time (local clock), matched-post
/// count, and model id.
pub fn render_summary(
    date: NaiveDate,
    body: &str,
    post_count: usize,
    model: &str,
    generated_at: DateTime<Local>,
) -> String {
    format!(
        "# Elon Musk 今日行为总结 ({})\n\n{body}\n\n---\n*生成时间: {}*\n*推文数量: {post_count}*\n*模型: {model}*\n",
        daily::day_key(date),
        generated_at.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Terminal state of one summarization run. The first three are routine
/// "nothing to do today" conditions, not faults.
#[derive(Debug, PartialEq, Eq)]
pub enum SummarizeOutcome {
    NoDataFile,
    NoPosts,
    NoMatchingPosts,
    Written {
        prompt_path: PathBuf,
        summary_path: PathBuf,
        matched: usize,
    },
}

/// Run the summarization stage for `date`. The prompt is persisted before
/// the network call so a failed call leaves a manual-replay artifact; a
/// completion error therefore propagates after the prompt file exists.
pub async fn run_summarize(
    cfg: &Config,
    date: NaiveDate,
    client: &dyn CompletionClient,
) -> Result<SummarizeOutcome> {
    let file = daily::tweets_path(&cfg.tweets_dir, date);
    let posts = match daily::load_day(&file)? {
        None => {
            tracing::info!(path = %file.display(), "今天的推文文件不存在");
            return Ok(SummarizeOutcome::NoDataFile);
        }
        Some(p) => p,
    };
    if posts.is_empty() {
        tracing::info!("今天没有推文数据");
        return Ok(SummarizeOutcome::NoPosts);
    }

    let matched = filter_by_handle(&posts, &cfg.account.handle);
    if matched.is_empty() {
        tracing::info!(handle = %cfg.account.handle, "今天没有找到 Elon 的推文");
        return Ok(SummarizeOutcome::NoMatchingPosts);
    }
    tracing::info!(total = posts.len(), matched = matched.len(), "filtered daily posts");

    let prompt = build_prompt(&matched)?;
    fs::create_dir_all(&cfg.summaries_dir)
        .with_context(|| format!("creating {}", cfg.summaries_dir.display()))?;
    let prompt_file = prompt_path(&cfg.summaries_dir, date);
    fs::write(&prompt_file, &prompt)
        .with_context(|| format!("writing prompt capture {}", prompt_file.display()))?;

    tracing::info!(model = client.model_id(), "正在调用大模型生成总结...");
    let body = client.complete(&prompt).await.context("completion call failed")?;

    let doc = render_summary(date, &body, matched.len(), client.model_id(), Local::now());
    let summary_file = summary_path(&cfg.summaries_dir, date);
    fs::write(&summary_file, &doc)
        .with_context(|| format!("writing summary {}", summary_file.display()))?;

    println!("{}", "=".repeat(50));
    println!("Elon Musk 今日行为总结 ({})", daily::day_key(date));
    println!("{}", "=".repeat(50));
    println!("{body}");
    println!("{}", "=".repeat(50));
    println!("总结已保存到: {}", summary_file.display());

    Ok(SummarizeOutcome::Written {
        prompt_path: prompt_file,
        summary_path: summary_file,
        matched: matched.len(),
    })
}

/// Top-level boundary for the summarize stage. Setup failures (missing env,
/// bad config) are resolved before this point and stay fatal; an external
/// completion failure is routine here — logged, contained, and reported as
/// `None` so the process still exits cleanly. Publication runs best-effort
/// only after a summary was written.
pub async fn run_stage(
    cfg: &Config,
    date: NaiveDate,
    client: &dyn CompletionClient,
    git: &dyn crate::publish::GitRunner,
) -> Option<SummarizeOutcome> {
    match run_summarize(cfg, date, client).await {
        Ok(outcome) => {
            if let SummarizeOutcome::Written { .. } = outcome {
                crate::publish::publish(
                    &cfg.summaries_dir,
                    cfg.summary_repo_url.as_deref(),
                    date,
                    git,
                );
            }
            Some(outcome)
        }
        Err(e) => {
            tracing::error!(error = ?e, "分析过程中出现错误");
            None
        }
    }
}
