// src/ingest/mod.rs
pub mod types;
pub mod x_api;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::daily;
use crate::ingest::types::{Author, Post, PostBundle, PostSource, Reply};

/// Collapse line breaks to single spaces for single-line console display.
/// The stored record keeps the raw text.
pub fn display_text(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Drop promoted/sponsored entries. They must never reach rendering or storage.
pub fn drop_promoted(bundles: Vec<PostBundle>) -> Vec<PostBundle> {
    bundles.into_iter().filter(|b| !b.promoted).collect()
}

/// One line per post (`handle: text`), then one indented line per direct
/// reply. Depth is 2 max: post, direct replies.
pub fn render_bundle<W: Write>(out: &mut W, bundle: &PostBundle) -> Result<()> {
    let post = &bundle.post;
    writeln!(
        out,
        "{}: {}",
        post.user.screen_name,
        display_text(&post.full_text)
    )?;
    for reply in &bundle.replies {
        render_reply(out, &reply.user, &reply.full_text)?;
    }
    Ok(())
}

fn render_reply<W: Write>(out: &mut W, user: &Author, text: &str) -> Result<()> {
    writeln!(out, "{:>20}: {}", user.screen_name, display_text(text))?;
    Ok(())
}

/// Run the ingestion stage once: fetch, drop promoted, render each kept
/// bundle to `out`, and persist the kept posts to today's file.
///
/// Returns the persisted posts. An empty batch is not an error.
pub async fn run_ingest<W: Write>(
    source: &dyn PostSource,
    account_id: &str,
    date: NaiveDate,
    tweets_dir: &Path,
    out: &mut W,
) -> Result<Vec<Post>> {
    let bundles = source
        .fetch_recent(account_id)
        .await
        .with_context(|| format!("fetching recent posts via {}", source.name()))?;

    let total = bundles.len();
    let kept = drop_promoted(bundles);
    tracing::info!(
        total,
        kept = kept.len(),
        source = source.name(),
        "fetched recent posts"
    );

    for bundle in &kept {
        render_bundle(out, bundle)?;
    }

    let posts: Vec<Post> = kept.into_iter().map(|b| b.post).collect();
    let path = daily::tweets_path(tweets_dir, date);
    daily::store_day(&path, &posts)?;
    tracing::info!(path = %path.display(), count = posts.len(), "persisted daily posts");

    Ok(posts)
}

// --- Test helper ---
pub struct MockSource {
    pub bundles: Vec<PostBundle>,
}

#[async_trait::async_trait]
impl PostSource for MockSource {
    async fn fetch_recent(&self, _account_id: &str) -> Result<Vec<PostBundle>> {
        Ok(self.bundles.clone())
    }
    fn name(&self) -> &'static str {
        "MockSource"
    }
}

pub fn bundle(handle: &str, text: &str, promoted: bool, replies: Vec<Reply>) -> PostBundle {
    PostBundle {
        post: Post {
            user: Author {
                screen_name: handle.to_string(),
                name: handle.to_string(),
            },
            full_text: text.to_string(),
            created_at: "2025-07-16T08:00:00Z".to_string(),
            tweet_url: String::new(),
            images: vec![],
            videos: vec![],
        },
        promoted,
        replies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text_collapses_newlines() {
        assert_eq!(display_text("a\nb\r\nc"), "a b c");
        assert_eq!(display_text("crlf\r\nonly"), "crlf only");
        assert_eq!(display_text("bare\rcarriage"), "bare carriage");
    }

    #[test]
    fn promoted_bundles_are_dropped() {
        let bundles = vec![
            bundle("elonmusk", "organic", false, vec![]),
            bundle("advertiser", "buy stuff", true, vec![]),
        ];
        let kept = drop_promoted(bundles);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].post.full_text, "organic");
    }

    #[test]
    fn render_shows_post_then_indented_replies() {
        let b = bundle(
            "elonmusk",
            "line one\nline two",
            false,
            vec![Reply {
                user: Author {
                    screen_name: "reply_guy".into(),
                    name: "Reply Guy".into(),
                },
                full_text: "nice".into(),
            }],
        );
        let mut buf = Vec::new();
        render_bundle(&mut buf, &b).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(
            out,
            format!("elonmusk: line one line two\n{:>20}: nice\n", "reply_guy")
        );
    }
}
