// src/daily.rs
// Daily partition contract: one JSON file per UTC calendar day.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use crate::ingest::types::Post;

/// The day key is computed once per run, in UTC, and threaded through every
/// stage. UTC keeps the partition boundary stable for an account that
/// operates across time zones.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn tweets_path(tweets_dir: &Path, date: NaiveDate) -> PathBuf {
    tweets_dir.join(format!("{}.json", day_key(date)))
}

/// Load one day's post collection. A missing file is an expected terminal
/// state ("no data for today"), reported as `Ok(None)`, never an error.
pub fn load_day(path: &Path) -> Result<Option<Vec<Post>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading daily file {}", path.display()))?;
    let posts: Vec<Post> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing daily file {}", path.display()))?;
    Ok(Some(posts))
}

/// Persist one day's post collection, creating the directory as needed.
pub fn store_day(path: &Path, posts: &[Post]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(posts).context("serializing daily posts")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::{Author, Post};

    fn sample_post() -> Post {
        Post {
            user: Author {
                screen_name: "elonmusk".into(),
                name: "Elon Musk".into(),
            },
            full_text: "hello".into(),
            created_at: "2025-07-16T08:00:00Z".into(),
            tweet_url: "https://x.com/elonmusk/status/1".into(),
            images: vec![],
            videos: vec![],
        }
    }

    #[test]
    fn day_key_is_iso_date() {
        let d = NaiveDate::from_ymd_opt(2025, 7, 16).unwrap();
        assert_eq!(day_key(d), "2025-07-16");
        assert!(tweets_path(Path::new("tweets"), d).ends_with("2025-07-16.json"));
    }

    #[test]
    fn missing_day_file_is_none_not_error() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tweets_path(tmp.path(), NaiveDate::from_ymd_opt(2025, 7, 16).unwrap());
        assert!(load_day(&p).unwrap().is_none());
    }

    #[test]
    fn store_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tweets_path(tmp.path(), NaiveDate::from_ymd_opt(2025, 7, 16).unwrap());
        let posts = vec![sample_post()];
        store_day(&p, &posts).unwrap();
        let back = load_day(&p).unwrap().unwrap();
        assert_eq!(back, posts);
    }

    #[test]
    fn collector_camel_case_fields_parse() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("2025-07-16.json");
        std::fs::write(
            &p,
            r#"[{
                "user": {"screenName": "elonmusk", "name": "Elon Musk"},
                "fullText": "hi",
                "createdAt": "2025-07-16T08:00:00Z",
                "tweetUrl": "https://x.com/elonmusk/status/1",
                "images": [],
                "videos": []
            }]"#,
        )
        .unwrap();
        let posts = load_day(&p).unwrap().unwrap();
        assert_eq!(posts[0].user.screen_name, "elonmusk");
    }
}
