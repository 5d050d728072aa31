// src/config.rs
use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Default completions endpoint (OpenAI-compatible; OpenRouter in production).
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4.1";

const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_X_AUTH_TOKEN: &str = "X_AUTH_TOKEN";
const ENV_SUMMARY_REPO_URL: &str = "ELON_DAILY_SUMMARY_REPO_URL";
const ENV_WECHAT_WEBHOOK_URL: &str = "WECHAT_WEBHOOK_URL";
const ENV_WECHAT_BOT_KEY: &str = "WECHAT_BOT_KEY";

/// The tracked account, kept as one value so the numeric id and the handle
/// cannot drift apart across stages: the id drives ingestion, the handle
/// drives summarization filtering, and both must refer to the same account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    /// Stable numeric/opaque id used by the read API (handles can change).
    pub id: String,
    /// Short handle used for filtering persisted posts.
    pub handle: String,
}

impl AccountRef {
    pub fn elon() -> Self {
        Self {
            id: "44196397".to_string(),
            handle: "elonmusk".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub account: AccountRef,
    pub model: String,
    pub openai_base_url: String,
    /// Completion API key; only the summarize stage needs it.
    pub openai_api_key: Option<String>,
    /// Bearer token for the X read API; only the ingest stage needs it.
    pub x_auth_token: Option<String>,
    /// Push target for the summaries archive; publication is skipped without it.
    pub summary_repo_url: Option<String>,
    /// WeChat bot endpoint + key; only the monitor stage needs them.
    pub wechat_webhook_url: Option<String>,
    pub wechat_bot_key: Option<String>,
    pub tweets_dir: PathBuf,
    pub summaries_dir: PathBuf,
    /// Local clone of the published archive watched by the monitor stage.
    pub monitor_repo_dir: PathBuf,
}

impl Config {
    /// Resolve configuration from the environment. Credentials stay optional
    /// here; each stage checks the ones it actually needs, so a missing LLM
    /// key cannot block ingestion.
    pub fn from_env() -> Result<Self> {
        let openai_base_url = env::var(ENV_OPENAI_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());

        Ok(Self {
            account: AccountRef::elon(),
            model: DEFAULT_MODEL.to_string(),
            openai_base_url,
            openai_api_key: env::var(ENV_OPENAI_API_KEY).ok(),
            x_auth_token: env::var(ENV_X_AUTH_TOKEN).ok(),
            summary_repo_url: env::var(ENV_SUMMARY_REPO_URL).ok(),
            wechat_webhook_url: env::var(ENV_WECHAT_WEBHOOK_URL).ok(),
            wechat_bot_key: env::var(ENV_WECHAT_BOT_KEY).ok(),
            tweets_dir: PathBuf::from("tweets"),
            summaries_dir: PathBuf::from("summaries"),
            monitor_repo_dir: PathBuf::from("elon-daily-summaries"),
        })
    }

    /// Test/offline constructor: no env reads, no credentials.
    pub fn for_dirs(tweets_dir: PathBuf, summaries_dir: PathBuf) -> Self {
        Self {
            account: AccountRef::elon(),
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_api_key: None,
            x_auth_token: None,
            summary_repo_url: None,
            wechat_webhook_url: None,
            wechat_bot_key: None,
            monitor_repo_dir: PathBuf::from("elon-daily-summaries"),
            tweets_dir,
            summaries_dir,
        }
    }
}
