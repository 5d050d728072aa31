// src/monitor/wechat.rs
//! WeChat Work bot webhook for delivering summary documents.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Delivery seam for one summary document.
#[async_trait]
pub trait SummaryNotifier: Send + Sync {
    async fn send(&self, filename: &str, content: &str) -> Result<()>;
}

pub struct WechatNotifier {
    http: reqwest::Client,
    webhook_url: String,
    bot_key: String,
}

impl WechatNotifier {
    pub fn new(webhook_url: String, bot_key: String) -> Result<Self> {
        if bot_key.is_empty() {
            bail!("WeChat bot key is empty; set WECHAT_BOT_KEY");
        }
        let http = reqwest::Client::builder()
            .user_agent("elon-daily-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            webhook_url,
            bot_key,
        })
    }
}

#[derive(Serialize)]
struct BotMessage<'a> {
    #[serde(rename = "msgContent")]
    msg_content: &'a str,
    #[serde(rename = "botKey")]
    bot_key: &'a str,
    #[serde(rename = "multiGroupMode")]
    multi_group_mode: u8,
}

#[derive(Deserialize)]
struct BotReply {
    #[serde(rename = "retCode")]
    ret_code: i64,
}

#[async_trait]
impl SummaryNotifier for WechatNotifier {
    async fn send(&self, filename: &str, content: &str) -> Result<()> {
        let payload = BotMessage {
            msg_content: content,
            bot_key: &self.bot_key,
            multi_group_mode: 1,
        };

        let resp = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("sending {filename} to webhook"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("webhook returned HTTP {status} for {filename}");
        }
        // The bot wraps its own status inside an HTTP 200 body.
        let reply: BotReply = resp.json().await.context("decoding webhook reply")?;
        if reply.ret_code != 200 {
            return Err(anyhow!(
                "webhook rejected {filename} (retCode {})",
                reply.ret_code
            ));
        }
        Ok(())
    }
}

// --- Test helper ---
pub struct MockNotifier {
    pub sent: std::sync::Mutex<Vec<(String, String)>>,
    pub fail_for: Option<String>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            sent: std::sync::Mutex::new(vec![]),
            fail_for: None,
        }
    }

    pub fn failing_for(filename: &str) -> Self {
        Self {
            sent: std::sync::Mutex::new(vec![]),
            fail_for: Some(filename.to_string()),
        }
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryNotifier for MockNotifier {
    async fn send(&self, filename: &str, content: &str) -> Result<()> {
        if self.fail_for.as_deref() == Some(filename) {
            bail!("simulated webhook failure for {filename}");
        }
        self.sent
            .lock()
            .unwrap()
            .push((filename.to_string(), content.to_string()));
        Ok(())
    }
}
