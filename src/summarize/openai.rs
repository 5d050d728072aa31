// src/summarize/openai.rs
//! Chat-completion client: provider trait + OpenAI-compatible implementation.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One-shot completion seam. Exactly one request per run, a single user
/// message, no streaming, no retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    /// Model identifier recorded in the summary footer.
    fn model_id(&self) -> &str;
}

/// Client for any OpenAI-compatible chat completions endpoint (OpenRouter in
/// production). Base URL and key come from configuration, never hard-coded.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("elon-daily-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(120))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("completion API key is empty");
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("sending completion request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("completion API returned {status}");
        }

        let body: Resp = resp.json().await.context("decoding completion body")?;
        match body.choices.into_iter().next() {
            Some(c) => Ok(c.message.content),
            None => bail!("completion response had no choices"),
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

// --- Test helper ---
pub struct MockCompletion {
    pub fixed: String,
    pub model: String,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

impl MockCompletion {
    pub fn returning(text: &str) -> Self {
        Self {
            fixed: text.to_string(),
            model: "mock/model".to_string(),
            prompts: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.fixed.clone())
    }
    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Always fails; exercises the "prompt file survives a dead call" path.
pub struct FailingCompletion;

#[async_trait]
impl CompletionClient for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        bail!("completion API unreachable")
    }
    fn model_id(&self) -> &str {
        "mock/failing"
    }
}
