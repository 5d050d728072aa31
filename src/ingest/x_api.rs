// src/ingest/x_api.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::ingest::types::{PostBundle, PostSource};

const DEFAULT_BASE_URL: &str = "https://api.x.com/1.1";

/// Read-side X API source: one paginated "recent posts for account" request
/// with reply expansion and promoted-flag annotation. Session/auth protocol
/// beyond the bearer token is the credential helper's business, not ours.
pub struct XApiSource {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl XApiSource {
    pub fn new(auth_token: String, base_url_override: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("elon-daily-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(20))
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            http,
            base_url: base_url_override.unwrap_or(DEFAULT_BASE_URL).to_string(),
            auth_token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserTweetsResp {
    data: Vec<PostBundle>,
}

#[async_trait]
impl PostSource for XApiSource {
    async fn fetch_recent(&self, account_id: &str) -> Result<Vec<PostBundle>> {
        // Missing credentials fail the stage before any output is produced.
        if self.auth_token.is_empty() {
            bail!("X auth token is empty; set X_AUTH_TOKEN");
        }

        let url = format!("{}/user/tweets", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.auth_token)
            .query(&[("userId", account_id)])
            .send()
            .await
            .context("requesting recent posts")?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            bail!("X API rejected credentials ({status})");
        }
        if !status.is_success() {
            bail!("X API returned {status}");
        }

        let body: UserTweetsResp = resp.json().await.context("decoding user tweets body")?;
        Ok(body.data)
    }

    fn name(&self) -> &'static str {
        "XApi"
    }
}
