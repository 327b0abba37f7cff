// src/discord/mod.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!(
    "DiscordBot (video-announcer, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Where announcements go. Sends are at-most-one-attempt: the delayed
/// dispatcher logs a failed send and moves on, so no retries happen here.
/// `recent_messages` is only exercised by the message-scan dedup policy.
#[async_trait]
pub trait AnnouncementSink: Send + Sync {
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<()>;
    async fn recent_messages(&self, channel_id: &str, limit: usize) -> Result<Vec<String>>;
}

#[derive(Clone)]
pub struct DiscordClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct CreateMessagePayload<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: String,
}

impl DiscordClient {
    pub fn new(token: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("building discord http client");
        Self {
            base_url: API_BASE.to_string(),
            token,
            client,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }
}

#[async_trait]
impl AnnouncementSink for DiscordClient {
    async fn post_message(&self, channel_id: &str, content: &str) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&CreateMessagePayload { content })
            .send()
            .await
            .context("discord create message")?;
        rsp.error_for_status()
            .context("discord create message status")?;
        Ok(())
    }

    async fn recent_messages(&self, channel_id: &str, limit: usize) -> Result<Vec<String>> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let rsp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .context("discord channel messages")?;
        let messages: Vec<Message> = rsp
            .error_for_status()
            .context("discord channel messages status")?
            .json()
            .await
            .context("discord channel messages body")?;
        Ok(messages.into_iter().map(|m| m.content).collect())
    }
}
