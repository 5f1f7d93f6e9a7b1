use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::config::MailConfig;

/// One outbound email, already rendered to plain text.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery seam for everything the service emails. `Ok(())` means the
/// message was handed to the provider; callers count exactly those as sent.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &Message) -> anyhow::Result<()>;
}

/// Delivers through an HTTP mail API (Resend-style JSON endpoint).
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build mail HTTP client")?;
        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailer {
    async fn send(&self, message: &Message) -> anyhow::Result<()> {
        let mut request = self.client.post(&self.url).json(&json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "text": message.body,
        }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("mail API request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("mail API returned {}", response.status());
        }
        Ok(())
    }
}

/// Stand-in transport for development runs without a mail API. Logs each
/// message and reports it as sent.
pub struct LogMailer;

#[async_trait]
impl MailTransport for LogMailer {
    async fn send(&self, message: &Message) -> anyhow::Result<()> {
        info!(to = %message.to, subject = %message.subject, "mail transport disabled, logging only");
        Ok(())
    }
}

pub fn from_config(config: Option<&MailConfig>) -> anyhow::Result<Arc<dyn MailTransport>> {
    match config {
        Some(mail) => Ok(Arc::new(HttpMailer::new(mail)?)),
        None => Ok(Arc::new(LogMailer)),
    }
}
