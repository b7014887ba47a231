use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::relay::traits::EmailRelay;

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com/api/v1.0/email/send";

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a Map<String, Value>,
}

/// EmailJS REST client
pub struct EmailJsClient {
    client: Client,
    endpoint: String,
}

impl EmailJsClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl EmailRelay for EmailJsClient {
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        payload: &Map<String, Value>,
        auth_key: &str,
    ) -> Result<()> {
        let request = SendRequest {
            service_id,
            template_id,
            user_id: auth_key,
            template_params: payload,
        };

        debug!("Posting template {} to {}", template_id, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to reach EmailJS")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("EmailJS returned status: {} ({})", status, body);
            anyhow::bail!("EmailJS rejected the message: {}", status);
        }

        Ok(())
    }

    fn relay_name(&self) -> &'static str {
        "EmailJS"
    }
}
