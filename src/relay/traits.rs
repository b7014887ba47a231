use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Third-party service that turns a template and key-value payload into an email
#[async_trait]
pub trait EmailRelay: Send + Sync {
    async fn send(
        &self,
        service_id: &str,
        template_id: &str,
        payload: &Map<String, Value>,
        auth_key: &str,
    ) -> Result<()>;

    fn relay_name(&self) -> &'static str;
}
