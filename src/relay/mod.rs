pub mod emailjs;
pub mod forms;
pub mod traits;

pub use emailjs::EmailJsClient;
pub use forms::{ContactForm, EmailCaptureForm, InvestorContactForm, LeadForm};
pub use traits::EmailRelay;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// Sends lead-capture forms through the email relay
pub struct ContactMailer {
    relay: Arc<dyn EmailRelay>,
    config: RelayConfig,
}

impl ContactMailer {
    pub fn new(relay: Arc<dyn EmailRelay>, config: RelayConfig) -> Self {
        Self { relay, config }
    }

    /// Validate, check configuration, then send
    ///
    /// The form is reset only when the relay accepted the message; on any
    /// error the user's input is left in place.
    pub async fn send<F: LeadForm + Send>(&self, form: &mut F) -> Result<(), RelayError> {
        form.validate().map_err(RelayError::Validation)?;

        let creds = self.config.credentials().map_err(|e| {
            warn!("Email relay not configured: {}", e);
            e
        })?;

        let payload = form.template_params(Utc::now());
        self.relay
            .send(&creds.service_id, &creds.template_id, &payload, &creds.public_key)
            .await
            .map_err(|e| {
                warn!("{} failed for {} form: {:#}", self.relay.relay_name(), form.form_id(), e);
                RelayError::SendFailed(e)
            })?;

        info!("📨 Sent {} form via {}", form.form_id(), self.relay.relay_name());
        form.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRelay {
        sent: Mutex<Vec<(String, Map<String, Value>)>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailRelay for RecordingRelay {
        async fn send(
            &self,
            _service_id: &str,
            template_id: &str,
            payload: &Map<String, Value>,
            _auth_key: &str,
        ) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("relay down");
            }
            self.sent
                .lock()
                .unwrap()
                .push((template_id.to_string(), payload.clone()));
            Ok(())
        }

        fn relay_name(&self) -> &'static str {
            "recording"
        }
    }

    fn configured() -> RelayConfig {
        RelayConfig {
            endpoint: String::new(),
            service_id: Some("service_1".into()),
            template_id: Some("template_1".into()),
            public_key: Some("pk_1".into()),
        }
    }

    fn filled() -> ContactForm {
        ContactForm {
            user_name: "Asha".into(),
            user_email: "asha@example.com".into(),
            subject: "Listing help".into(),
            message: "How do I list two flats in one building?".into(),
        }
    }

    #[tokio::test]
    async fn successful_send_resets_the_form() {
        let relay = Arc::new(RecordingRelay::default());
        let mailer = ContactMailer::new(relay.clone(), configured());
        let mut form = filled();

        mailer.send(&mut form).await.unwrap();

        assert_eq!(form, ContactForm::default());
        let sent = relay.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "template_1");
        assert_eq!(sent[0].1["subject"], "Listing help");
    }

    #[tokio::test]
    async fn failed_send_keeps_the_input() {
        let relay = Arc::new(RecordingRelay {
            fail: true,
            ..Default::default()
        });
        let mailer = ContactMailer::new(relay, configured());
        let mut form = filled();

        let err = mailer.send(&mut form).await.unwrap_err();
        assert!(matches!(err, RelayError::SendFailed(_)));
        assert_eq!(err.notice().title, "Error Sending Message");
        assert_eq!(form, filled());
    }

    #[tokio::test]
    async fn missing_config_fails_before_any_send() {
        let relay = Arc::new(RecordingRelay::default());
        let config = RelayConfig {
            service_id: None,
            ..configured()
        };
        let mailer = ContactMailer::new(relay.clone(), config);
        let mut form = filled();

        let err = mailer.send(&mut form).await.unwrap_err();
        assert!(matches!(err, RelayError::Misconfigured(_)));
        assert_eq!(err.notice().title, "Configuration Error");
        assert!(relay.sent.lock().unwrap().is_empty());
        assert_eq!(form, filled());
    }

    #[tokio::test]
    async fn invalid_form_is_not_sent() {
        let relay = Arc::new(RecordingRelay::default());
        let mailer = ContactMailer::new(relay.clone(), configured());
        let mut form = EmailCaptureForm::new("early-access");
        form.email = "nope".into();

        let err = mailer.send(&mut form).await.unwrap_err();
        assert!(matches!(err, RelayError::Validation(_)));
        assert!(relay.sent.lock().unwrap().is_empty());
    }
}
