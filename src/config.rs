//! Environment-driven settings
//!
//! Values come from the process environment, after an optional `.env` file
//! has been loaded.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::RelayError;
use crate::form::validation::DEFAULT_CITY;
use crate::relay::emailjs::DEFAULT_ENDPOINT;
use crate::submit::DEFAULT_SUBMIT_TIMEOUT;

const SERVICE_ID_VAR: &str = "EMAILJS_SERVICE_ID";
const TEMPLATE_ID_VAR: &str = "EMAILJS_TEMPLATE_ID";
const PUBLIC_KEY_VAR: &str = "EMAILJS_PUBLIC_KEY";

/// Email relay identifiers; any of them may be missing until checked
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub endpoint: String,
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
}

/// Relay identifiers known to be present
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayCredentials {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("EMAILJS_API_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            service_id: non_empty_var(SERVICE_ID_VAR),
            template_id: non_empty_var(TEMPLATE_ID_VAR),
            public_key: non_empty_var(PUBLIC_KEY_VAR),
        }
    }

    /// All three identifiers, or the names of the missing ones
    pub fn credentials(&self) -> Result<RelayCredentials, RelayError> {
        match (&self.service_id, &self.template_id, &self.public_key) {
            (Some(service_id), Some(template_id), Some(public_key)) => Ok(RelayCredentials {
                service_id: service_id.clone(),
                template_id: template_id.clone(),
                public_key: public_key.clone(),
            }),
            (service_id, template_id, public_key) => {
                let missing = [
                    (service_id.is_none(), SERVICE_ID_VAR),
                    (template_id.is_none(), TEMPLATE_ID_VAR),
                    (public_key.is_none(), PUBLIC_KEY_VAR),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Err(RelayError::Misconfigured(missing))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_root: PathBuf,
    pub public_base_url: Option<String>,
    pub submit_timeout: Duration,
    pub default_city: String,
    pub relay: RelayConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let submit_timeout = env::var("LISTING_SUBMIT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SUBMIT_TIMEOUT);

        Self {
            storage_root: env::var("LISTING_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("listing_data")),
            public_base_url: non_empty_var("LISTING_PUBLIC_BASE_URL"),
            submit_timeout,
            default_city: env::var("LISTING_DEFAULT_CITY").unwrap_or_else(|_| DEFAULT_CITY.to_string()),
            relay: RelayConfig::from_env(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> RelayConfig {
        RelayConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            service_id: Some("service_1".into()),
            template_id: Some("template_1".into()),
            public_key: Some("pk_1".into()),
        }
    }

    #[test]
    fn complete_config_yields_credentials() {
        let creds = full().credentials().unwrap();
        assert_eq!(creds.template_id, "template_1");
    }

    #[test]
    fn missing_identifiers_are_named() {
        let config = RelayConfig {
            template_id: None,
            public_key: None,
            ..full()
        };
        match config.credentials() {
            Err(RelayError::Misconfigured(missing)) => {
                assert_eq!(missing, vec![TEMPLATE_ID_VAR, PUBLIC_KEY_VAR]);
            }
            other => panic!("expected misconfiguration, got {other:?}"),
        }
    }
}
