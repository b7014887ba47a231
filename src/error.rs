use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Field path to the messages that should be shown beside that input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Rejection of a single picked image
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("You can upload a maximum of {max} images.")]
    TooMany { max: usize },

    #[error("Max file size is 5MB.")]
    TooLarge { name: String, size: usize },

    #[error("Only .jpg, .jpeg, .png and .webp formats are supported.")]
    UnsupportedType { name: String, content_type: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("failed to upload image {file}")]
    Upload {
        file: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to store listing {id}")]
    Store {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not find a free listing id after {0} attempts")]
    IdExhausted(u32),

    #[error("submission timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("email relay is not configured (missing {})", .0.join(", "))]
    Misconfigured(Vec<&'static str>),

    #[error("email relay send failed")]
    SendFailed(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Toast shown to the user once a form action settles
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
    pub variant: NoticeVariant,
}

impl Notice {
    pub const LISTED: Notice = Notice {
        title: "Success!",
        description: "Your property has been listed successfully.",
        variant: NoticeVariant::Default,
    };

    pub const MESSAGE_SENT: Notice = Notice {
        title: "Message Sent!",
        description: "Thanks for reaching out. We'll get back to you shortly.",
        variant: NoticeVariant::Default,
    };
}

impl SubmitError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(_) => Notice {
                title: "Check the form",
                description: "Some fields need your attention before the property can be listed.",
                variant: NoticeVariant::Destructive,
            },
            _ => Notice {
                title: "Error",
                description: "Failed to list property. Please try again.",
                variant: NoticeVariant::Destructive,
            },
        }
    }
}

impl RelayError {
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(_) => Notice {
                title: "Check the form",
                description: "Some fields need your attention before the message can be sent.",
                variant: NoticeVariant::Destructive,
            },
            Self::Misconfigured(_) => Notice {
                title: "Configuration Error",
                description: "The contact form is not configured correctly. Please contact support.",
                variant: NoticeVariant::Destructive,
            },
            Self::SendFailed(_) => Notice {
                title: "Error Sending Message",
                description: "Something went wrong. Please try again later.",
                variant: NoticeVariant::Destructive,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collect_multiple_messages_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("images", "too many");
        errors.add("images", "too big");
        errors.add("uds", "required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.messages("images").len(), 2);
        assert_eq!(errors.messages("price"), &[] as &[String]);
        assert_eq!(errors.to_string(), "images: too many; images: too big; uds: required");
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn misconfiguration_has_its_own_notice() {
        let misconfigured = RelayError::Misconfigured(vec!["EMAILJS_SERVICE_ID"]).notice();
        let failed = RelayError::SendFailed(anyhow::anyhow!("boom")).notice();

        assert_eq!(misconfigured.title, "Configuration Error");
        assert_ne!(misconfigured, failed);
    }

    #[test]
    fn pipeline_failures_share_one_notice() {
        let upload = SubmitError::Upload {
            file: "a.png".into(),
            source: anyhow::anyhow!("network"),
        };
        let timeout = SubmitError::TimedOut(Duration::from_secs(1));
        assert_eq!(upload.notice(), timeout.notice());
    }

    #[test]
    fn causes_are_reported_once_through_the_chain() {
        use std::error::Error as _;

        let store = SubmitError::Store {
            id: "F123456789".into(),
            source: anyhow::anyhow!("disk full"),
        };
        assert_eq!(store.to_string(), "failed to store listing F123456789");
        assert_eq!(store.source().map(|s| s.to_string()), Some("disk full".to_string()));

        let chain = format!("{:#}", anyhow::Error::from(store));
        assert_eq!(chain.matches("disk full").count(), 1);

        let send = RelayError::SendFailed(anyhow::anyhow!("relay down"));
        assert_eq!(send.to_string(), "email relay send failed");
    }
}
