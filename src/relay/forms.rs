use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::FieldErrors;

/// A lead-capture form that can be mailed through the relay
pub trait LeadForm {
    /// Template variable identifying which form sent the mail
    fn form_id(&self) -> &str;

    fn validate(&self) -> Result<(), FieldErrors>;

    /// Form fields plus `form_id` and `sent_at`
    fn template_params(&self, sent_at: DateTime<Utc>) -> Map<String, Value>;

    /// Back to the empty form after a successful send
    fn reset(&mut self);
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
}

fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if !email_pattern().is_match(value.trim()) {
        errors.add(field, "Please enter a valid email address.");
    }
}

fn check_min(errors: &mut FieldErrors, field: &str, value: &str, min: usize, message: &str) {
    if value.trim().chars().count() < min {
        errors.add(field, message);
    }
}

fn params(form_id: &str, sent_at: DateTime<Utc>, fields: Value) -> Map<String, Value> {
    let mut map = match fields {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    map.insert("form_id".into(), json!(form_id));
    map.insert("sent_at".into(), json!(sent_at.to_rfc3339()));
    map
}

/// General contact form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactForm {
    pub user_name: String,
    pub user_email: String,
    pub subject: String,
    pub message: String,
}

impl LeadForm for ContactForm {
    fn form_id(&self) -> &str {
        "contact"
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_min(&mut errors, "user_name", &self.user_name, 2, "Name must be at least 2 characters.");
        check_email(&mut errors, "user_email", &self.user_email);
        check_min(&mut errors, "subject", &self.subject, 5, "Subject must be at least 5 characters.");
        check_min(&mut errors, "message", &self.message, 20, "Message must be at least 20 characters.");
        errors.into_result()
    }

    fn template_params(&self, sent_at: DateTime<Utc>) -> Map<String, Value> {
        params(
            self.form_id(),
            sent_at,
            json!({
                "user_name": self.user_name.trim(),
                "user_email": self.user_email.trim(),
                "subject": self.subject.trim(),
                "message": self.message.trim(),
            }),
        )
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Investor and partnership enquiries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestorContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub message: String,
}

impl LeadForm for InvestorContactForm {
    fn form_id(&self) -> &str {
        "investor"
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_min(&mut errors, "name", &self.name, 2, "Name must be at least 2 characters.");
        check_email(&mut errors, "email", &self.email);
        check_min(&mut errors, "message", &self.message, 10, "Message must be at least 10 characters.");
        if self.message.trim().chars().count() > 500 {
            errors.add("message", "Message must be less than 500 characters.");
        }
        errors.into_result()
    }

    fn template_params(&self, sent_at: DateTime<Utc>) -> Map<String, Value> {
        let company = self
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        params(
            self.form_id(),
            sent_at,
            json!({
                "user_name": self.name.trim(),
                "user_email": self.email.trim(),
                "company": company,
                "message": self.message.trim(),
            }),
        )
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Single-field email capture (early access waitlist, Android beta testers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailCaptureForm {
    pub form_id: String,
    pub email: String,
}

impl EmailCaptureForm {
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            email: String::new(),
        }
    }
}

impl LeadForm for EmailCaptureForm {
    fn form_id(&self) -> &str {
        &self.form_id
    }

    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        errors.into_result()
    }

    fn template_params(&self, sent_at: DateTime<Utc>) -> Map<String, Value> {
        params(self.form_id(), sent_at, json!({ "user_email": self.email.trim() }))
    }

    fn reset(&mut self) {
        self.email.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn contact() -> ContactForm {
        ContactForm {
            user_name: "Asha".into(),
            user_email: "asha@example.com".into(),
            subject: "Listing help".into(),
            message: "How do I list two flats in one building?".into(),
        }
    }

    #[test]
    fn contact_form_rules() {
        assert!(contact().validate().is_ok());

        let errors = ContactForm {
            user_name: "A".into(),
            user_email: "not-an-email".into(),
            subject: "Hi".into(),
            message: "Too short".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.messages("user_email"), ["Please enter a valid email address."]);
    }

    #[test]
    fn investor_message_is_bounded() {
        let mut form = InvestorContactForm {
            name: "Ravi".into(),
            email: "ravi@fund.in".into(),
            company: None,
            message: "x".repeat(501),
        };
        assert!(form.validate().unwrap_err().contains("message"));

        form.message = "Keen to talk about a seed round".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn payload_carries_form_id_and_timestamp() {
        let sent_at = Utc.with_ymd_and_hms(2026, 5, 1, 9, 30, 0).unwrap();
        let params = contact().template_params(sent_at);

        assert_eq!(params["form_id"], "contact");
        assert_eq!(params["sent_at"], "2026-05-01T09:30:00+00:00");
        assert_eq!(params["user_name"], "Asha");
    }

    #[test]
    fn blank_company_is_sent_as_null() {
        let form = InvestorContactForm {
            name: "Ravi".into(),
            email: "ravi@fund.in".into(),
            company: Some("  ".into()),
            message: "Keen to talk about a seed round".into(),
        };
        let params = form.template_params(Utc::now());
        assert!(params["company"].is_null());
    }

    #[test]
    fn email_capture_keeps_its_form_id_on_reset() {
        let mut form = EmailCaptureForm::new("android-tester");
        form.email = "tester@example.com".into();
        assert!(form.validate().is_ok());

        form.reset();
        assert_eq!(form.email, "");
        assert_eq!(form.form_id(), "android-tester");
    }
}
