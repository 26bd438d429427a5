//! Transactional mail through the Brevo HTTP API.

use marketplace_common::{AppError, AppResult, MailConfig};
use marketplace_db::entities::contact_message;
use serde::Serialize;
use tracing::{info, warn};

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Outcome of a secondary notification, reported next to the primary result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed { error: String },
}

impl DeliveryStatus {
    /// Collapse a send result, logging failures.
    pub fn from_result(result: AppResult<()>) -> Self {
        match result {
            Ok(()) => Self::Sent,
            Err(e) => {
                warn!(error = %e, "Mail delivery failed");
                Self::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Mail service.
#[derive(Clone)]
pub struct MailService {
    config: MailConfig,
    http_client: reqwest::Client,
}

impl MailService {
    /// Create a new mail service.
    #[must_use]
    pub fn new(config: MailConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Whether an API key and sender are configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.api_key.is_some() && self.config.sender_email.is_some()
    }

    /// Send a message.
    pub async fn send(&self, message: MailMessage) -> AppResult<()> {
        let (Some(api_key), Some(sender_email)) = (
            self.config.api_key.as_deref(),
            self.config.sender_email.as_deref(),
        ) else {
            return Err(AppError::ExternalService(
                "Mail delivery is not configured".to_string(),
            ));
        };

        let body = serde_json::json!({
            "sender": {
                "name": self.config.sender_name,
                "email": sender_email,
            },
            "to": [{ "email": message.to }],
            "subject": message.subject,
            "htmlContent": message.html,
        });

        let response = self
            .http_client
            .post(&self.config.api_url)
            .header("api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Brevo request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            info!(to = %message.to, subject = %message.subject, "Mail sent");
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(AppError::ExternalService(format!(
                "Brevo rejected message ({status}): {error_text}"
            )))
        }
    }

    /// Send and report the outcome instead of failing.
    pub async fn deliver(&self, message: MailMessage) -> DeliveryStatus {
        DeliveryStatus::from_result(self.send(message).await)
    }

    /// Send a one-time code.
    pub async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> AppResult<()> {
        self.send(otp_message(to, code, ttl_minutes)).await
    }

    /// Send a seller password reset link.
    pub async fn send_password_reset(&self, to: &str, name: &str, link: &str) -> AppResult<()> {
        self.send(password_reset_message(to, name, link)).await
    }

    /// Forward a contact form submission to the admin inbox.
    pub async fn notify_admin_of_contact(&self, message: &contact_message::Model) -> AppResult<()> {
        let admin = self.config.admin_email.as_deref().ok_or_else(|| {
            AppError::ExternalService("Admin mailbox is not configured".to_string())
        })?;
        self.send(contact_admin_message(admin, message)).await
    }

    /// Confirm receipt of a contact form submission to its sender.
    pub async fn acknowledge_contact(&self, message: &contact_message::Model) -> AppResult<()> {
        self.send(contact_ack_message(message)).await
    }
}

/// One-time code mail.
#[must_use]
pub fn otp_message(to: &str, code: &str, ttl_minutes: i64) -> MailMessage {
    MailMessage {
        to: to.to_string(),
        subject: "Your verification code".to_string(),
        html: wrap_html(&format!(
            "<p>Your verification code is</p>\
             <p style=\"font-size:24px;letter-spacing:4px\"><strong>{}</strong></p>\
             <p>This code expires in {ttl_minutes} minutes. Do not share it with anyone.</p>",
            escape_html(code)
        )),
    }
}

/// Password reset mail.
#[must_use]
pub fn password_reset_message(to: &str, name: &str, link: &str) -> MailMessage {
    let link = escape_html(link);
    MailMessage {
        to: to.to_string(),
        subject: "Reset your seller password".to_string(),
        html: wrap_html(&format!(
            "<p>Hello {},</p>\
             <p>We received a request to reset your password.</p>\
             <p><a href=\"{link}\">Reset password</a></p>\
             <p>The link is valid for 10 minutes. If you did not ask for this, ignore this mail.</p>",
            escape_html(name)
        )),
    }
}

fn contact_admin_message(admin: &str, message: &contact_message::Model) -> MailMessage {
    MailMessage {
        to: admin.to_string(),
        subject: format!("New contact message: {}", message.subject),
        html: wrap_html(&format!(
            "<p><strong>From:</strong> {} &lt;{}&gt;</p>\
             <p><strong>Phone:</strong> {}</p>\
             <p><strong>Subject:</strong> {}</p>\
             <p>{}</p>",
            escape_html(&message.name),
            escape_html(&message.email),
            escape_html(&message.phone),
            escape_html(&message.subject),
            escape_html(&message.message),
        )),
    }
}

fn contact_ack_message(message: &contact_message::Model) -> MailMessage {
    MailMessage {
        to: message.email.clone(),
        subject: "We received your message".to_string(),
        html: wrap_html(&format!(
            "<p>Hi {},</p>\
             <p>Thanks for reaching out. Our team will get back to you shortly.</p>",
            escape_html(&message.name)
        )),
    }
}

fn wrap_html(content: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif;max-width:600px;margin:0 auto\">\
         {content}</body></html>"
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn contact() -> contact_message::Model {
        contact_message::Model {
            id: "c1".to_string(),
            name: "<b>Ravi</b>".to_string(),
            email: "ravi@example.com".to_string(),
            phone: String::new(),
            subject: "Order".to_string(),
            message: "Where is my order?".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_otp_message_mentions_code_and_lifetime() {
        let message = otp_message("a@x.com", "123456", 10);
        assert_eq!(message.to, "a@x.com");
        assert!(message.html.contains("123456"));
        assert!(message.html.contains("10 minutes"));
    }

    #[test]
    fn test_user_content_is_escaped() {
        let message = contact_ack_message(&contact());
        assert!(message.html.contains("&lt;b&gt;Ravi&lt;/b&gt;"));
        assert!(!message.html.contains("<b>Ravi"));
    }

    #[tokio::test]
    async fn test_unconfigured_service_fails() {
        let service = MailService::new(MailConfig::default());
        assert!(!service.is_enabled());

        let result = service.send_otp("a@x.com", "123456", 10).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_admin_notice_requires_admin_mailbox() {
        let service = MailService::new(MailConfig {
            api_key: Some("key".to_string()),
            sender_email: Some("noreply@example.com".to_string()),
            ..MailConfig::default()
        });

        let result = service.notify_admin_of_contact(&contact()).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[test]
    fn test_delivery_status_serializes_with_tag() {
        let sent = serde_json::to_value(DeliveryStatus::Sent).unwrap();
        assert_eq!(sent, serde_json::json!({ "status": "sent" }));

        let failed = DeliveryStatus::from_result(Err(AppError::ExternalService("down".into())));
        assert!(!failed.is_sent());
        let value = serde_json::to_value(failed).unwrap();
        assert_eq!(value["status"], "failed");
    }
}
