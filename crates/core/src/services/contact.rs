//! Contact form.

use chrono::Utc;
use marketplace_common::{AppError, AppResult, IdGenerator};
use marketplace_db::{entities::contact_message, repositories::ContactMessageRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::form::normalize_email;
use super::mail::{DeliveryStatus, MailService};

const DEFAULT_SUBJECT: &str = "General enquiry";

/// Submitted contact form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// Stored message with the outcome of both notifications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactReceipt {
    pub contact: contact_message::Model,
    pub delivery: DeliveryStatus,
    pub acknowledgement: DeliveryStatus,
}

/// Contact service.
#[derive(Clone)]
pub struct ContactService {
    contact_repo: ContactMessageRepository,
    mail: MailService,
    id_gen: IdGenerator,
}

impl ContactService {
    /// Create a new contact service.
    #[must_use]
    pub const fn new(contact_repo: ContactMessageRepository, mail: MailService) -> Self {
        Self {
            contact_repo,
            mail,
            id_gen: IdGenerator::new(),
        }
    }

    /// Persist a submission, then mail the admin and the sender.
    pub async fn submit(&self, input: ContactSubmission) -> AppResult<ContactReceipt> {
        let name = input.name.trim();
        let body = input.message.trim();
        if name.is_empty() || input.email.trim().is_empty() || body.is_empty() {
            return Err(AppError::Validation(
                "Name, email and message are required".to_string(),
            ));
        }
        let email = normalize_email(&input.email)?;

        let subject = match input.subject.trim() {
            "" => DEFAULT_SUBJECT.to_string(),
            s => s.to_string(),
        };

        let model = contact_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            email: Set(email),
            phone: Set(input.phone.trim().to_string()),
            subject: Set(subject),
            message: Set(body.to_string()),
            created_at: Set(Utc::now().into()),
        };
        let contact = self.contact_repo.create(model).await?;
        info!(contact_id = %contact.id, "Contact message stored");

        let delivery = DeliveryStatus::from_result(self.mail.notify_admin_of_contact(&contact).await);
        let acknowledgement =
            DeliveryStatus::from_result(self.mail.acknowledge_contact(&contact).await);

        Ok(ContactReceipt {
            contact,
            delivery,
            acknowledgement,
        })
    }
}
