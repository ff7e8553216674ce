/*!
 * Contact Form
 * Stores a message and, when opted in, a newsletter lead keyed by email
 */
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{Lead, Message};
use crate::db::{DataAccess, StoreError};
use crate::error::GENERIC_ERROR;

pub const LEAD_SOURCE: &str = "contact_form";
pub const REQUIRED_FIELDS_ERROR: &str = "Please fill in your name, email and message.";
pub const NOT_CONFIGURED_ERROR: &str =
    "The contact form is unavailable because the backend is not configured.";

/// Raw form fields; the checkbox arrives only when ticked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub subscribe_newsletter: Option<String>,
}

impl ContactInput {
    pub fn subscribes(&self) -> bool {
        self.subscribe_newsletter.is_some()
    }

    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.message.trim().is_empty()
    }

    fn to_message(&self) -> Message {
        let subject = self.subject.trim();
        Message {
            id: Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            subject: (!subject.is_empty()).then(|| subject.to_string()),
            message: self.message.trim().to_string(),
            subscribe_newsletter: self.subscribes(),
            is_read: false,
            created_at: Utc::now(),
        }
    }

    fn to_lead(&self) -> Lead {
        Lead {
            id: None,
            email: self.email.trim().to_lowercase(),
            name: self.name.trim().to_string(),
            source: LEAD_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Editing { error: Option<String> },
    Submitting,
    Submitted,
}

/// One visitor's form: entered values plus where the submission stands.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactForm {
    pub values: ContactInput,
    pub state: FormState,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            values: ContactInput::default(),
            state: FormState::Editing { error: None },
        }
    }
}

/// Only the message insert decides the outcome. A failed lead upsert is
/// logged and the submission still counts as sent.
async fn persist(access: &DataAccess, values: &ContactInput) -> Result<(), StoreError> {
    access.from::<Message>().insert(&[values.to_message()]).await?;
    if values.subscribes() {
        if let Err(e) = access
            .from::<Lead>()
            .upsert(&[values.to_lead()], "email")
            .await
        {
            tracing::error!(error = %e, "failed to record newsletter lead");
        }
    }
    Ok(())
}

impl ContactForm {
    pub fn with_values(values: ContactInput) -> Self {
        Self {
            values,
            state: FormState::Editing { error: None },
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Editing { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Run one submission. On failure the entered values stay and the form
    /// returns to editing with an error; on success the fields are cleared.
    pub async fn submit(&mut self, access: &DataAccess) -> &FormState {
        if !self.values.is_complete() {
            self.state = FormState::Editing {
                error: Some(REQUIRED_FIELDS_ERROR.to_string()),
            };
            return &self.state;
        }

        self.state = FormState::Submitting;
        match persist(access, &self.values).await {
            Ok(()) => {
                tracing::info!(newsletter = self.values.subscribes(), "contact message stored");
                self.values = ContactInput::default();
                self.state = FormState::Submitted;
            }
            Err(StoreError::NotConfigured) => {
                self.state = FormState::Editing {
                    error: Some(NOT_CONFIGURED_ERROR.to_string()),
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "contact form submission failed");
                self.state = FormState::Editing {
                    error: Some(GENERIC_ERROR.to_string()),
                };
            }
        }
        &self.state
    }
}
