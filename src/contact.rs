use std::time::Duration;

use serde::Serialize;

/// Why a contact message was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("please fill in the {0} field")]
    MissingField(&'static str),

    #[error("form relay answered with HTTP {status}")]
    Status { status: u16 },

    #[error("could not reach the form relay: {0}")]
    Transport(String),
}

/// JSON body posted to the form relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// Reject blank fields before any request is made.
    pub fn validate(&self) -> Result<(), ContactError> {
        if self.name.trim().is_empty() {
            return Err(ContactError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(ContactError::MissingField("email"));
        }
        if self.message.trim().is_empty() {
            return Err(ContactError::MissingField("message"));
        }
        Ok(())
    }
}

/// Blocking client for a Formspree-style relay endpoint.
pub struct FormRelay {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl FormRelay {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ContactError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContactError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    /// POST the message once. Only HTTP 200 counts as delivered; no retry.
    pub fn send(&self, msg: &ContactMessage) -> Result<(), ContactError> {
        msg.validate()?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(msg)
            .send()
            .map_err(|e| {
                log::warn!("contact form: {e}");
                ContactError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            log::warn!("contact form relay returned {status}");
            return Err(ContactError::Status {
                status: status.as_u16(),
            });
        }
        log::info!("contact message from {} delivered", msg.email);
        Ok(())
    }
}
