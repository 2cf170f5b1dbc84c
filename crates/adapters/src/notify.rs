// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SMTP notification transport (spec §4.G).

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use robosched_core::NotificationSettings;
use thiserror::Error;

/// Errors from the notification transport.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("message build failed: {0}")]
    Build(String),

    #[error("smtp transport failed: {0}")]
    Transport(String),
}

/// A single outbound email (spec §4.G step 4: subject/body templated per
/// event type by the caller; this adapter only knows how to send).
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Adapter for sending email notifications over SMTP.
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    async fn send(&self, settings: &NotificationSettings, email: &OutboundEmail) -> Result<(), NotifyError>;
}

/// Real SMTP adapter built fresh per send from [`NotificationSettings`] so
/// that API-driven settings updates take effect without a daemon restart
/// (spec §4.G `refresh_notification_service`).
#[derive(Clone, Copy, Debug, Default)]
pub struct SmtpNotifyAdapter;

impl SmtpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }

    fn build_transport(settings: &NotificationSettings, password: &str) -> Result<SmtpTransport, NotifyError> {
        // use_ssl and use_tls are mutually exclusive; if both are somehow
        // set, use_tls loses (spec §4.G step 4).
        let use_ssl = settings.use_ssl && !settings.use_tls;
        let mut builder = if use_ssl {
            SmtpTransport::relay(&settings.smtp_host).map_err(|e| NotifyError::Transport(e.to_string()))?
        } else {
            SmtpTransport::starttls_relay(&settings.smtp_host).map_err(|e| NotifyError::Transport(e.to_string()))?
        };
        builder = builder.port(settings.smtp_port);
        if !settings.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(settings.smtp_username.clone(), password.to_string()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl NotifyAdapter for SmtpNotifyAdapter {
    async fn send(&self, settings: &NotificationSettings, email: &OutboundEmail) -> Result<(), NotifyError> {
        let password = crate::secret_cipher::decrypt_to_string(&settings.smtp_password_encrypted)
            .unwrap_or_default();
        let settings = settings.clone();
        let email = email.clone();
        tokio::task::spawn_blocking(move || send_blocking(&settings, &email, &password))
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?
    }
}

fn send_blocking(settings: &NotificationSettings, email: &OutboundEmail, password: &str) -> Result<(), NotifyError> {
    let transport = SmtpNotifyAdapter::build_transport(settings, password)?;
    for recipient in &email.recipients {
        let message = Message::builder()
            .from(settings.sender_address.parse().map_err(|e: lettre::address::AddressError| NotifyError::Build(e.to_string()))?)
            .to(recipient.parse().map_err(|e: lettre::address::AddressError| NotifyError::Build(e.to_string()))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))?;
        transport.send(&message).map_err(|e| NotifyError::Transport(e.to_string()))?;
    }
    Ok(())
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::{NotifyAdapter, NotifyError, OutboundEmail};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use robosched_core::NotificationSettings;
    use std::sync::Arc;

    struct FakeNotifyState {
        calls: Vec<OutboundEmail>,
        fail_next: bool,
    }

    /// Fake SMTP adapter for testing: records sends, can be told to fail.
    #[derive(Clone)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifyAdapter {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new(), fail_next: false })) }
        }
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<OutboundEmail> {
            self.inner.lock().calls.clone()
        }

        pub fn fail_next_send(&self) {
            self.inner.lock().fail_next = true;
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn send(&self, _settings: &NotificationSettings, email: &OutboundEmail) -> Result<(), NotifyError> {
            let mut state = self.inner.lock();
            if state.fail_next {
                state.fail_next = false;
                return Err(NotifyError::Transport("simulated failure".into()));
            }
            state.calls.push(email.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
