//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send
//! plain-text notification emails. If `SMTP_HOST` or `NOTIFY_EMAIL_TO` is
//! unset, [`EmailConfig::from_env`] returns `None` and no mailer is built.

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@helios.local";

/// Subject prefix for every outgoing message.
const SUBJECT_PREFIX: &str = "[Helios]";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Recipient of every notification.
    pub to_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable          | Required | Default                 |
    /// |-------------------|----------|-------------------------|
    /// | `SMTP_HOST`       | yes      | -                       |
    /// | `NOTIFY_EMAIL_TO` | yes      | -                       |
    /// | `SMTP_PORT`       | no       | `587`                   |
    /// | `SMTP_FROM`       | no       | `noreply@helios.local`  |
    /// | `SMTP_USER`       | no       | -                       |
    /// | `SMTP_PASSWORD`   | no       | -                       |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let smtp_host = lookup("SMTP_HOST")?;
        let to_address = lookup("NOTIFY_EMAIL_TO")?;
        Some(Self {
            smtp_host,
            smtp_port: lookup("SMTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            to_address,
            smtp_user: lookup("SMTP_USER"),
            smtp_password: lookup("SMTP_PASSWORD"),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send `title` / `content` to the configured recipient.
    pub async fn send(&self, title: &str, content: &str) -> Result<(), EmailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(self.config.to_address.parse()?)
            .subject(format!("{SUBJECT_PREFIX} {title}"))
            .header(ContentType::TEXT_PLAIN)
            .body(content.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = %self.config.to_address, title, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_requires_host_and_recipient() {
        assert!(EmailConfig::from_lookup(lookup(&[])).is_none());
        assert!(EmailConfig::from_lookup(lookup(&[("SMTP_HOST", "smtp.local")])).is_none());
        assert!(EmailConfig::from_lookup(lookup(&[("NOTIFY_EMAIL_TO", "ops@x.io")])).is_none());
    }

    #[test]
    fn config_applies_defaults() {
        let config = EmailConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.local"),
            ("NOTIFY_EMAIL_TO", "ops@x.io"),
            ("SMTP_PORT", "not-a-port"),
        ]))
        .unwrap();
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.from_address, "noreply@helios.local");
        assert!(config.smtp_user.is_none());
    }

    #[test]
    fn email_error_display_build() {
        let err = EmailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[tokio::test]
    async fn bad_recipient_fails_before_connecting() {
        let config = EmailConfig::from_lookup(lookup(&[
            ("SMTP_HOST", "smtp.invalid"),
            ("NOTIFY_EMAIL_TO", "not-an-email"),
        ]))
        .unwrap();
        let err = EmailDelivery::new(config).send("t", "c").await.unwrap_err();
        assert!(matches!(err, EmailError::Address(_)));
    }
}
