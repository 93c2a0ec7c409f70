use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::config::Settings;
use crate::error::TrackerError;

/// Outbound mail seam. Injected into the notifier so tests can record sends
/// instead of talking to an SMTP relay.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), TrackerError>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &Settings) -> Result<Self, TrackerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)
            .map_err(|e| TrackerError::Notification(e.to_string()))?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.smtp_user.clone(),
                settings.smtp_password.clone(),
            ))
            .build();

        let from: Mailbox = format!("Price Watch <{}>", settings.smtp_user)
            .parse()
            .map_err(|e| TrackerError::Notification(format!("invalid from address: {e}")))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), TrackerError> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| TrackerError::Notification(format!("invalid recipient {to:?}: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| TrackerError::Notification(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| TrackerError::Notification(e.to_string()))?;

        Ok(())
    }
}
