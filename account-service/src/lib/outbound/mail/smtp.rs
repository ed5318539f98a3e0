use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::Address;
use lettre::Message;
use lettre::SmtpTransport;
use lettre::Transport;

use super::templates;
use super::templates::MailContent;
use crate::config::SharedConfig;
use crate::config::SmtpConfig;
use crate::domain::user::models::ActivationKey;
use crate::domain::user::models::LoginName;
use crate::domain::user::models::Password;
use crate::domain::user::models::User;
use crate::domain::user::ports::Mailer;
use crate::user::errors::MailError;

/// Mailer delivering through an SMTP relay.
///
/// Settings are read from the shared configuration on every send, so a
/// reload takes effect for the next mail.
pub struct SmtpMailer {
    config: SharedConfig,
}

impl SmtpMailer {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    async fn deliver(&self, recipient: &LoginName, content: MailContent) -> Result<(), MailError> {
        let smtp = self.config.read().await.smtp.clone();
        let message = build_message(&smtp, recipient, content)?;

        // lettre's blocking transport, kept off the async workers
        tokio::task::spawn_blocking(move || {
            let builder = if smtp.starttls {
                SmtpTransport::starttls_relay(&smtp.host)
                    .map_err(|e| MailError::DeliveryFailed(e.to_string()))?
            } else {
                SmtpTransport::builder_dangerous(&smtp.host)
            };
            let mut transport = builder.port(smtp.port);

            if !smtp.username.is_empty() {
                transport = transport.credentials(Credentials::new(smtp.username, smtp.password));
            }

            transport
                .build()
                .send(&message)
                .map(|_| ())
                .map_err(|e| MailError::DeliveryFailed(e.to_string()))
        })
        .await
        .map_err(|e| MailError::DeliveryFailed(e.to_string()))??;

        tracing::debug!(recipient = %recipient, "Mail delivered");

        Ok(())
    }
}

fn build_message(
    smtp: &SmtpConfig,
    recipient: &LoginName,
    content: MailContent,
) -> Result<Message, MailError> {
    let sender_address = smtp
        .sender_address
        .parse::<Address>()
        .map_err(|e| MailError::InvalidAddress(format!("sender: {}", e)))?;
    let recipient_address = recipient
        .as_str()
        .parse::<Address>()
        .map_err(|e| MailError::InvalidAddress(format!("recipient: {}", e)))?;

    Message::builder()
        .from(Mailbox::new(Some(smtp.sender_name.clone()), sender_address))
        .to(Mailbox::new(
            Some(recipient.display_name().to_string()),
            recipient_address,
        ))
        .subject(content.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(content.body)
        .map_err(|e| MailError::BuildFailed(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_activation(&self, user: &User, key: &ActivationKey) -> Result<(), MailError> {
        let public_url = self.config.read().await.server.public_url.clone();
        let link = templates::activation_link(&public_url, key);

        self.deliver(
            &user.login_name,
            templates::activation(&user.login_name, &link),
        )
        .await
    }

    async fn send_temporary_password(
        &self,
        user: &User,
        password: &Password,
    ) -> Result<(), MailError> {
        self.deliver(
            &user.login_name,
            templates::temporary_password(&user.login_name, password),
        )
        .await
    }
}
