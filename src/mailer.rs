use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::config::MailConfig;

#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Email delivery. Errors propagate to the caller; nothing is retried.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Picks the SMTP relay when configured, otherwise logs outgoing mail.
pub fn from_config(config: Option<&MailConfig>) -> anyhow::Result<Arc<dyn Mailer>> {
    match config {
        Some(cfg) => Ok(Arc::new(SmtpMailer::new(cfg)?) as Arc<dyn Mailer>),
        None => {
            info!("SMTP not configured; activation mail will be logged");
            Ok(Arc::new(LogMailer) as Arc<dyn Mailer>)
        }
    }
}

/// Local dev sender that logs the message instead of sending it.
#[derive(Clone, Debug)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.html_body,
            "mail send stub"
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &MailConfig) -> anyhow::Result<Self> {
        let from = cfg.from.parse::<Mailbox>().context("parse MAIL_FROM")?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
            .context("smtp relay")?
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let to = message.to.parse::<Mailbox>().context("parse recipient")?;
        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body.clone())
            .context("build message")?;
        self.transport.send(email).await.context("smtp send")?;
        debug!(to = %message.to, "mail sent");
        Ok(())
    }
}

/// Account activation mail.
pub struct ActivationEmail<'a> {
    pub first_name: &'a str,
    pub activation_url: &'a str,
}

impl ActivationEmail<'_> {
    pub const SUBJECT: &'static str = "Activate your account";

    pub fn render(&self, to: &str) -> EmailMessage {
        let html_body = format!(
            r#"<div>
  <h1>Hi {name},</h1>
  <p>Thanks for signing up. Please confirm your email address to activate your account.</p>
  <p><a href="{url}">Activate account</a></p>
  <p>If the button does not work, paste this link into your browser:<br>{url}</p>
  <p>This link expires in 24 hours.</p>
</div>"#,
            name = self.first_name,
            url = self.activation_url,
        );
        EmailMessage {
            to: to.to_string(),
            subject: Self::SUBJECT.to_string(),
            html_body,
        }
    }
}
