use anyhow::Context;
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use super::EmailProvider;

pub struct SmtpMailer {
    host: String,
    port: u16,
    credentials: Credentials,
    from_email: String,
}

impl SmtpMailer {
    pub fn new(
        host: String,
        port: u16,
        username: String,
        password: String,
        from_email: String,
    ) -> Self {
        Self {
            host,
            port,
            credentials: Credentials::new(username, password),
            from_email,
        }
    }

    fn build_transport(&self) -> anyhow::Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.host)
            .context("failed to create SMTP relay")?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();
        Ok(transport)
    }
}

#[async_trait]
impl EmailProvider for SmtpMailer {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .context("invalid sender address")?,
            )
            .to(to.parse().context("invalid recipient address")?)
            .subject(subject)
            .body(body.to_string())
            .context("failed to build email")?;

        let mailer = self.build_transport()?;

        // lettre's SmtpTransport is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map(|_| ())
                .context("failed to send email")
        })
        .await
        .context("email task failed")??;

        Ok(())
    }
}
