use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

/// A rendered contact message ready for the transport. Sender and recipient
/// are fixed by the transport itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP failure: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message. No retry happens at this layer.
    async fn send(&self, mail: OutgoingMail) -> Result<(), SendError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Builds the transport and parses the fixed sender/recipient. Nothing is
    /// sent over the network here.
    pub fn new(config: &SmtpConfig) -> Result<Self, SendError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(TlsParameters::new(config.host.clone())?))
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: config.from.parse()?,
            to: config.to.parse()?,
        })
    }

    /// Opens a connection and says hello. Used for a startup log line only.
    pub async fn verify(&self) -> Result<bool, SendError> {
        Ok(self.transport.test_connection().await?)
    }

    /// `verify` bounded by `limit`; a silent server is reported as unavailable.
    pub async fn verify_within(&self, limit: Duration) -> Result<bool, SendError> {
        tokio::time::timeout(limit, self.verify())
            .await
            .map_err(|_| SendError::Unavailable(format!("no SMTP greeting within {:?}", limit)))?
    }

    pub fn build_message(&self, mail: OutgoingMail) -> Result<Message, SendError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .reply_to(mail.reply_to.parse()?)
            .subject(mail.subject)
            .multipart(MultiPart::alternative_plain_html(mail.text, mail.html))?;
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), SendError> {
        let message = self.build_message(mail)?;
        let response = self.transport.send(message).await?;
        tracing::debug!("SMTP accepted message: {:?}", response.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secure: bool) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            secure,
            username: "mailer".into(),
            password: "secret".into(),
            from: "Portfolio <site@example.com>".into(),
            to: "me@example.com".into(),
        }
    }

    fn mail() -> OutgoingMail {
        OutgoingMail {
            reply_to: "visitor@example.org".into(),
            subject: "Portfolio contact: Hello".into(),
            text: "plain body".into(),
            html: "<p>html body</p>".into(),
        }
    }

    #[tokio::test]
    async fn message_uses_fixed_pair_and_reply_to() {
        let mailer = SmtpMailer::new(&config(false)).unwrap();
        let raw = String::from_utf8(mailer.build_message(mail()).unwrap().formatted()).unwrap();

        assert!(raw.contains("From: Portfolio <site@example.com>"));
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("Reply-To: visitor@example.org"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("plain body"));
        assert!(raw.contains("<p>html body</p>"));
    }

    #[tokio::test]
    async fn secure_transport_builds() {
        assert!(SmtpMailer::new(&config(true)).is_ok());
    }

    #[tokio::test]
    async fn bad_sender_is_rejected() {
        let mut config = config(true);
        config.from = "nope".into();
        assert!(matches!(SmtpMailer::new(&config), Err(SendError::Address(_))));
    }

    #[tokio::test]
    async fn bad_reply_to_fails_the_build() {
        let mailer = SmtpMailer::new(&config(true)).unwrap();
        let mut mail = mail();
        mail.reply_to = "not-an-email".into();
        assert!(mailer.build_message(mail).is_err());
    }

    #[tokio::test]
    async fn accepted_reply_to_always_builds() {
        let mailer = SmtpMailer::new(&config(false)).unwrap();
        for email in [
            "a@b.com",
            "first.last+tag@sub.example.org",
            r#""a b"@c.com"#,
            "a@[1.2.3.4]",
        ] {
            let mut mail = mail();
            mail.reply_to = email.into();
            assert_eq!(
                crate::validation::is_valid_email(email),
                mailer.build_message(mail).is_ok(),
                "{email}"
            );
        }
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        // accepts the connection but never sends a greeting
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut config = config(false);
        config.host = "127.0.0.1".into();
        config.port = port;
        let mailer = SmtpMailer::new(&config).unwrap();

        let started = std::time::Instant::now();
        let result = mailer.verify_within(Duration::from_millis(200)).await;
        assert!(matches!(result, Err(SendError::Unavailable(_))), "{result:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
