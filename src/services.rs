use crate::constants::MAIL_SUBJECT_PREFIX;
use crate::error::{AppError, Result};
use crate::mailer::{Mailer, OutgoingMail};
use crate::models::ContactMessage;
use crate::validation::validate_contact;
use std::sync::Arc;

pub struct ContactService {
    mailer: Arc<dyn Mailer>,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Validate and relay one contact message.
    /// Important: nothing is sent unless every field passes
    pub async fn submit(&self, input: &ContactMessage) -> Result<()> {
        let message = validate_contact(input).map_err(|errors| {
            tracing::debug!("Rejected contact submission ({} invalid fields)", errors.len());
            AppError::Validation(errors)
        })?;

        self.mailer.send(render_mail(&message)).await?;

        tracing::info!(
            "Relayed contact message ({} chars) with reply-to {}",
            message.message.chars().count(),
            message.email
        );
        Ok(())
    }
}

/// Plain-text and HTML renderings of a validated message
pub fn render_mail(message: &ContactMessage) -> OutgoingMail {
    let text = format!(
        "Name: {}\nEmail: {}\nSubject: {}\n\n{}\n",
        message.name, message.email, message.subject, message.message
    );

    let html = format!(
        "<h2>New portfolio message</h2>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Subject:</strong> {}</p>\n\
         <p>{}</p>\n",
        escape_html(&message.name),
        escape_html(&message.email),
        escape_html(&message.subject),
        escape_html(&message.message).replace('\n', "<br>"),
    );

    OutgoingMail {
        reply_to: message.email.clone(),
        subject: format!("{}{}", MAIL_SUBJECT_PREFIX, strip_control(&message.subject)),
        text,
        html,
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Header values must stay on one line
fn strip_control(input: &str) -> String {
    input
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
