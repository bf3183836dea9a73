use crate::constants::{EMAIL_MAX_LEN, MESSAGE_LEN, NAME_LEN, SUBJECT_LEN};
use crate::models::{ContactMessage, FieldError};
use lettre::{message::Mailbox, Address};

/// Trims every field and checks all of them, returning the cleaned message
/// or every violation found. Never stops at the first failure.
pub fn validate_contact(input: &ContactMessage) -> Result<ContactMessage, Vec<FieldError>> {
    let cleaned = ContactMessage {
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        subject: input.subject.trim().to_string(),
        message: input.message.trim().to_string(),
    };

    let mut errors = Vec::new();

    if !within(&cleaned.name, NAME_LEN) {
        errors.push(length_error("name", "Name", NAME_LEN));
    }
    if !is_valid_email(&cleaned.email) {
        errors.push(FieldError::new("email", "Please provide a valid email address"));
    }
    if !within(&cleaned.subject, SUBJECT_LEN) {
        errors.push(length_error("subject", "Subject", SUBJECT_LEN));
    }
    if !within(&cleaned.message, MESSAGE_LEN) {
        errors.push(length_error("message", "Message", MESSAGE_LEN));
    }

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        Err(errors)
    }
}

fn within(value: &str, (min, max): (usize, usize)) -> bool {
    let len = value.chars().count();
    (min..=max).contains(&len)
}

fn length_error(field: &'static str, label: &str, (min, max): (usize, usize)) -> FieldError {
    FieldError::new(
        field,
        format!("{label} must be between {min} and {max} characters"),
    )
}

/// RFC 5321 syntax via lettre, plus a dotted domain so `user@localhost`
/// style addresses are refused. The value must also parse as a `Mailbox`,
/// which is how the mailer reads it for the reply-to header.
pub fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.len() > EMAIL_MAX_LEN {
        return false;
    }
    if value.parse::<Mailbox>().is_err() {
        return false;
    }
    match value.parse::<Address>() {
        Ok(address) => {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}
