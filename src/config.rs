use crate::constants::{DEFAULT_ENVIRONMENT, DEFAULT_PORT};
use std::env;
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Outbound mail settings. All fields are required at startup.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, opportunistic STARTTLS otherwise
    pub secure: bool,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub trust_proxy: bool,
    pub static_dir: Option<String>,
    pub smtp: SmtpConfig,
}

/// Log filter from `RUST_LOG`, falling back to `default`. Load `.env`
/// before calling this so a `RUST_LOG` set there applies.
pub fn log_filter(default: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Every missing required key is collected before failing so the operator
    /// sees the whole list at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let host = required("SMTP_HOST");
        let port = required("SMTP_PORT");
        let secure = required("SMTP_SECURE");
        let username = required("SMTP_USER");
        let password = required("SMTP_PASS");
        let from = required("MAIL_FROM");
        let to = required("MAIL_TO");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let smtp = SmtpConfig {
            host,
            port: parse_port("SMTP_PORT", &port)?,
            secure: parse_bool("SMTP_SECURE", &secure)?,
            username,
            password,
            from,
            to,
        };

        Ok(Self {
            port: match get("PORT") {
                Some(v) => parse_port("PORT", &v)?,
                None => DEFAULT_PORT,
            },
            environment: get("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().trim_end_matches('/').to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            trust_proxy: match get("TRUST_PROXY") {
                Some(v) => parse_bool("TRUST_PROXY", &v)?,
                None => false,
            },
            static_dir: get("STATIC_DIR"),
            smtp,
        })
    }
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{value:?} is not a port number ({e})"),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            key,
            reason: format!("{other:?} is not a boolean"),
        }),
    }
}
