//! Configuration types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpSecurity {
    /// Plain connection. Only for local test servers.
    Plain,
    /// Upgrade with STARTTLS after connecting.
    #[default]
    StartTls,
    /// Implicit TLS from the first byte.
    Tls,
}

impl SmtpSecurity {
    pub fn default_port(self) -> u16 {
        match self {
            SmtpSecurity::Plain => 25,
            SmtpSecurity::StartTls => 587,
            SmtpSecurity::Tls => 465,
        }
    }
}

impl FromStr for SmtpSecurity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" => Ok(SmtpSecurity::Plain),
            "starttls" => Ok(SmtpSecurity::StartTls),
            "tls" | "smtps" => Ok(SmtpSecurity::Tls),
            other => Err(format!("expected none, starttls or tls, got '{other}'")),
        }
    }
}

impl fmt::Display for SmtpSecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmtpSecurity::Plain => f.write_str("none"),
            SmtpSecurity::StartTls => f.write_str("starttls"),
            SmtpSecurity::Tls => f.write_str("tls"),
        }
    }
}

/// SMTP transport configuration, built from environment variables.
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub security: SmtpSecurity,
    /// Per-command timeout for the SMTP session.
    pub timeout: Duration,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("security", &self.security)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl MailConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(host: impl Into<String>) -> Self {
        let security = SmtpSecurity::default();
        Self {
            host: host.into(),
            port: security.default_port(),
            username: None,
            password: None,
            security,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Build config from environment variables.
    ///
    /// - `MAIL_SMTP_HOST` (required)
    /// - `MAIL_SMTP_PORT` (default depends on security)
    /// - `MAIL_SMTP_USERNAME`, `MAIL_SMTP_PASSWORD`
    /// - `MAIL_SMTP_SECURITY`: `none`, `starttls` (default) or `tls`
    /// - `MAIL_SMTP_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("MAIL_SMTP_HOST")
            .ok_or_else(|| ConfigError::MissingEnvVar("MAIL_SMTP_HOST".into()))?;

        let security = match get("MAIL_SMTP_SECURITY") {
            Some(raw) => raw.parse::<SmtpSecurity>().map_err(|message| ConfigError::InvalidValue {
                key: "MAIL_SMTP_SECURITY".into(),
                message,
            })?,
            None => SmtpSecurity::default(),
        };

        let port = match get("MAIL_SMTP_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "MAIL_SMTP_PORT".into(),
                message: format!("'{raw}': {e}"),
            })?,
            None => security.default_port(),
        };

        let timeout = match get("MAIL_SMTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::InvalidValue {
                    key: "MAIL_SMTP_TIMEOUT_SECS".into(),
                    message: format!("'{raw}': {e}"),
                })?,
            None => Self::DEFAULT_TIMEOUT,
        };

        Ok(Self {
            host,
            port,
            username: get("MAIL_SMTP_USERNAME"),
            password: get("MAIL_SMTP_PASSWORD").map(SecretString::from),
            security,
            timeout,
        })
    }
}
