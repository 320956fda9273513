//! SMTP transport construction.

use lettre::SmtpTransport;
use lettre::transport::smtp::authentication::Credentials;
use secrecy::ExposeSecret;

use crate::config::{MailConfig, SmtpSecurity};
use crate::error::ConfigError;

/// Build a blocking SMTP transport from `config`.
///
/// Credentials are only attached when a username is configured; a missing
/// password is sent as empty.
pub fn smtp_transport(config: &MailConfig) -> Result<SmtpTransport, ConfigError> {
    let tls_err = |source| ConfigError::Transport {
        host: config.host.clone(),
        source,
    };

    let builder = match config.security {
        SmtpSecurity::Plain => SmtpTransport::builder_dangerous(&config.host),
        SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&config.host).map_err(tls_err)?,
        SmtpSecurity::Tls => SmtpTransport::relay(&config.host).map_err(tls_err)?,
    };

    let mut builder = builder.port(config.port).timeout(Some(config.timeout));

    if let Some(username) = &config.username {
        let password = config
            .password
            .as_ref()
            .map(|p| p.expose_secret().to_string())
            .unwrap_or_default();
        builder = builder.credentials(Credentials::new(username.clone(), password));
    }

    tracing::debug!(
        "SMTP transport for {}:{} ({})",
        config.host,
        config.port,
        config.security
    );

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_transport_for_every_security_mode() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        for security in [SmtpSecurity::Plain, SmtpSecurity::StartTls, SmtpSecurity::Tls] {
            let mut config = MailConfig::new("localhost");
            config.security = security;
            config.port = 3025;
            assert!(smtp_transport(&config).is_ok(), "{security} transport");
        }
    }

    #[test]
    fn builds_transport_with_credentials() {
        let mut config = MailConfig::new("localhost");
        config.security = SmtpSecurity::Plain;
        config.username = Some("user".into());
        config.password = Some(secrecy::SecretString::from("pass".to_string()));
        assert!(smtp_transport(&config).is_ok());
    }
}
