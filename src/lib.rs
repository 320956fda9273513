//! mail-dispatch: compose an email and hand it to a lettre transport.
//!
//! ```rust,ignore
//! use mail_dispatch::{EmailService, MailConfig, email_to};
//!
//! let service = EmailService::from_config(&MailConfig::from_env()?)?;
//! service.send(
//!     email_to("Test User <test.user@example.com>")
//!         .subject("Test Email")
//!         .text("First Line\r\nSecond Line")
//!         .build(),
//! )?;
//! ```

pub mod config;
pub mod content;
pub mod email;
pub mod error;
pub mod service;
pub mod transport;

pub use config::{MailConfig, SmtpSecurity};
pub use content::{BytesSource, ContentSource, FileSource};
pub use email::{DEFAULT_FROM, Email, EmailBuilder, Parts, email_to};
pub use error::{ConfigError, ContentError, DispatchError, PartKind};
pub use service::EmailService;
