//! Two-path email dispatch over a lettre transport.
//!
//! Plain text emails go out as a single `text/plain` part. Anything with an
//! HTML body or named parts goes out as:
//!
//! ```text
//! multipart/mixed
//!   multipart/related
//!     text/html | multipart/alternative | text/plain
//!     inline parts...
//!   attachment parts...
//! ```

use std::sync::Arc;

use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MessageBuilder, MultiPart, SinglePart};
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::content::{ContentSource, resolve_content_type};
use crate::email::Email;
use crate::error::{ConfigError, ContentError, DispatchError, PartKind};

/// Sends [`Email`] values through a lettre [`Transport`].
pub struct EmailService<T> {
    transport: T,
}

impl EmailService<SmtpTransport> {
    /// Build a service backed by an SMTP transport.
    pub fn from_config(config: &MailConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(crate::transport::smtp_transport(config)?))
    }
}

impl<T> EmailService<T>
where
    T: Transport,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one email, picking the simple or multipart path.
    pub fn send(&self, email: Email) -> Result<(), DispatchError> {
        let simple = email.is_simple_message();
        tracing::debug!(
            simple,
            recipients = email.recipient_count(),
            inline = email.inline_parts().len(),
            attachments = email.attachment_parts().len(),
            "Dispatching email"
        );

        let message = if simple {
            build_simple_message(&email)?
        } else {
            build_mime_message(&email)?
        };

        match self.transport.send(&message) {
            Ok(_) => {
                tracing::info!("Email sent to {} recipient(s)", email.recipient_count());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Email send failed: {e}");
                Err(DispatchError::Transport(Box::new(e)))
            }
        }
    }
}

impl<T> EmailService<T>
where
    T: Transport + Send + Sync + 'static,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    /// Run [`send`](Self::send) on the blocking pool.
    pub async fn send_async(self: Arc<Self>, email: Email) -> Result<(), DispatchError> {
        tokio::task::spawn_blocking(move || self.send(email)).await?
    }
}

/// Headers shared by both paths.
fn headers(email: &Email) -> Result<MessageBuilder, DispatchError> {
    let mut builder = Message::builder().from(mailbox("from", email.from())?);

    for address in email.to_list() {
        builder = builder.to(mailbox("to", address)?);
    }
    for address in email.cc_list() {
        builder = builder.cc(mailbox("cc", address)?);
    }
    for address in email.bcc_list() {
        builder = builder.bcc(mailbox("bcc", address)?);
    }
    if let Some(address) = email.reply_to() {
        builder = builder.reply_to(mailbox("reply-to", address)?);
    }
    if let Some(subject) = email.subject() {
        builder = builder.subject(subject);
    }

    Ok(builder)
}

fn mailbox(field: &'static str, address: &str) -> Result<Mailbox, DispatchError> {
    address
        .parse()
        .map_err(|source| DispatchError::InvalidAddress {
            field,
            address: address.to_string(),
            source,
        })
}

pub(crate) fn build_simple_message(email: &Email) -> Result<Message, DispatchError> {
    let message = headers(email)?
        .header(ContentType::TEXT_PLAIN)
        .body(email.text().unwrap_or_default().to_string())?;
    Ok(message)
}

pub(crate) fn build_mime_message(email: &Email) -> Result<Message, DispatchError> {
    let mut related = match (email.text(), email.html()) {
        (Some(text), Some(html)) => MultiPart::related().multipart(
            MultiPart::alternative_plain_html(text.to_string(), html.to_string()),
        ),
        (None, Some(html)) => MultiPart::related().singlepart(SinglePart::html(html.to_string())),
        (text, None) => MultiPart::related()
            .singlepart(SinglePart::plain(text.unwrap_or_default().to_string())),
    };

    for (name, source) in email.inline_parts().iter() {
        let (body, content_type) = load_part(PartKind::Inline, name, source)?;
        related = related.singlepart(Attachment::new_inline(name.to_string()).body(body, content_type));
    }

    let mut mixed = MultiPart::mixed().multipart(related);

    for (name, source) in email.attachment_parts().iter() {
        let (body, content_type) = load_part(PartKind::Attachment, name, source)?;
        mixed = mixed.singlepart(Attachment::new(name.to_string()).body(body, content_type));
    }

    let message = headers(email)?.multipart(mixed)?;
    Ok(message)
}

/// Read a named part into a base64 body.
///
/// Part bytes go out exactly as read, whatever their MIME type; 7bit text
/// would put bare LF line endings on the wire.
fn load_part(
    kind: PartKind,
    name: &str,
    source: &dyn ContentSource,
) -> Result<(Body, ContentType), DispatchError> {
    let attach_err = |source: ContentError| DispatchError::Attachment {
        kind,
        name: name.to_string(),
        source,
    };
    let content_type = resolve_content_type(name, source).map_err(attach_err)?;
    let bytes = source.read().map_err(|e| attach_err(e.into()))?;
    let body = Body::new_with_encoding(bytes, ContentTransferEncoding::Base64)
        .map_err(|_| attach_err(ContentError::Encoding))?;
    Ok((body, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BytesSource, FileSource};
    use crate::email::email_to;
    use lettre::address::Envelope;

    /// Transport that always fails, counting attempts.
    #[derive(Default)]
    struct FailingTransport {
        attempts: std::sync::atomic::AtomicUsize,
    }

    impl Transport for FailingTransport {
        type Ok = ();
        type Error = std::io::Error;

        fn send_raw(&self, _envelope: &Envelope, _email: &[u8]) -> Result<(), std::io::Error> {
            self.attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn simple_message_is_single_plain_part() {
        let email = email_to("to@example.com")
            .from("from@example.com")
            .subject("Hello")
            .text("Body")
            .build();
        let raw = formatted(&build_simple_message(&email).unwrap());
        assert!(raw.contains("Content-Type: text/plain"));
        assert!(!raw.contains("multipart/"));
        assert!(raw.contains("Subject: Hello"));
    }

    #[test]
    fn mime_message_nests_related_inside_mixed() {
        let email = email_to("to@example.com")
            .html("<b>Body</b>")
            .inline("logo.png", BytesSource::new(vec![1, 2, 3]))
            .attachment("report.bin", BytesSource::new(vec![4, 5, 6]))
            .build();
        let raw = formatted(&build_mime_message(&email).unwrap());

        let mixed = raw.find("multipart/mixed").unwrap();
        let related = raw.find("multipart/related").unwrap();
        let html = raw.find("text/html").unwrap();
        assert!(mixed < related && related < html);
        assert!(raw.contains("Content-ID: <logo.png>"));
        assert!(raw.contains("filename=\"report.bin\""));
    }

    #[test]
    fn text_typed_parts_are_base64_encoded() {
        let email = email_to("to@example.com")
            .html("<b>notes</b>")
            .inline("inline.txt", BytesSource::new("x\ny\n"))
            .attachment("notes.txt", BytesSource::new("a\nb\n"))
            .build();
        let raw = formatted(&build_mime_message(&email).unwrap());

        assert!(raw.contains("Content-Type: text/plain"));
        assert_eq!(raw.matches("Content-Transfer-Encoding: base64").count(), 2);
        assert!(!raw.contains("a\nb"));
    }

    #[test]
    fn mime_message_with_text_and_html_uses_alternative() {
        let email = email_to("to@example.com")
            .text("plain")
            .html("<p>rich</p>")
            .build();
        let raw = formatted(&build_mime_message(&email).unwrap());
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn attachment_without_html_falls_back_to_plain_body() {
        let email = email_to("to@example.com")
            .text("see attached")
            .attachment("data.bin", BytesSource::new(vec![0]))
            .build();
        let raw = formatted(&build_mime_message(&email).unwrap());
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/plain"));
        assert!(!raw.contains("text/html"));
    }

    #[test]
    fn unreadable_attachment_is_attachment_error() {
        let dir = tempfile::tempdir().unwrap();
        let email = email_to("to@example.com")
            .html("<b>x</b>")
            .attachment("missing.pdf", FileSource::new(dir.path().join("missing.pdf")))
            .build();

        let service = EmailService::new(FailingTransport::default());
        let err = service.send(email).unwrap_err();
        match err {
            DispatchError::Attachment { kind, name, source } => {
                assert_eq!(kind, PartKind::Attachment);
                assert_eq!(name, "missing.pdf");
                assert!(matches!(source, ContentError::Io(_)));
            }
            other => panic!("expected attachment error, got {other:?}"),
        }
        assert_eq!(
            service.transport().attempts.load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[test]
    fn unreadable_inline_part_reports_inline_kind() {
        let dir = tempfile::tempdir().unwrap();
        let email = email_to("to@example.com")
            .html("<img src=\"cid:logo.png\">")
            .inline("logo.png", FileSource::new(dir.path().join("logo.png")))
            .build();

        let err = build_mime_message(&email).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Attachment { kind: PartKind::Inline, .. }
        ));
        assert!(err.to_string().contains("inline attachment 'logo.png'"));
    }

    #[test]
    fn invalid_address_names_the_field() {
        let email = email_to("not an address").text("x").build();
        let err = build_simple_message(&email).unwrap_err();
        match err {
            DispatchError::InvalidAddress { field, address, .. } => {
                assert_eq!(field, "to");
                assert_eq!(address, "not an address");
            }
            other => panic!("expected invalid address, got {other:?}"),
        }
    }

    #[test]
    fn no_recipients_is_build_error() {
        let email = Email::builder().text("nobody").build();
        let err = build_simple_message(&email).unwrap_err();
        assert!(matches!(err, DispatchError::Build(_)));
    }

    #[test]
    fn transport_failure_is_wrapped_unmodified() {
        let service = EmailService::new(FailingTransport::default());
        let err = service
            .send(email_to("to@example.com").text("x").build())
            .unwrap_err();

        let DispatchError::Transport(inner) = &err else {
            panic!("expected transport error, got {err:?}");
        };
        let io = inner.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
        assert_eq!(
            service.transport().attempts.load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }
}
