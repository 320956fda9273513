//! The `Email` value and its accumulating builder.

use std::fmt;
use std::sync::Arc;

use crate::content::ContentSource;

/// Sender used when the builder is never given a `from` address.
pub const DEFAULT_FROM: &str = "test@test.com";

/// Named content sources in insertion order.
///
/// Re-inserting an existing name replaces its source in place.
#[derive(Clone, Default)]
pub struct Parts {
    entries: Vec<(String, Arc<dyn ContentSource>)>,
}

impl Parts {
    fn insert(&mut self, name: String, source: Arc<dyn ContentSource>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = source,
            None => self.entries.push((name, source)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&dyn ContentSource> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, source)| source.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn ContentSource)> {
        self.entries
            .iter()
            .map(|(name, source)| (name.as_str(), source.as_ref()))
    }
}

impl fmt::Debug for Parts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, source)| (name, source)))
            .finish()
    }
}

/// An email ready for dispatch.
///
/// Built once through [`EmailBuilder`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Email {
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    from: String,
    reply_to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
    inline_parts: Parts,
    attachment_parts: Parts,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    pub fn to_list(&self) -> &[String] {
        &self.to
    }

    pub fn cc_list(&self) -> &[String] {
        &self.cc
    }

    pub fn bcc_list(&self) -> &[String] {
        &self.bcc
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    pub fn inline_parts(&self) -> &Parts {
        &self.inline_parts
    }

    pub fn attachment_parts(&self) -> &Parts {
        &self.attachment_parts
    }

    /// Plain text only: no HTML body and no inline or attached parts.
    pub fn is_simple_message(&self) -> bool {
        self.html.is_none() && self.inline_parts.is_empty() && self.attachment_parts.is_empty()
    }

    /// Number of envelope recipients across to, cc and bcc.
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

/// Start an email addressed to `address`.
pub fn email_to(address: impl Into<String>) -> EmailBuilder {
    Email::builder().to(address)
}

/// Accumulating builder for [`Email`].
///
/// Recipient calls append, scalar calls overwrite, part calls insert by name.
/// Nothing is validated here; bad addresses surface when the email is sent.
#[derive(Debug, Clone)]
pub struct EmailBuilder {
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    from: String,
    reply_to: Option<String>,
    subject: Option<String>,
    text: Option<String>,
    html: Option<String>,
    inline_parts: Parts,
    attachment_parts: Parts,
}

impl Default for EmailBuilder {
    fn default() -> Self {
        Self {
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            from: DEFAULT_FROM.to_string(),
            reply_to: None,
            subject: None,
            text: None,
            html: None,
            inline_parts: Parts::default(),
            attachment_parts: Parts::default(),
        }
    }
}

impl EmailBuilder {
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = address.into();
        self
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Register content shown inline, referenced from the HTML body as
    /// `cid:<name>`.
    pub fn inline(mut self, name: impl Into<String>, source: impl ContentSource + 'static) -> Self {
        self.inline_parts.insert(name.into(), Arc::new(source));
        self
    }

    /// Register a file attachment delivered under `name`.
    pub fn attachment(
        mut self,
        name: impl Into<String>,
        source: impl ContentSource + 'static,
    ) -> Self {
        self.attachment_parts.insert(name.into(), Arc::new(source));
        self
    }

    pub fn build(self) -> Email {
        Email {
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            from: self.from,
            reply_to: self.reply_to,
            subject: self.subject,
            text: self.text,
            html: self.html,
            inline_parts: self.inline_parts,
            attachment_parts: self.attachment_parts,
        }
    }
}
