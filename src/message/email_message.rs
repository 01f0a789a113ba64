use std::collections::BTreeMap;

/// An alternative rendering of the body, e.g. an HTML companion to the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub content: String,
    pub mimetype: String,
}

/// A composed outbound email, independent of any provider.
///
/// Nothing here is validated: the backend checks what it needs at send time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailMessage {
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    pub from_email: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub extra_headers: BTreeMap<String, String>,
    pub alternatives: Vec<Alternative>,
    /// Charset the host used when composing.
    ///
    /// Only recorded on the send span. It has no effect on the payload:
    /// Mandrill takes UTF-8 JSON and encodes headers itself.
    pub encoding: Option<String>,
}

impl EmailMessage {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        from_email: impl Into<String>,
        to: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            from_email: from_email.into(),
            to,
            ..Self::default()
        }
    }

    /// Every address the message goes to: `to`, then `cc`, then `bcc`.
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .collect()
    }

    pub fn attach_alternative(&mut self, content: impl Into<String>, mimetype: impl Into<String>) {
        self.alternatives.push(Alternative {
            content: content.into(),
            mimetype: mimetype.into(),
        });
    }
}
