use super::address::Recipient;
use crate::errors::{ConfigurationError, SendError};
use crate::message::{EmailMessage, MandrillFields, Message, TemplateBlock, TemplateFields};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MergeVar<'a> {
    pub name: &'a str,
    pub content: &'a serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PayloadMessage<'a> {
    pub text: &'a str,
    pub subject: &'a str,
    pub from_email: String,
    pub from_name: String,
    pub to: Vec<Recipient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<&'a str, &'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_merge_vars: Option<Vec<MergeVar<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<&'a str>,
}

/// The request body for `messages/send` and `messages/send-template`.
///
/// Borrows from the message it was built from and lives for one send.
#[derive(Clone, PartialEq, serde::Serialize)]
pub struct Payload<'a> {
    key: &'a str,
    pub message: PayloadMessage<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_content: Option<&'a [TemplateBlock]>,
}

impl<'a> Payload<'a> {
    pub fn build(key: &'a str, message: &'a Message) -> Result<Self, SendError> {
        let fields = message.kind.mandrill_fields();
        let from_name = fields.and_then(|f| f.from_name.as_deref());
        let mut payload = Self::standard(key, &message.email, from_name)?;
        if let Some(fields) = fields {
            payload.merge_mandrill_fields(&message.email, fields)?;
        }
        if let Some(template) = message.kind.template() {
            payload.merge_template(template);
        }
        Ok(payload)
    }

    /// Fields every message carries, Mandrill extensions or not.
    fn standard(
        key: &'a str,
        email: &'a EmailMessage,
        from_name: Option<&str>,
    ) -> Result<Self, SendError> {
        let sender = Recipient::parse(&email.from_email)?;
        let to = email
            .recipients()
            .into_iter()
            .map(Recipient::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            key,
            message: PayloadMessage {
                text: email.body.as_str(),
                subject: email.subject.as_str(),
                from_email: sender.email,
                from_name: from_name.map(str::to_string).unwrap_or(sender.name),
                to,
                headers: None,
                tags: None,
                track_opens: None,
                track_clicks: None,
                global_merge_vars: None,
                html: None,
            },
            template_name: None,
            template_content: None,
        })
    }

    fn merge_mandrill_fields(
        &mut self,
        email: &'a EmailMessage,
        fields: &'a MandrillFields,
    ) -> Result<(), ConfigurationError> {
        let message = &mut self.message;
        message.headers = Some(accepted_headers(&email.extra_headers));
        message.tags = Some(fields.tags.as_slice());
        message.track_opens = Some(fields.track_opens);
        message.track_clicks = Some(fields.track_clicks);

        if let Some(vars) = fields.global_merge_vars.as_ref().filter(|v| !v.is_empty()) {
            message.global_merge_vars = Some(
                vars.iter()
                    .map(|(name, content)| MergeVar {
                        name: name.as_str(),
                        content,
                    })
                    .collect(),
            );
        }

        match email.alternatives.as_slice() {
            [] => {}
            [alternative] => message.html = Some(alternative.content.as_str()),
            _ => return Err(ConfigurationError::MultipleAlternatives),
        }
        Ok(())
    }

    fn merge_template(&mut self, template: &'a TemplateFields) {
        self.template_name = Some(template.template_name.as_str());
        self.template_content = Some(template.template_content.as_slice());
    }
}

impl fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("key", &"[REDACTED]")
            .field("message", &self.message)
            .field("template_name", &self.template_name)
            .field("template_content", &self.template_content)
            .finish()
    }
}

/// Mandrill only accepts `X-*` headers and `Reply-To`.
fn accepted_headers(headers: &BTreeMap<String, String>) -> BTreeMap<&str, &str> {
    headers
        .iter()
        .filter(|(name, _)| name.starts_with("X-") || name.as_str() == "Reply-To")
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect()
}
