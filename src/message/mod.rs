mod email_message;
mod tags;

use crate::errors::ConfigurationError;
pub use email_message::{Alternative, EmailMessage};
use std::collections::BTreeMap;
pub use tags::{normalize_tags, MAX_TAG_LENGTH};

/// Caller-supplied Mandrill extensions, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MandrillOptions {
    pub from_name: Option<String>,
    pub tags: Vec<String>,
    pub track_opens: bool,
    pub track_clicks: bool,
    pub global_merge_vars: Option<BTreeMap<String, serde_json::Value>>,
}

impl Default for MandrillOptions {
    fn default() -> Self {
        Self {
            from_name: None,
            tags: Vec::new(),
            track_opens: true,
            track_clicks: true,
            global_merge_vars: None,
        }
    }
}

/// Mandrill extensions that passed construction-time validation.
///
/// Fields stay public so callers can adjust them before sending; the
/// backend does not validate them again.
#[derive(Debug, Clone, PartialEq)]
pub struct MandrillFields {
    pub from_name: Option<String>,
    pub tags: Vec<String>,
    pub track_opens: bool,
    pub track_clicks: bool,
    pub global_merge_vars: Option<BTreeMap<String, serde_json::Value>>,
}

impl TryFrom<MandrillOptions> for MandrillFields {
    type Error = ConfigurationError;

    fn try_from(options: MandrillOptions) -> Result<Self, Self::Error> {
        Ok(Self {
            tags: normalize_tags(options.tags)?,
            from_name: options.from_name,
            track_opens: options.track_opens,
            track_clicks: options.track_clicks,
            global_merge_vars: options.global_merge_vars,
        })
    }
}

/// A named block of content injected into a Mandrill template.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TemplateBlock {
    pub name: String,
    pub content: String,
}

impl TemplateBlock {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFields {
    pub template_name: String,
    pub template_content: Vec<TemplateBlock>,
}

/// What the backend should do with a message beyond the standard fields.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    /// A message with no Mandrill extensions.
    Plain,
    /// Content supplied inline, sent through `messages/send`.
    Mandrill(MandrillFields),
    /// Content rendered by Mandrill, sent through `messages/send-template`.
    Template {
        fields: MandrillFields,
        template: TemplateFields,
    },
}

impl MessageKind {
    pub fn mandrill_fields(&self) -> Option<&MandrillFields> {
        match self {
            MessageKind::Plain => None,
            MessageKind::Mandrill(fields) | MessageKind::Template { fields, .. } => Some(fields),
        }
    }

    pub fn template(&self) -> Option<&TemplateFields> {
        match self {
            MessageKind::Template { template, .. } => Some(template),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub email: EmailMessage,
    pub kind: MessageKind,
}

impl Message {
    pub fn plain(email: EmailMessage) -> Self {
        Self {
            email,
            kind: MessageKind::Plain,
        }
    }

    pub fn mandrill(
        email: EmailMessage,
        options: MandrillOptions,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            email,
            kind: MessageKind::Mandrill(options.try_into()?),
        })
    }

    pub fn template(
        email: EmailMessage,
        options: MandrillOptions,
        template_name: impl Into<String>,
        template_content: Vec<TemplateBlock>,
    ) -> Result<Self, ConfigurationError> {
        let template_name = template_name.into();
        if template_name.is_empty() {
            return Err(ConfigurationError::MissingTemplateName);
        }
        Ok(Self {
            email,
            kind: MessageKind::Template {
                fields: options.try_into()?,
                template: TemplateFields {
                    template_name,
                    template_content,
                },
            },
        })
    }
}
