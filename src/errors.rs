/// Problems with how the backend or a message was set up.
///
/// These are never retried and never suppressed by `fail_silently`.
#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("The Mandrill API key has not been configured.")]
    MissingApiKey,
    #[error("The Mandrill API url has not been configured.")]
    MissingApiUrl,
    #[error(
        "Tag '{0}' starts with an underscore. Such tags are reserved for internal use \
        and will cause errors with Mandrill's API."
    )]
    ReservedTag(String),
    #[error(
        "Mandrill only accepts plain text and html emails. \
        Please check the alternatives you have attached to your message."
    )]
    MultipleAlternatives,
    #[error("A template name is required to send a template message.")]
    MissingTemplateName,
}

impl std::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Mandrill answered, but not with a 200.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Remote server {status_code} error: {message}")]
pub struct ProviderHttpError {
    pub status_code: u16,
    pub message: String,
}

#[derive(thiserror::Error)]
pub enum SendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Provider(#[from] ProviderHttpError),
    #[error("'{address}' is not a valid email address.")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("Failed to deliver the payload to {endpoint}.")]
    Transport {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to serialize the Mandrill payload.")]
    Serialization(#[from] serde_json::Error),
}

impl SendError {
    /// Whether `fail_silently` is allowed to swallow this error.
    pub fn is_suppressible(&self) -> bool {
        matches!(
            self,
            SendError::Provider(_) | SendError::Transport { .. } | SendError::InvalidAddress { .. }
        )
    }
}

impl std::fmt::Debug for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
