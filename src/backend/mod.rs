mod address;
mod payload;
mod transport;

use crate::configuration::MandrillSettings;
use crate::errors::{ConfigurationError, ProviderHttpError, SendError};
use crate::message::{Message, MessageKind};
pub use address::Recipient;
pub use payload::{MergeVar, Payload, PayloadMessage};
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
use uuid::Uuid;

pub const SEND_METHOD: &str = "messages/send.json";
pub const SEND_TEMPLATE_METHOD: &str = "messages/send-template.json";

/// Sends [`Message`]s through the Mandrill API, one request per message.
pub struct MandrillBackend {
    api_key: Secret<String>,
    api_url: String,
    fail_silently: bool,
    transport: Arc<dyn HttpTransport>,
}

impl MandrillBackend {
    pub fn new(
        settings: &MandrillSettings,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ConfigurationError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;
        let mut api_url = settings
            .api_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigurationError::MissingApiUrl)?;
        if !api_url.ends_with('/') {
            api_url.push('/');
        }

        Ok(Self {
            api_key,
            api_url,
            fail_silently: settings.fail_silently,
            transport,
        })
    }

    /// Build a backend that talks to Mandrill over HTTP.
    pub fn from_settings(settings: &MandrillSettings) -> Result<Self, anyhow::Error> {
        let transport = ReqwestTransport::new(settings.timeout())?;
        Ok(Self::new(settings, Arc::new(transport))?)
    }

    /// The configured API url, always ending with `/`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn endpoint(&self, message: &Message) -> String {
        let method = match message.kind {
            MessageKind::Template { .. } => SEND_TEMPLATE_METHOD,
            MessageKind::Plain | MessageKind::Mandrill(_) => SEND_METHOD,
        };
        format!("{}{}", self.api_url, method)
    }

    pub fn build_payload<'a>(&'a self, message: &'a Message) -> Result<Payload<'a>, SendError> {
        Payload::build(self.api_key.expose_secret(), message)
    }

    /// Send every message in order and count the ones Mandrill accepted.
    ///
    /// Returns `Ok(None)` when there is nothing to send. Unless the backend
    /// fails silently, the first error aborts the rest of the batch.
    #[tracing::instrument(
        name = "Sending a batch of messages through Mandrill",
        skip(self, messages),
        fields(request_id = %Uuid::new_v4(), batch_size = messages.len())
    )]
    pub async fn send_messages(&self, messages: &[Message]) -> Result<Option<usize>, SendError> {
        if messages.is_empty() {
            return Ok(None);
        }

        let mut num_sent = 0;
        for message in messages {
            if self.send(message).await? {
                num_sent += 1;
            }
        }
        tracing::info!(num_sent, "Finished sending the batch");
        Ok(Some(num_sent))
    }

    /// Send a single message. `Ok(false)` means it was not sent.
    #[tracing::instrument(
        name = "Sending a message through Mandrill",
        skip(self, message),
        fields(
            endpoint = tracing::field::Empty,
            recipients = message.email.recipients().len(),
            encoding = ?message.email.encoding,
        )
    )]
    pub async fn send(&self, message: &Message) -> Result<bool, SendError> {
        if message.email.recipients().is_empty() {
            tracing::info!("Skipping a message without recipients");
            return Ok(false);
        }

        match self.dispatch(message).await {
            Ok(()) => Ok(true),
            Err(e) if self.fail_silently && e.is_suppressible() => {
                tracing::warn!(error.cause_chain = ?e, "Failed to send a message, failing silently");
                Ok(false)
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Failed to send a message");
                Err(e)
            }
        }
    }

    async fn dispatch(&self, message: &Message) -> Result<(), SendError> {
        let payload = self.build_payload(message)?;
        let endpoint = self.endpoint(message);
        tracing::Span::current().record("endpoint", &tracing::field::display(&endpoint));
        let body = serde_json::to_string(&payload)?;
        self.post(&endpoint, body).await
    }

    async fn post(&self, endpoint: &str, body: String) -> Result<(), SendError> {
        let response = self
            .transport
            .post_json(endpoint, body)
            .await
            .map_err(|source| SendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;
        if response.status == 200 {
            return Ok(());
        }
        Err(ProviderHttpError {
            status_code: response.status,
            message: provider_message(&response.body),
        }
        .into())
    }
}

/// Mandrill explains failures in the `message` field of a JSON body.
fn provider_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|error| error.message)
        .unwrap_or_else(|_| body.to_string())
}
