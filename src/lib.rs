pub mod backend;
pub mod configuration;
pub mod errors;
pub mod message;
pub mod telemetry;

pub use backend::MandrillBackend;
pub use errors::{ConfigurationError, ProviderHttpError, SendError};
pub use message::{EmailMessage, MandrillOptions, Message, MessageKind, TemplateBlock};
