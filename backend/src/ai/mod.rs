//! External text/vision completion service and the parsing of its free-text answers.

pub mod extract;
pub mod gateway;

use async_trait::async_trait;
use thiserror::Error;

pub use extract::{BraceMatchExtractor, JsonExtractor, StructuredExtractor};
pub use gateway::HttpGateway;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageInput {
    Base64 { data: String, mime_type: String },
    Url(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub image: Option<ImageInput>,
}

impl CompletionRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn vision(prompt: impl Into<String>, image: ImageInput) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("AI gateway API key is not configured")]
    NotConfigured,

    #[error("AI gateway unreachable: {0}")]
    Network(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    #[error("AI credits exhausted, please add funds to continue")]
    PaymentRequired,

    #[error("AI gateway returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("AI gateway returned an unreadable response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// True when the HTTP exchange itself failed, as opposed to a missing
    /// key or an unreadable success envelope.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_)
                | GatewayError::RateLimited
                | GatewayError::PaymentRequired
                | GatewayError::Status { .. }
        )
    }
}

#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError>;
}
