use async_trait::async_trait;
use reqwest::StatusCode;

use super::message::OutboundMessage;

/// Why a message did not reach the destination.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The destination answered with a 4xx/5xx.
    #[error("destination rejected the message with status {status}")]
    Rejected { status: StatusCode, body: String },
    /// Connect, timeout, redirect-limit or body-read failure.
    #[error("destination unreachable")]
    Unavailable(#[source] anyhow::Error),
    #[error("unexpected destination status {0}")]
    Unexpected(StatusCode),
}

/// Trait defining a chat webhook the relay forwards to
#[async_trait]
pub trait Destination: Send + Sync {
    /// Get the name of the destination
    fn name(&self) -> &'static str;

    /// Deliver one message. Exactly one outbound call per invocation, no retries.
    async fn forward(&self, message: &OutboundMessage) -> Result<(), ForwardError>;
}
