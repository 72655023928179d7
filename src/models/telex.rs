use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, header, redirect};
use serde::Serialize;
use tracing::{debug, error, info};

use super::destination::{Destination, ForwardError};
use super::message::{MessageKind, OutboundMessage};
use crate::config::TelexConfig;

/// Body Telex expects on its incoming webhook.
#[derive(Debug, Serialize, PartialEq)]
pub struct TelexPayload<'a> {
    pub event_name: &'a str,
    pub username: &'a str,
    pub status: &'a str,
    pub message: &'a str,
}

/// Telex channel webhook. The URL is fixed when the system is built.
pub struct TelexSystem {
    client: Client,
    url: String,
    username: String,
    ticket_event_name: String,
    message_event_name: String,
}

impl TelexSystem {
    pub fn new(config: &TelexConfig) -> anyhow::Result<Self> {
        let url = config.webhook_url()?;
        let client = Client::builder()
            .timeout(config.timeout()?)
            .redirect(redirect::Policy::limited(10))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            username: config.username.clone(),
            ticket_event_name: config.ticket_event_name.clone(),
            message_event_name: config.message_event_name.clone(),
        })
    }

    pub fn payload<'a>(&'a self, message: &'a OutboundMessage) -> TelexPayload<'a> {
        let event_name = match message.kind() {
            MessageKind::Ticket => self.ticket_event_name.as_str(),
            MessageKind::Plain => self.message_event_name.as_str(),
        };
        TelexPayload {
            event_name,
            username: self.username.as_str(),
            status: "success",
            message: message.text(),
        }
    }
}

#[async_trait]
impl Destination for TelexSystem {
    fn name(&self) -> &'static str {
        "Telex"
    }

    #[tracing::instrument(skip_all, fields(url = %self.url))]
    async fn forward(&self, message: &OutboundMessage) -> Result<(), ForwardError> {
        let payload = self.payload(message);
        info!(?payload, "Telex Payload");

        let resp = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "failed to send request to Telex");
                ForwardError::Unavailable(
                    anyhow::Error::new(e).context("failed to send request to Telex"),
                )
            })?;

        let status = resp.status();
        debug!(headers = ?resp.headers(), "Telex Response Headers");
        let body = resp.text().await.map_err(|e| {
            ForwardError::Unavailable(
                anyhow::Error::new(e).context("failed to read Telex response body"),
            )
        })?;

        info!(%status, %body, "Telex Response");

        if status.is_success() {
            Ok(())
        } else if status.is_client_error() || status.is_server_error() {
            error!(%status, %body, "Telex rejected the message");
            Err(ForwardError::Rejected { status, body })
        } else {
            error!(%status, "unexpected status from Telex");
            Err(ForwardError::Unexpected(status))
        }
    }
}
