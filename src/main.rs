mod config;
mod error;
mod models;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use config::Config;
use error::RelayError;
use models::destination::Destination;
use models::message::OutboundMessage;
use models::telex::TelexSystem;
use models::zendesk::InboundRequest;
use serde_json::{Value, json};

use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// ----------------------------------------------------------------------
/// 1  Command line
/// ----------------------------------------------------------------------
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// YAML config file
    #[arg(long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Telex channel the messages are posted to (overrides the config file)
    #[arg(long, env = "TELEX_CHANNEL_ID")]
    channel_id: Option<String>,

    /// Port (overrides the config file, default 8000)
    #[arg(short, long)]
    port: Option<u16>,
}

/// ----------------------------------------------------------------------
/// 2  Shared app state
/// ----------------------------------------------------------------------
struct AppState {
    destination: Arc<dyn Destination>,
    skip_user_agents: Vec<String>,
}

impl AppState {
    fn should_skip(&self, headers: &HeaderMap) -> bool {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        self.skip_user_agents
            .iter()
            .any(|needle| !needle.is_empty() && user_agent.contains(needle.as_str()))
    }
}

/// ----------------------------------------------------------------------
/// 3  Startup
/// ----------------------------------------------------------------------
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a) Logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // b) CLI + config
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(channel_id) = cli.channel_id {
        config.telex.channel_id = Some(channel_id);
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    anyhow::ensure!(
        config.server.path.starts_with('/'),
        "server.path must start with '/', got {:?}",
        config.server.path
    );

    // c) State
    let telex = TelexSystem::new(&config.telex).context("cannot configure Telex destination")?;
    let state = Arc::new(AppState {
        destination: Arc::new(telex),
        skip_user_agents: config.skip_user_agents.clone(),
    });

    // d) Router
    let app = router(&config.server.path, state);

    // e) Server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on http://{addr}{}", config.server.path);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn router(path: &str, state: Arc<AppState>) -> Router {
    Router::new()
        .route(path, post(zendesk_integration))
        // Ticket bodies and raw messages are forwarded whatever their size
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// ----------------------------------------------------------------------
/// 4  Handler
/// ----------------------------------------------------------------------
#[tracing::instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
async fn zendesk_integration(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Value>), RelayError> {
    let body = body.map_err(|rejection| {
        RelayError::Internal(anyhow::anyhow!(
            "failed to read request body: {}",
            rejection.body_text()
        ))
    })?;

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "request body is not valid JSON");
        RelayError::from(e)
    })?;
    info!(%payload, "Received request data");
    debug!(?headers, "Request headers");

    if state.should_skip(&headers) {
        info!("Skipping duplicate request");
        return Ok((
            StatusCode::OK,
            Json(json!({ "message": "Skipped duplicate request" })),
        ));
    }

    let message = match InboundRequest::classify(&payload) {
        Ok(InboundRequest::SettingsProbe) => {
            info!("settings probe acknowledged");
            return Ok((
                StatusCode::OK,
                Json(json!({ "message": "Settings acknowledged" })),
            ));
        }
        Ok(InboundRequest::Ticket(ticket)) => {
            if payload.get("message").is_some() {
                debug!("payload carries both ticket and message; forwarding the ticket only");
            }
            info!(ticket_id = %ticket.id, "formatting ticket");
            OutboundMessage::from_ticket(&ticket)
        }
        Ok(InboundRequest::Message(text)) => OutboundMessage::plain(text),
        Err(e) => {
            error!(error = %e, "Invalid request format");
            return Err(e);
        }
    };

    state.destination.forward(&message).await?;

    info!("Sent to {}", state.destination.name());
    Ok((
        StatusCode::OK,
        Json(json!({ "message": format!("Sent to {}", state.destination.name()) })),
    ))
}
