use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::models::destination::ForwardError;

/// Everything that can end an inbound request early.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid JSON")]
    InvalidJson(#[from] serde_json::Error),

    #[error("missing required field: expected `ticket` or `message`")]
    MissingField,

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::MissingField => StatusCode::BAD_REQUEST,
            Self::Forward(ForwardError::Rejected { status, .. })
                if status.is_client_error() || status.is_server_error() =>
            {
                *status
            }
            Self::Forward(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::InvalidJson(e) => json!({ "error": "invalid JSON", "detail": e.to_string() }),
            Self::MissingField => json!({ "error": self.to_string() }),
            Self::Forward(ForwardError::Rejected {
                status: upstream,
                body,
            }) => json!({
                "error": "Telex rejected the message",
                "status": upstream.as_u16(),
                "detail": body,
            }),
            Self::Forward(ForwardError::Unavailable(e)) => {
                error!(error = ?e, "forwarding to Telex failed");
                json!({ "error": "failed to forward message to Telex" })
            }
            Self::Forward(ForwardError::Unexpected(upstream)) => {
                error!(status = %upstream, "unexpected response from Telex");
                json!({ "error": self.to_string() })
            }
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                json!({ "error": "internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_keeps_destination_status() {
        let err = RelayError::from(ForwardError::Rejected {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "down".into(),
        });
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = RelayError::from(ForwardError::Rejected {
            status: StatusCode::NOT_MODIFIED,
            body: String::new(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn input_errors_are_bad_requests() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(RelayError::from(parse_err).status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::MissingField.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn transport_and_internal_failures_are_500() {
        let unavailable = RelayError::from(ForwardError::Unavailable(anyhow::anyhow!("refused")));
        assert_eq!(unavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let unexpected = RelayError::from(ForwardError::Unexpected(StatusCode::FOUND));
        assert_eq!(unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let internal = RelayError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
