use curator_core::{CompanyId, Rejection};
use thiserror::Error;

/// Transport-level failure talking to the collections API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Text suitable for a notification. Prefers the server's `detail`
    /// field when the body carries one.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Status { status, body } => detail_from_body(body)
                .unwrap_or_else(|| {
                    let body = body.trim();
                    if body.is_empty() {
                        format!("HTTP {status}")
                    } else {
                        body.to_string()
                    }
                }),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_owned)
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout(err.to_string())
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// Failure of a session operation, as seen by the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("failed to load data: {0}")]
    Fetch(#[source] GatewayError),
    #[error("favorite update for company {company_id} failed: {source}")]
    Mutation {
        company_id: CompanyId,
        #[source]
        source: GatewayError,
    },
    #[error("transfer could not be started: {0}")]
    TransferStart(#[source] GatewayError),
    #[error("failed to {action}: {source}")]
    Collection {
        action: &'static str,
        #[source]
        source: GatewayError,
    },
    #[error("{0} finished without a result")]
    NoOutcome(&'static str),
}

impl SessionError {
    /// The transport error underneath, if any.
    pub fn gateway(&self) -> Option<&GatewayError> {
        match self {
            SessionError::Fetch(source)
            | SessionError::TransferStart(source)
            | SessionError::Mutation { source, .. }
            | SessionError::Collection { source, .. } => Some(source),
            SessionError::Rejected(_) | SessionError::NoOutcome(_) => None,
        }
    }
}
