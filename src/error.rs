use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Failed to fetch link data: {0}")]
    FetchError(String),

    #[error("Endpoint returned status {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid endpoint response: {0}")]
    InvalidResponse(String),

    #[error("Invalid paste pattern: {0}")]
    InvalidPattern(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging setup failed: {0}")]
    LoggingError(String),
}

impl PreviewError {
    pub fn log(&self) {
        match self {
            PreviewError::UrlParseError(e) => {
                warn!(error = %e, "URL parsing failed");
            }
            PreviewError::FetchError(e) => {
                error!(error = %e, "Link data fetch failed");
            }
            PreviewError::ServerError { status, message } => {
                error!(status = *status, error = %message, "Metadata endpoint returned an error status");
            }
            PreviewError::InvalidResponse(e) => {
                warn!(error = %e, "Metadata endpoint response could not be decoded");
            }
            PreviewError::InvalidPattern(e) => {
                warn!(error = %e, "Paste pattern failed to compile");
            }
            PreviewError::ConfigError(e) => {
                warn!(error = %e, "Block configuration rejected");
            }
            PreviewError::LoggingError(e) => {
                error!(error = %e, "Logging initialization failed");
            }
        }
    }
}

/// Why a metadata fetch did not produce a preview.
///
/// Every variant is recoverable: the block falls back to a bare link and the
/// host is notified with [`FetchFailure::message_key`].
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("metadata request failed: {0}")]
    Transport(#[source] PreviewError),

    #[error("endpoint reported the link as unresolvable")]
    Rejected,

    #[error("endpoint reported success without metadata")]
    MissingMeta,
}

impl FetchFailure {
    /// Sorts a request error into the failure taxonomy. A body that does not
    /// decode carries no truthy `success` flag, so it is a rejection rather
    /// than a transport problem.
    pub fn from_request_error(err: PreviewError) -> Self {
        match err {
            PreviewError::InvalidResponse(_) => FetchFailure::Rejected,
            other => FetchFailure::Transport(other),
        }
    }

    /// Untranslated notification text; passed through the host's i18n.
    pub fn message_key(&self) -> &'static str {
        match self {
            FetchFailure::Transport(_) => "Couldn't fetch the plugin data",
            FetchFailure::Rejected => "Couldn't get this plugin data, try the other one",
            FetchFailure::MissingMeta => "Wrong response format from the server",
        }
    }
}
