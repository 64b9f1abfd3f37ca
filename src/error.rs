use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScrapeError {
    #[error("invalid NIST identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("invalid formula: {0:?}")]
    InvalidFormula(String),

    #[error("unknown spectrum type: {0}")]
    #[diagnostic(help("expected one of IR, TZ, MS, UVVis"))]
    InvalidSpectrumType(String),

    #[error("failed to read species list at {0}")]
    SpeciesRead(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid retry method: {0}")]
    InvalidMethod(String),

    #[error("NIST request failed: {0}")]
    NistHttp(String),

    #[error("NIST returned status {status}: {message}")]
    NistStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl ScrapeError {
    /// A client error status the server will keep answering with; `429` is
    /// excluded since it asks for a later retry.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ScrapeError::NistStatus { status, .. } if (400..500).contains(status) && *status != 429)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> ScrapeError {
        ScrapeError::NistStatus {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn only_client_errors_are_rejections() {
        assert!(status(404).is_rejection());
        assert!(status(400).is_rejection());
        assert!(!status(429).is_rejection());
        assert!(!status(503).is_rejection());
        assert!(!ScrapeError::NistHttp("reset".to_string()).is_rejection());
    }
}
