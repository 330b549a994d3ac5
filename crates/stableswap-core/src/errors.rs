//! Error types for the stableswap core

use thiserror::Error;

/// Errors raised while constructing core value types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Invalid pool {address}: {reason}")]
    InvalidPool { address: String, reason: String },

    #[error("Invalid slippage: {0}")]
    InvalidSlippage(String),
}

impl TypeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "invalid_address",
            Self::InvalidAsset(_) => "invalid_asset",
            Self::InvalidPool { .. } => "invalid_pool",
            Self::InvalidSlippage(_) => "invalid_slippage",
        }
    }
}

/// Failures reported by external collaborators (indexer, simulator, oracle)
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Endpoint unreachable at {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl SourceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "source_unreachable",
            Self::Timeout { .. } => "source_timeout",
            Self::Api { .. } => "source_api_error",
            Self::Parse(_) => "source_parse_error",
        }
    }
}

impl From<TypeError> for SourceError {
    fn from(e: TypeError) -> Self {
        Self::Parse(e.to_string())
    }
}
