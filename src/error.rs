//! Error types for the swap simulator

use thiserror::Error;

/// Rejections raised while validating a quote request.
///
/// These are always synchronous and are produced before any swap record
/// exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid asset identifier for {field}: {value:?} (expected \"chain:token\")")]
    InvalidAssetId { field: &'static str, value: String },

    #[error("Invalid amount {value:?}: {reason}")]
    InvalidAmount { value: String, reason: String },

    #[error("Invalid slippage tolerance: {value} (must be between 0 and 1)")]
    InvalidSlippage { value: f64 },
}

/// Failures reported by a boundary collaborator (transfer executor or
/// cross-chain facilitator).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("Adapter {adapter} is unavailable")]
    Unavailable { adapter: String },

    #[error("Adapter {adapter} rejected the call: {message}")]
    Rejected { adapter: String, message: String },

    #[error("Timeout waiting for {operation}")]
    Timeout { operation: String },

    #[error("Adapter internal error: {0}")]
    Internal(String),
}

/// Main error type for the simulator
#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Swap {quote_id} not found")]
    NotFound { quote_id: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SwapError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwapError::Adapter(AdapterError::Timeout { .. })
                | SwapError::Adapter(AdapterError::Unavailable { .. })
        )
    }

    /// HTTP status code the API layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            SwapError::Validation(_) => 400,
            SwapError::NotFound { .. } => 404,
            SwapError::Adapter(_) => 502,
            SwapError::InvalidStateTransition { .. } => 409,
            SwapError::Config(_) | SwapError::Internal(_) => 500,
        }
    }

    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            SwapError::Validation(_) => "validation_error",
            SwapError::Adapter(_) => "adapter_error",
            SwapError::NotFound { .. } => "not_found",
            SwapError::InvalidStateTransition { .. } => "invalid_state_transition",
            SwapError::Config(_) => "config_error",
            SwapError::Internal(_) => "internal_error",
        }
    }
}

/// Result type for simulator operations
pub type SwapResult<T> = Result<T, SwapError>;

/// Result type for boundary adapter calls
pub type AdapterResult<T> = Result<T, AdapterError>;
