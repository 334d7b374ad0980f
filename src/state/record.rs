//! Swap record and status types

use crate::adapters::OriginTransfer;
use crate::quote::QuoteResponse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a swap
///
/// `IncompleteDeposit` and `Refunded` belong to the status domain of the
/// intents API but no transition leads to them yet; they are reserved for
/// deposit verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    PendingDeposit,
    IncompleteDeposit,
    Processing,
    Success,
    Refunded,
    Failed,
}

impl SwapStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SwapStatus::Success | SwapStatus::Failed | SwapStatus::Refunded
        )
    }

    /// Whether the orchestrator may move a swap from `self` to `next`
    pub fn can_transition_to(&self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (SwapStatus::PendingDeposit, SwapStatus::Processing)
                | (SwapStatus::Processing, SwapStatus::Success)
                | (SwapStatus::Processing, SwapStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::PendingDeposit => "PENDING_DEPOSIT",
            SwapStatus::IncompleteDeposit => "INCOMPLETE_DEPOSIT",
            SwapStatus::Processing => "PROCESSING",
            SwapStatus::Success => "SUCCESS",
            SwapStatus::Refunded => "REFUNDED",
            SwapStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement evidence recorded once a swap succeeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapDetails {
    pub origin_tx_refs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_tx_ref: Option<String>,
    pub amount_in: String,
    pub amount_out: String,
    pub execution_time_seconds: f64,
    pub origin_transfer: OriginTransfer,
}

/// Mutable lifecycle state wrapping one accepted quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRecord {
    pub quote_response: QuoteResponse,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_details: Option<SwapDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SwapRecord {
    pub fn new(quote_response: QuoteResponse) -> Self {
        let now = Utc::now();
        Self {
            quote_response,
            status: SwapStatus::PendingDeposit,
            created_at: now,
            updated_at: now,
            swap_details: None,
            error: None,
        }
    }

    pub fn quote_id(&self) -> &str {
        &self.quote_response.quote_id
    }

    /// Seconds between creation and the last update
    pub fn elapsed_seconds(&self) -> f64 {
        (self.updated_at - self.created_at).num_milliseconds() as f64 / 1000.0
    }

    pub fn to_status_response(&self) -> SwapStatusResponse {
        SwapStatusResponse {
            status: self.status,
            quote_response: self.quote_response.clone(),
            swap_details: self.swap_details.clone(),
            error: self.error.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Payload returned by status polls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapStatusResponse {
    pub status: SwapStatus,
    pub quote_response: QuoteResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_details: Option<SwapDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}
