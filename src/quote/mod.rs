//! Quote module - request/quote data model, validation and the quote engine
//!
//! Wire types mirror the production intents API: camelCase fields and
//! SCREAMING_SNAKE_CASE enums.

pub mod amount;
pub mod engine;
pub mod validation;

pub use engine::QuoteEngine;
pub use validation::{validate_request, ValidatedRequest};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the requested amount is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapType {
    ExactInput,
    ExactOutput,
    AnyInput,
}

/// A caller's swap request. Immutable once accepted.
///
/// String fields default to empty so that absent fields surface as
/// validation errors rather than decode failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub swap_type: SwapType,
    #[serde(default)]
    pub origin_asset: String,
    #[serde(default)]
    pub destination_asset: String,
    /// Amount in the origin asset's smallest unit
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub refund_to: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slippage_tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStep {
    pub from: String,
    pub to: String,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    pub steps: Vec<RouteStep>,
}

/// A priced, time-bounded offer. Computed once, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub deposit_address: String,
    pub amount_in: String,
    pub amount_out: String,
    pub amount_out_formatted: String,
    pub deadline: DateTime<Utc>,
    /// Seconds
    pub time_estimate: u64,
    pub fee: String,
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote_id: String,
    pub timestamp: DateTime<Utc>,
    pub quote_request: QuoteRequest,
    pub quote: Quote,
}
