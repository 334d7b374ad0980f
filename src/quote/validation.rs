//! Synchronous request validation, run before any quote is computed

use super::amount::parse_amount;
use super::QuoteRequest;
use crate::assets::parse_asset_id;
use crate::error::ValidationError;

/// A request that passed validation, with its parts already parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub origin_chain: String,
    pub origin_token: String,
    pub destination_chain: String,
    pub destination_token: String,
    pub amount: u128,
    pub slippage_tolerance: Option<f64>,
    pub refund_to: String,
    pub recipient: String,
}

impl ValidatedRequest {
    pub fn is_cross_chain(&self) -> bool {
        self.origin_chain != self.destination_chain
    }
}

/// Check a request and parse its asset ids and amount
pub fn validate_request(request: &QuoteRequest) -> Result<ValidatedRequest, ValidationError> {
    let (origin_chain, origin_token) = asset_field("originAsset", &request.origin_asset)?;
    let (destination_chain, destination_token) =
        asset_field("destinationAsset", &request.destination_asset)?;

    if request.amount.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "amount" });
    }
    let amount = parse_amount(&request.amount)?;

    if request.refund_to.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "refundTo" });
    }
    if request.recipient.trim().is_empty() {
        return Err(ValidationError::MissingField { field: "recipient" });
    }

    if let Some(value) = request.slippage_tolerance {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::InvalidSlippage { value });
        }
    }

    Ok(ValidatedRequest {
        origin_chain,
        origin_token,
        destination_chain,
        destination_token,
        amount,
        slippage_tolerance: request.slippage_tolerance,
        refund_to: request.refund_to.clone(),
        recipient: request.recipient.clone(),
    })
}

fn asset_field(field: &'static str, value: &str) -> Result<(String, String), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    parse_asset_id(field, value)
}
