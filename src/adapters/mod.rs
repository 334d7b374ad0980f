//! Boundary adapters consumed by the engine
//!
//! This module provides:
//! - The `TransferExecutor` contract for moving value on the origin ledger
//! - The `CrossChainFacilitator` contract for address derivation and
//!   destination-chain transaction evidence
//! - Placeholder transaction references for when no adapter can be used
//! - A deterministic facilitator used for local development

pub mod mock;
pub mod simulated;

pub use mock::mock_tx_ref;
pub use simulated::SimulatedFacilitator;

use crate::error::AdapterResult;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque signing credential handed to the transfer executor
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Parameters for an origin-ledger transfer
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender: String,
    pub credential: Credential,
    pub recipient: String,
    /// Amount in the origin asset's smallest unit
    pub amount: String,
    /// `chain:token` of the asset being moved
    pub asset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub tx_ref: String,
    pub confirmation_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAddress {
    pub address: String,
    pub public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationTxRequest {
    pub chain: String,
    /// Origin transaction the destination evidence is tied to
    pub correlate_to: String,
}

/// Moves value on the origin ledger.
///
/// Implementations must return an error rather than silently no-op: the
/// orchestrator falls back to a placeholder reference only when told the
/// transfer failed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    async fn transfer(&self, request: &TransferRequest) -> AdapterResult<TransferReceipt>;
}

/// Derives foreign-chain deposit addresses and produces destination-chain
/// transaction references.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrossChainFacilitator: Send + Sync {
    async fn derive_address(&self, account: &str, chain: &str) -> AdapterResult<DerivedAddress>;

    async fn simulate_destination_tx(&self, request: &DestinationTxRequest)
        -> AdapterResult<String>;
}

/// How the origin leg of a swap was settled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OriginTransfer {
    /// The transfer executor moved the funds
    #[serde(rename_all = "camelCase")]
    Executed {
        tx_ref: String,
        confirmation_height: u64,
    },
    /// No real transfer happened; `mock_ref` is a placeholder
    #[serde(rename_all = "camelCase")]
    Degraded { mock_ref: String, cause: String },
}

impl OriginTransfer {
    pub fn tx_ref(&self) -> &str {
        match self {
            OriginTransfer::Executed { tx_ref, .. } => tx_ref,
            OriginTransfer::Degraded { mock_ref, .. } => mock_ref,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, OriginTransfer::Degraded { .. })
    }
}
