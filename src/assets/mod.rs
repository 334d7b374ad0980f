//! Asset module - chain/token identifiers and the static asset registry
//!
//! Assets are addressed as `"chain:token"` strings on the wire. The registry
//! maps each pair to display metadata and never fails: unknown assets fall
//! back to 18 decimals with the raw token string as symbol.

pub mod registry;

pub use registry::{AssetInfo, AssetRegistry};

use crate::error::ValidationError;

use serde::Serialize;
use std::fmt;

/// A fully resolved asset, derived per request and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetIdentifier {
    pub chain: String,
    pub token: String,
    pub decimals: u32,
    pub symbol: String,
}

/// Split a `"chain:token"` string into its two parts.
///
/// Both parts must be non-empty and there must be exactly one separator.
pub fn parse_asset_id(field: &'static str, value: &str) -> Result<(String, String), ValidationError> {
    let mut parts = value.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(chain), Some(token), None) if !chain.is_empty() && !token.is_empty() => {
            Ok((chain.to_string(), token.to_string()))
        }
        _ => Err(ValidationError::InvalidAssetId {
            field,
            value: value.to_string(),
        }),
    }
}

/// Ledger families, used to shape addresses and transaction references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    Near,
    Solana,
    Bitcoin,
    Other,
}

impl ChainFamily {
    pub fn of(chain: &str) -> Self {
        match chain.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" | "arbitrum" | "base" | "polygon" | "optimism" | "bsc"
            | "avalanche" => ChainFamily::Evm,
            "near" => ChainFamily::Near,
            "solana" | "sol" => ChainFamily::Solana,
            "bitcoin" | "btc" => ChainFamily::Bitcoin,
            _ => ChainFamily::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Near => "near",
            ChainFamily::Solana => "solana",
            ChainFamily::Bitcoin => "bitcoin",
            ChainFamily::Other => "other",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
