//! Static asset registry

use super::AssetIdentifier;
use crate::config::AssetConfig;

use serde::Serialize;
use std::collections::BTreeMap;

/// Decimals used for any asset the registry does not know
pub const DEFAULT_DECIMALS: u32 = 18;

/// Display metadata for a registered asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetInfo {
    pub decimals: u32,
    pub symbol: String,
}

/// Registry entry as exposed by the tokens listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAsset {
    pub asset_id: String,
    pub chain: String,
    pub token: String,
    pub symbol: String,
    pub decimals: u32,
}

const BUILTIN_ASSETS: &[(&str, &str, &str, u32)] = &[
    ("near", "native", "NEAR", 24),
    ("near", "wrap.near", "wNEAR", 24),
    ("near", "usdt.tether-token.near", "USDT", 6),
    (
        "near",
        "17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1",
        "USDC",
        6,
    ),
    ("ethereum", "native", "ETH", 18),
    ("ethereum", "usdc.eth", "USDC", 6),
    ("ethereum", "usdt.eth", "USDT", 6),
    ("ethereum", "wbtc.eth", "WBTC", 8),
    ("arbitrum", "native", "ETH", 18),
    ("base", "native", "ETH", 18),
    ("solana", "native", "SOL", 9),
    ("bitcoin", "native", "BTC", 8),
];

/// Maps `(chain, token)` to decimals and symbol
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: BTreeMap<(String, String), AssetInfo>,
}

impl AssetRegistry {
    /// Registry containing only the built-in table
    pub fn new() -> Self {
        let assets = BUILTIN_ASSETS
            .iter()
            .map(|(chain, token, symbol, decimals)| {
                (
                    (chain.to_string(), token.to_string()),
                    AssetInfo {
                        decimals: *decimals,
                        symbol: symbol.to_string(),
                    },
                )
            })
            .collect();

        Self { assets }
    }

    /// Built-in table with configured entries merged over it
    pub fn with_overrides(extra: &[AssetConfig]) -> Self {
        let mut registry = Self::new();
        for asset in extra {
            registry.register(&asset.chain, &asset.token, &asset.symbol, asset.decimals);
        }
        registry
    }

    pub fn register(&mut self, chain: &str, token: &str, symbol: &str, decimals: u32) {
        self.assets.insert(
            (chain.to_string(), token.to_string()),
            AssetInfo {
                decimals,
                symbol: symbol.to_string(),
            },
        );
    }

    /// Look up an asset. Total: unknown pairs get the default decimals and
    /// the token string as symbol.
    pub fn resolve(&self, chain: &str, token: &str) -> AssetInfo {
        self.assets
            .get(&(chain.to_string(), token.to_string()))
            .cloned()
            .unwrap_or_else(|| AssetInfo {
                decimals: DEFAULT_DECIMALS,
                symbol: token.to_string(),
            })
    }

    pub fn identify(&self, chain: &str, token: &str) -> AssetIdentifier {
        let info = self.resolve(chain, token);
        AssetIdentifier {
            chain: chain.to_string(),
            token: token.to_string(),
            decimals: info.decimals,
            symbol: info.symbol,
        }
    }

    /// All registered assets, ordered by chain then token
    pub fn list(&self) -> Vec<RegisteredAsset> {
        self.assets
            .iter()
            .map(|((chain, token), info)| RegisteredAsset {
                asset_id: format!("{}:{}", chain, token),
                chain: chain.clone(),
                token: token.clone(),
                symbol: info.symbol.clone(),
                decimals: info.decimals,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new()
    }
}
