//! Quote engine: fee/slippage model, deposit address resolution and route
//! synthesis

use super::amount::{after_fee, apply_slippage, fee_for, format_display};
use super::{Quote, Route, RouteStep, ValidatedRequest};
use crate::adapters::CrossChainFacilitator;
use crate::assets::{AssetIdentifier, AssetRegistry};
use crate::error::{SwapError, SwapResult};

use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_SLIPPAGE: f64 = 0.01;
pub const DEFAULT_QUOTE_TTL_SECS: i64 = 300;

/// Simulated settlement time for a swap that stays on one chain
pub const SAME_CHAIN_TIME_ESTIMATE: u64 = 7;
/// Simulated settlement time for a bridged swap
pub const CROSS_CHAIN_TIME_ESTIMATE: u64 = 45;

pub const SAME_CHAIN_PROTOCOL: &str = "ref-finance";
pub const BRIDGE_PROTOCOL: &str = "rainbow-bridge";
pub const DESTINATION_SWAP_PROTOCOL: &str = "uniswap-v3";

/// Computes immutable quotes from validated requests
pub struct QuoteEngine {
    registry: Arc<AssetRegistry>,
    facilitator: Arc<dyn CrossChainFacilitator>,
    native_chain: String,
    default_slippage: f64,
    quote_ttl: Duration,
}

impl QuoteEngine {
    pub fn new(
        registry: Arc<AssetRegistry>,
        facilitator: Arc<dyn CrossChainFacilitator>,
        native_chain: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            facilitator,
            native_chain: native_chain.into(),
            default_slippage: DEFAULT_SLIPPAGE,
            quote_ttl: Duration::seconds(DEFAULT_QUOTE_TTL_SECS),
        }
    }

    pub fn with_default_slippage(mut self, slippage: f64) -> Self {
        self.default_slippage = slippage;
        self
    }

    pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
        self.quote_ttl = ttl;
        self
    }

    pub fn native_chain(&self) -> &str {
        &self.native_chain
    }

    /// Price a request.
    ///
    /// Fails when a foreign deposit address cannot be derived or the
    /// deadline cannot be represented; no partial quote is returned.
    pub async fn compute_quote(&self, request: &ValidatedRequest) -> SwapResult<Quote> {
        let origin = self
            .registry
            .identify(&request.origin_chain, &request.origin_token);
        let destination = self
            .registry
            .identify(&request.destination_chain, &request.destination_token);

        let amount_in = request.amount;
        let fee = fee_for(amount_in);
        let slippage = request.slippage_tolerance.unwrap_or(self.default_slippage);
        let amount_out = apply_slippage(after_fee(amount_in), slippage);

        let deadline = Utc::now().checked_add_signed(self.quote_ttl).ok_or_else(|| {
            SwapError::Internal(format!("quote deadline overflows with ttl {}", self.quote_ttl))
        })?;

        let deposit_address = self.deposit_address(request).await?;

        let cross_chain = request.is_cross_chain();
        let time_estimate = if cross_chain {
            CROSS_CHAIN_TIME_ESTIMATE
        } else {
            SAME_CHAIN_TIME_ESTIMATE
        };

        let quote = Quote {
            deposit_address,
            amount_in: amount_in.to_string(),
            amount_out: amount_out.to_string(),
            amount_out_formatted: format!(
                "{} {}",
                format_display(amount_out, destination.decimals),
                destination.symbol
            ),
            deadline,
            time_estimate,
            fee: fee.to_string(),
            route: synthesize_route(&origin, &destination),
        };

        info!(
            "Quoted {} {} -> {} {} (fee {}, {} step route)",
            quote.amount_in,
            origin.symbol,
            quote.amount_out,
            destination.symbol,
            quote.fee,
            quote.route.steps.len()
        );

        Ok(quote)
    }

    /// Funds on the native chain go straight to the refund account; foreign
    /// origins get a facilitator-derived address.
    async fn deposit_address(&self, request: &ValidatedRequest) -> SwapResult<String> {
        if request.origin_chain == self.native_chain {
            return Ok(request.refund_to.clone());
        }

        let derived = self
            .facilitator
            .derive_address(&request.refund_to, &request.origin_chain)
            .await?;
        debug!(
            "Derived deposit address {} on {} for {}",
            derived.address, request.origin_chain, request.refund_to
        );
        Ok(derived.address)
    }
}

/// Fixed route template: one local swap, or bridge then swap for any chain
/// pair. Not a real router.
pub fn synthesize_route(origin: &AssetIdentifier, destination: &AssetIdentifier) -> Route {
    if origin.chain == destination.chain {
        return Route {
            steps: vec![RouteStep {
                from: origin.symbol.clone(),
                to: destination.symbol.clone(),
                protocol: SAME_CHAIN_PROTOCOL.to_string(),
            }],
        };
    }

    let bridged = format!("{} (bridged)", origin.symbol);
    Route {
        steps: vec![
            RouteStep {
                from: origin.symbol.clone(),
                to: bridged.clone(),
                protocol: BRIDGE_PROTOCOL.to_string(),
            },
            RouteStep {
                from: bridged,
                to: destination.symbol.clone(),
                protocol: DESTINATION_SWAP_PROTOCOL.to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{DerivedAddress, MockCrossChainFacilitator, SimulatedFacilitator};
    use crate::error::AdapterError;

    fn validated(origin: (&str, &str), destination: (&str, &str), amount: u128) -> ValidatedRequest {
        ValidatedRequest {
            origin_chain: origin.0.to_string(),
            origin_token: origin.1.to_string(),
            destination_chain: destination.0.to_string(),
            destination_token: destination.1.to_string(),
            amount,
            slippage_tolerance: None,
            refund_to: "alice".to_string(),
            recipient: "bob".to_string(),
        }
    }

    fn engine(facilitator: Arc<dyn CrossChainFacilitator>) -> QuoteEngine {
        QuoteEngine::new(Arc::new(AssetRegistry::new()), facilitator, "near")
    }

    #[tokio::test]
    async fn test_same_chain_quote() {
        let engine = engine(Arc::new(SimulatedFacilitator::new()));
        let request = validated(("near", "native"), ("near", "wrap.near"), 10u128.pow(24));

        let before = Utc::now();
        let quote = engine.compute_quote(&request).await.unwrap();

        assert_eq!(quote.fee, "3000000000000000000000");
        assert_eq!(quote.amount_in, "1000000000000000000000000");
        assert_eq!(quote.amount_out, "987030000000000000000000");
        assert_eq!(quote.amount_out_formatted, "0.98 wNEAR");
        assert_eq!(quote.time_estimate, SAME_CHAIN_TIME_ESTIMATE);
        assert_eq!(quote.deposit_address, "alice");
        assert_eq!(quote.route.steps.len(), 1);
        assert_eq!(quote.route.steps[0].protocol, "ref-finance");
        assert_eq!(quote.route.steps[0].from, "NEAR");
        assert_eq!(quote.route.steps[0].to, "wNEAR");

        let ttl = quote.deadline - before;
        assert!(ttl >= Duration::seconds(299) && ttl <= Duration::seconds(301));
    }

    #[tokio::test]
    async fn test_cross_chain_route() {
        let engine = engine(Arc::new(SimulatedFacilitator::new()));
        let request = validated(("near", "native"), ("ethereum", "usdc.eth"), 10u128.pow(24));

        let quote = engine.compute_quote(&request).await.unwrap();
        assert_eq!(quote.time_estimate, CROSS_CHAIN_TIME_ESTIMATE);

        let protocols: Vec<_> = quote.route.steps.iter().map(|s| s.protocol.as_str()).collect();
        assert_eq!(protocols, vec!["rainbow-bridge", "uniswap-v3"]);
        assert_eq!(quote.route.steps[0].to, "NEAR (bridged)");
        assert_eq!(quote.route.steps[1].from, "NEAR (bridged)");
        assert_eq!(quote.route.steps[1].to, "USDC");
    }

    #[tokio::test]
    async fn test_explicit_slippage_and_unknown_asset() {
        let engine = engine(Arc::new(SimulatedFacilitator::new()));
        let mut request = validated(("near", "native"), ("near", "mystery.near"), 1_000_000);
        request.slippage_tolerance = Some(0.0);

        let quote = engine.compute_quote(&request).await.unwrap();
        assert_eq!(quote.amount_out, "997000");
        assert_eq!(quote.fee, "3000");
        assert!(quote.amount_out_formatted.ends_with(" mystery.near"));
    }

    #[tokio::test]
    async fn test_foreign_origin_uses_derived_address() {
        let mut facilitator = MockCrossChainFacilitator::new();
        facilitator
            .expect_derive_address()
            .withf(|account, chain| account == "alice" && chain == "ethereum")
            .times(1)
            .returning(|_, _| {
                Ok(DerivedAddress {
                    address: "0xdeposit".to_string(),
                    public_key: "secp256k1:00".to_string(),
                })
            });

        let engine = engine(Arc::new(facilitator));
        let request = validated(("ethereum", "usdc.eth"), ("near", "wrap.near"), 5_000_000);

        let quote = engine.compute_quote(&request).await.unwrap();
        assert_eq!(quote.deposit_address, "0xdeposit");
    }

    #[tokio::test]
    async fn test_derivation_failure_fails_quote() {
        let mut facilitator = MockCrossChainFacilitator::new();
        facilitator.expect_derive_address().returning(|_, _| {
            Err(AdapterError::Unavailable {
                adapter: "facilitator".to_string(),
            })
        });

        let engine = engine(Arc::new(facilitator));
        let request = validated(("solana", "native"), ("near", "wrap.near"), 5_000_000);

        let result = engine.compute_quote(&request).await;
        assert!(matches!(result, Err(SwapError::Adapter(_))));
    }

    #[tokio::test]
    async fn test_unrepresentable_deadline_is_an_error() {
        let engine = engine(Arc::new(SimulatedFacilitator::new())).with_quote_ttl(Duration::MAX);
        let request = validated(("near", "native"), ("near", "wrap.near"), 1_000_000);

        let err = engine.compute_quote(&request).await.unwrap_err();
        assert!(matches!(err, SwapError::Internal(_)));
    }
}
