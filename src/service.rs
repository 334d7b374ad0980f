//! Public facade: request a quote, poll swap status

use crate::adapters::{CrossChainFacilitator, Credential, SimulatedFacilitator, TransferExecutor};
use crate::assets::AssetRegistry;
use crate::config::{EngineConfig, Settings};
use crate::coordination::{ExecutionOrchestrator, ExecutorBinding, SwapScheduler};
use crate::error::{SwapError, SwapResult};
use crate::quote::{validate_request, QuoteEngine, QuoteRequest, QuoteResponse};
use crate::state::{SwapStatusResponse, SwapStore};

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One simulator instance: its own registry, store and scheduler
pub struct SwapSimulator {
    registry: Arc<AssetRegistry>,
    quote_engine: QuoteEngine,
    store: SwapStore,
    orchestrator: Arc<ExecutionOrchestrator>,
    scheduler: SwapScheduler,
}

impl SwapSimulator {
    pub fn builder() -> SwapSimulatorBuilder {
        SwapSimulatorBuilder::default()
    }

    /// Pure-simulation instance wired from settings
    pub fn from_settings(settings: &Settings) -> SwapResult<Self> {
        Self::builder()
            .engine_config(settings.engine.clone())
            .registry(AssetRegistry::with_overrides(&settings.assets))
            .build()
    }

    /// Validate, price and register a swap, then schedule its orchestration
    /// unless the request is a dry run.
    ///
    /// Validation failures return before anything is stored.
    pub async fn request_quote(&self, request: QuoteRequest) -> SwapResult<QuoteResponse> {
        let validated = validate_request(&request).map_err(|e| {
            debug!("Rejected quote request: {}", e);
            crate::metrics::record_quote_rejected("validation");
            SwapError::from(e)
        })?;

        let quote = self.quote_engine.compute_quote(&validated).await.map_err(|e| {
            warn!("Quote computation failed: {}", e);
            crate::metrics::record_quote_rejected("adapter");
            e
        })?;

        let dry = request.dry;
        let response = QuoteResponse {
            quote_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            quote_request: request,
            quote,
        };

        let quote_id = self.store.create(response.clone());
        crate::metrics::record_quote(validated.is_cross_chain());

        if dry {
            info!("Dry quote {} registered, not scheduling execution", quote_id);
        } else {
            let orchestrator = self.orchestrator.clone();
            let task_id = quote_id.clone();
            self.scheduler
                .schedule(&quote_id, async move { orchestrator.run(&task_id).await });
            info!("Quote {} accepted, execution scheduled", quote_id);
        }

        Ok(response)
    }

    /// Current state of a swap. Reads have no side effects.
    pub fn get_swap_status(&self, quote_id: &str) -> SwapResult<SwapStatusResponse> {
        self.store
            .get(quote_id)
            .map(|record| record.to_status_response())
            .ok_or_else(|| SwapError::NotFound {
                quote_id: quote_id.to_string(),
            })
    }

    /// Wait until the orchestration of `quote_id` has finished
    pub async fn wait_for_settlement(&self, quote_id: &str) -> bool {
        self.scheduler.wait(quote_id).await
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SwapStore {
        &self.store
    }

    pub fn scheduler(&self) -> &SwapScheduler {
        &self.scheduler
    }

    pub fn native_chain(&self) -> &str {
        self.quote_engine.native_chain()
    }
}

/// Wires a simulator from its collaborators
#[derive(Default)]
pub struct SwapSimulatorBuilder {
    engine: EngineConfig,
    registry: Option<AssetRegistry>,
    store: Option<SwapStore>,
    facilitator: Option<Arc<dyn CrossChainFacilitator>>,
    executor: Option<ExecutorBinding>,
}

impl SwapSimulatorBuilder {
    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn registry(mut self, registry: AssetRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn store(mut self, store: SwapStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn facilitator(mut self, facilitator: Arc<dyn CrossChainFacilitator>) -> Self {
        self.facilitator = Some(facilitator);
        self
    }

    pub fn transfer_executor(
        mut self,
        executor: Arc<dyn TransferExecutor>,
        credential: Credential,
    ) -> Self {
        self.executor = Some(ExecutorBinding {
            executor,
            credential,
        });
        self
    }

    /// Fails with `SwapError::Config` if the engine settings are out of bounds
    pub fn build(self) -> SwapResult<SwapSimulator> {
        self.engine.validate()?;
        let quote_ttl = self.engine.quote_ttl()?;

        let registry = Arc::new(self.registry.unwrap_or_default());
        let store = self.store.unwrap_or_default();
        let facilitator = self
            .facilitator
            .unwrap_or_else(|| Arc::new(SimulatedFacilitator::new()));

        if self.executor.is_none() {
            info!("No transfer executor configured, origin transfers are simulated");
        }

        let quote_engine = QuoteEngine::new(
            registry.clone(),
            facilitator.clone(),
            self.engine.native_chain.clone(),
        )
        .with_default_slippage(self.engine.default_slippage)
        .with_quote_ttl(quote_ttl);

        let orchestrator = Arc::new(ExecutionOrchestrator::new(
            store.clone(),
            facilitator,
            self.executor,
            self.engine.native_chain,
            self.engine.settlement_delay_factor,
        ));

        Ok(SwapSimulator {
            registry,
            quote_engine,
            store,
            orchestrator,
            scheduler: SwapScheduler::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockCrossChainFacilitator, MockTransferExecutor, OriginTransfer};
    use crate::error::{AdapterError, ValidationError};
    use crate::quote::SwapType;
    use crate::state::SwapStatus;

    fn request(destination: &str) -> QuoteRequest {
        QuoteRequest {
            swap_type: SwapType::ExactInput,
            origin_asset: "near:native".to_string(),
            destination_asset: destination.to_string(),
            amount: "1000000000000000000000000".to_string(),
            refund_to: "alice".to_string(),
            recipient: "bob".to_string(),
            slippage_tolerance: None,
            deadline: None,
            dry: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_chain_scenario() {
        let simulator = SwapSimulator::builder().build().unwrap();

        let response = simulator
            .request_quote(request("near:wrap.near"))
            .await
            .unwrap();
        assert_eq!(response.quote.fee, "3000000000000000000000");
        assert_eq!(response.quote.amount_out, "987030000000000000000000");
        assert_eq!(response.quote.time_estimate, 7);
        assert_eq!(response.quote.route.steps.len(), 1);
        assert_eq!(response.quote.route.steps[0].protocol, "ref-finance");

        let status = simulator.get_swap_status(&response.quote_id).unwrap();
        assert_eq!(status.quote_response, response);

        assert!(simulator.wait_for_settlement(&response.quote_id).await);

        let status = simulator.get_swap_status(&response.quote_id).unwrap();
        assert_eq!(status.status, SwapStatus::Success);
        let details = status.swap_details.unwrap();
        assert!(details.destination_tx_ref.is_none());
        assert_eq!(details.amount_in, response.quote.amount_in);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cross_chain_scenario_settles() {
        let simulator = SwapSimulator::builder().build().unwrap();

        let response = simulator
            .request_quote(request("ethereum:usdc.eth"))
            .await
            .unwrap();
        assert_eq!(response.quote.time_estimate, 45);
        assert_eq!(response.quote.route.steps.len(), 2);

        simulator.wait_for_settlement(&response.quote_id).await;

        let status = simulator.get_swap_status(&response.quote_id).unwrap();
        match status.status {
            SwapStatus::Success => {
                let tx_ref = status.swap_details.unwrap().destination_tx_ref.unwrap();
                assert!(tx_ref.starts_with("0x"));
            }
            SwapStatus::Failed => assert!(status.error.is_some()),
            other => panic!("swap left in {}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_stays_pending() {
        let simulator = SwapSimulator::builder().build().unwrap();

        let mut req = request("near:wrap.near");
        req.dry = true;
        let response = simulator.request_quote(req).await.unwrap();

        assert!(!simulator.wait_for_settlement(&response.quote_id).await);
        tokio::time::sleep(std::time::Duration::from_secs(600)).await;

        let status = simulator.get_swap_status(&response.quote_id).unwrap();
        assert_eq!(status.status, SwapStatus::PendingDeposit);
        assert!(status.swap_details.is_none());
    }

    #[tokio::test]
    async fn test_invalid_amounts_create_nothing() {
        let simulator = SwapSimulator::builder().build().unwrap();

        for amount in ["0", "-5", "abc", ""] {
            let mut req = request("near:wrap.near");
            req.amount = amount.to_string();
            let err = simulator.request_quote(req).await.unwrap_err();
            assert!(matches!(err, SwapError::Validation(_)), "{amount:?}: {err}");
        }

        assert!(simulator.store().is_empty());
        assert_eq!(simulator.scheduler().pending(), 0);
    }

    #[tokio::test]
    async fn test_missing_recipient_is_rejected() {
        let simulator = SwapSimulator::builder().build().unwrap();
        let mut req = request("near:wrap.near");
        req.recipient.clear();

        let err = simulator.request_quote(req).await.unwrap_err();
        assert!(matches!(
            err,
            SwapError::Validation(ValidationError::MissingField { field: "recipient" })
        ));
    }

    #[tokio::test]
    async fn test_unknown_quote_is_not_found() {
        let simulator = SwapSimulator::builder().build().unwrap();
        let err = simulator.get_swap_status("never-issued").unwrap_err();
        assert!(matches!(err, SwapError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reads_are_idempotent() {
        let simulator = SwapSimulator::builder().build().unwrap();
        let response = simulator
            .request_quote(request("near:wrap.near"))
            .await
            .unwrap();
        simulator.wait_for_settlement(&response.quote_id).await;

        let first = simulator.get_swap_status(&response.quote_id).unwrap();
        let second = simulator.get_swap_status(&response.quote_id).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_executor_still_succeeds() {
        let mut executor = MockTransferExecutor::new();
        executor.expect_transfer().returning(|_| {
            Err(AdapterError::Rejected {
                adapter: "near-rpc".to_string(),
                message: "nonce too low".to_string(),
            })
        });

        let simulator = SwapSimulator::builder()
            .transfer_executor(Arc::new(executor), Credential::new("ed25519:test"))
            .build()
            .unwrap();

        let response = simulator
            .request_quote(request("near:wrap.near"))
            .await
            .unwrap();
        simulator.wait_for_settlement(&response.quote_id).await;

        let status = simulator.get_swap_status(&response.quote_id).unwrap();
        assert_eq!(status.status, SwapStatus::Success);
        assert!(matches!(
            status.swap_details.unwrap().origin_transfer,
            OriginTransfer::Degraded { .. }
        ));
    }

    #[tokio::test]
    async fn test_address_derivation_failure_creates_nothing() {
        let mut facilitator = MockCrossChainFacilitator::new();
        facilitator.expect_derive_address().returning(|_, _| {
            Err(AdapterError::Timeout {
                operation: "derive address".to_string(),
            })
        });

        let simulator = SwapSimulator::builder()
            .facilitator(Arc::new(facilitator))
            .build()
            .unwrap();

        let mut req = request("near:wrap.near");
        req.origin_asset = "ethereum:usdc.eth".to_string();

        let err = simulator.request_quote(req).await.unwrap_err();
        assert!(matches!(err, SwapError::Adapter(_)));
        assert!(simulator.store().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_are_independent() {
        let first = SwapSimulator::builder().build().unwrap();
        let second = SwapSimulator::builder().build().unwrap();

        let response = first
            .request_quote(request("near:wrap.near"))
            .await
            .unwrap();

        assert!(first.get_swap_status(&response.quote_id).is_ok());
        assert!(second.get_swap_status(&response.quote_id).is_err());
    }

    #[test]
    fn test_builder_rejects_out_of_range_engine_config() {
        for engine in [
            EngineConfig {
                settlement_delay_factor: 1e30,
                ..EngineConfig::default()
            },
            EngineConfig {
                settlement_delay_factor: -1.0,
                ..EngineConfig::default()
            },
            EngineConfig {
                quote_ttl_secs: 9_000_000_000_000_000,
                ..EngineConfig::default()
            },
        ] {
            let result = SwapSimulator::builder().engine_config(engine).build();
            assert!(matches!(result, Err(SwapError::Config(_))));
        }
    }
}
