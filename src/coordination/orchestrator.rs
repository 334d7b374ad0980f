//! Execution orchestrator: drives one swap from PENDING_DEPOSIT to a
//! terminal status

use crate::adapters::{
    mock_tx_ref, CrossChainFacilitator, Credential, DestinationTxRequest, OriginTransfer,
    TransferExecutor, TransferRequest,
};
use crate::assets::{parse_asset_id, ChainFamily};
use crate::error::{SwapError, SwapResult};
use crate::state::{SwapDetails, SwapRecord, SwapStatus, SwapStore};

use futures::FutureExt;
use lazy_static::lazy_static;
use regex::Regex;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

lazy_static! {
    static ref NEAR_ACCOUNT_ID: Regex =
        Regex::new(r"^(?:[a-z0-9]+[-_])*[a-z0-9]+(?:\.(?:[a-z0-9]+[-_])*[a-z0-9]+)*$").unwrap();
    static ref EVM_ADDRESS: Regex = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
}

/// A transfer executor together with the credential it signs with
#[derive(Clone)]
pub struct ExecutorBinding {
    pub executor: Arc<dyn TransferExecutor>,
    pub credential: Credential,
}

/// Single-attempt state machine run once per accepted quote
pub struct ExecutionOrchestrator {
    store: SwapStore,
    facilitator: Arc<dyn CrossChainFacilitator>,
    executor: Option<ExecutorBinding>,
    native_chain: String,
    /// Seconds of delay per second of the quote's time estimate
    delay_factor: f64,
}

impl ExecutionOrchestrator {
    pub fn new(
        store: SwapStore,
        facilitator: Arc<dyn CrossChainFacilitator>,
        executor: Option<ExecutorBinding>,
        native_chain: impl Into<String>,
        delay_factor: f64,
    ) -> Self {
        Self {
            store,
            facilitator,
            executor,
            native_chain: native_chain.into(),
            delay_factor,
        }
    }

    /// Drive `quote_id` through its lifecycle. Outcomes are written to the
    /// store; nothing is returned to the caller.
    pub async fn run(&self, quote_id: &str) {
        let started = std::time::Instant::now();

        let record = match self.store.transition(quote_id, SwapStatus::Processing, |_| {}) {
            Ok(record) => record,
            Err(e) => {
                error!("Cannot start swap {}: {}", quote_id, e);
                return;
            }
        };
        info!("Swap {} processing", quote_id);

        // A panic in processing still has to settle the record
        let outcome = AssertUnwindSafe(self.process(&record))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(SwapError::Internal("swap processing panicked".to_string()))
            });

        let committed = match outcome {
            Ok(mut details) => self.store.transition(quote_id, SwapStatus::Success, |r| {
                details.execution_time_seconds = r.elapsed_seconds();
                r.swap_details = Some(details);
            }),
            Err(e) => {
                error!("Swap {} failed: {}", quote_id, e);
                self.store.transition(quote_id, SwapStatus::Failed, |r| {
                    r.error = Some(e.to_string());
                })
            }
        };

        match committed {
            Ok(record) => {
                info!("Swap {} finished with status {}", quote_id, record.status);
                crate::metrics::record_swap_finished(record.status, started.elapsed().as_secs_f64());
            }
            Err(e) => error!("Could not record outcome of swap {}: {}", quote_id, e),
        }
    }

    async fn process(&self, record: &SwapRecord) -> SwapResult<SwapDetails> {
        let request = &record.quote_response.quote_request;
        let quote = &record.quote_response.quote;

        let delay_secs = quote.time_estimate as f64 * self.delay_factor;
        let delay = Duration::try_from_secs_f64(delay_secs).map_err(|e| {
            SwapError::Config(format!("settlement delay of {}s: {}", delay_secs, e))
        })?;
        tokio::time::sleep(delay).await;

        let (origin_chain, origin_token) = parse_asset_id("originAsset", &request.origin_asset)?;
        let (destination_chain, _) = parse_asset_id("destinationAsset", &request.destination_asset)?;

        let recipient = self.local_recipient(&destination_chain, &request.recipient);
        if recipient.is_none() {
            warn!(
                "Swap {}: no local recipient account for {} on {}, using cross-chain path",
                record.quote_id(),
                request.recipient,
                destination_chain
            );
        }

        let origin_transfer = self
            .transfer_origin(
                record,
                &origin_chain,
                &format!("{}:{}", origin_chain, origin_token),
                recipient,
            )
            .await;

        let destination_tx_ref = if destination_chain != self.native_chain {
            let tx_ref = self
                .facilitator
                .simulate_destination_tx(&DestinationTxRequest {
                    chain: destination_chain.clone(),
                    correlate_to: origin_transfer.tx_ref().to_string(),
                })
                .await?;
            Some(tx_ref)
        } else {
            None
        };

        Ok(SwapDetails {
            origin_tx_refs: vec![origin_transfer.tx_ref().to_string()],
            destination_tx_ref,
            amount_in: quote.amount_in.clone(),
            amount_out: quote.amount_out.clone(),
            execution_time_seconds: 0.0,
            origin_transfer,
        })
    }

    /// The recipient, if the destination is the native chain and the
    /// recipient is a well-formed account there
    fn local_recipient<'a>(&self, destination_chain: &str, recipient: &'a str) -> Option<&'a str> {
        if destination_chain != self.native_chain {
            return None;
        }

        let valid = match ChainFamily::of(destination_chain) {
            ChainFamily::Near => {
                (2..=64).contains(&recipient.len()) && NEAR_ACCOUNT_ID.is_match(recipient)
            }
            ChainFamily::Evm => EVM_ADDRESS.is_match(recipient),
            _ => !recipient.is_empty(),
        };
        valid.then_some(recipient)
    }

    /// Run the origin transfer, falling back to a placeholder reference when
    /// no executor is configured or the executor fails
    async fn transfer_origin(
        &self,
        record: &SwapRecord,
        origin_chain: &str,
        asset: &str,
        recipient: Option<&str>,
    ) -> OriginTransfer {
        let degraded = |cause: String| OriginTransfer::Degraded {
            mock_ref: mock_tx_ref(origin_chain),
            cause,
        };

        let Some(binding) = &self.executor else {
            return degraded("no transfer executor configured".to_string());
        };
        let Some(recipient) = recipient else {
            return degraded("no local recipient account".to_string());
        };

        let request = &record.quote_response.quote_request;
        let transfer = TransferRequest {
            sender: request.refund_to.clone(),
            credential: binding.credential.clone(),
            recipient: recipient.to_string(),
            amount: record.quote_response.quote.amount_in.clone(),
            asset: asset.to_string(),
        };

        match binding.executor.transfer(&transfer).await {
            Ok(receipt) => {
                info!(
                    "Swap {}: transfer {} confirmed at height {}",
                    record.quote_id(),
                    receipt.tx_ref,
                    receipt.confirmation_height
                );
                OriginTransfer::Executed {
                    tx_ref: receipt.tx_ref,
                    confirmation_height: receipt.confirmation_height,
                }
            }
            Err(e) => {
                warn!(
                    "Swap {}: transfer failed, continuing with placeholder reference: {}",
                    record.quote_id(),
                    e
                );
                crate::metrics::record_transfer_fallback();
                degraded(e.to_string())
            }
        }
    }
}
