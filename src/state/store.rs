//! In-memory swap registry

use super::record::{SwapRecord, SwapStatus};
use crate::config::RetentionConfig;
use crate::error::{SwapError, SwapResult};
use crate::quote::QuoteResponse;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Keyed store of swap records.
///
/// Cloning shares the underlying map. Each update runs under the record's
/// shard lock, so readers never observe a half-applied mutation.
#[derive(Debug, Clone, Default)]
pub struct SwapStore {
    records: Arc<DashMap<String, SwapRecord>>,
}

impl SwapStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new `PENDING_DEPOSIT` record keyed by the response's quote id
    pub fn create(&self, quote_response: QuoteResponse) -> String {
        let record = SwapRecord::new(quote_response);
        let quote_id = record.quote_id().to_string();

        if self.records.insert(quote_id.clone(), record).is_some() {
            warn!("Quote {} was already registered, record replaced", quote_id);
        }
        debug!("Registered swap {}", quote_id);

        quote_id
    }

    pub fn get(&self, quote_id: &str) -> Option<SwapRecord> {
        self.records.get(quote_id).map(|r| r.value().clone())
    }

    /// Apply `mutator` to a record, stamping `updated_at` first.
    ///
    /// Returns the record as it stands after the mutation.
    pub fn update<F>(&self, quote_id: &str, mutator: F) -> SwapResult<SwapRecord>
    where
        F: FnOnce(&mut SwapRecord),
    {
        let mut entry = self
            .records
            .get_mut(quote_id)
            .ok_or_else(|| SwapError::NotFound {
                quote_id: quote_id.to_string(),
            })?;

        entry.updated_at = Utc::now();
        mutator(entry.value_mut());
        Ok(entry.value().clone())
    }

    /// Move a record to `next`, rejecting transitions the lifecycle forbids
    pub fn transition<F>(&self, quote_id: &str, next: SwapStatus, mutator: F) -> SwapResult<SwapRecord>
    where
        F: FnOnce(&mut SwapRecord),
    {
        let mut entry = self
            .records
            .get_mut(quote_id)
            .ok_or_else(|| SwapError::NotFound {
                quote_id: quote_id.to_string(),
            })?;

        let current = entry.status;
        if !current.can_transition_to(next) {
            return Err(SwapError::InvalidStateTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        entry.status = next;
        entry.updated_at = Utc::now();
        mutator(entry.value_mut());

        debug!("Swap {} moved {} -> {}", quote_id, current, next);
        Ok(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count records per status
    pub fn stats(&self) -> SwapStats {
        let mut stats = SwapStats::default();
        for entry in self.records.iter() {
            match entry.value().status {
                SwapStatus::PendingDeposit => stats.pending_deposit += 1,
                SwapStatus::IncompleteDeposit => stats.incomplete_deposit += 1,
                SwapStatus::Processing => stats.processing += 1,
                SwapStatus::Success => stats.success += 1,
                SwapStatus::Refunded => stats.refunded += 1,
                SwapStatus::Failed => stats.failed += 1,
            }
        }
        stats
    }

    /// Remove terminal records not updated within `max_age`
    pub fn evict_terminal_older_than(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let mut evicted = 0;

        self.records.retain(|_, record| {
            let expired = record.status.is_terminal() && record.updated_at < cutoff;
            if expired {
                evicted += 1;
            }
            !expired
        });

        if evicted > 0 {
            info!("Evicted {} settled swaps", evicted);
            crate::metrics::record_evictions(evicted);
        }
        evicted
    }

    /// Start the background retention sweep. A no-op task when disabled.
    ///
    /// Fails with `SwapError::Config` if the retention settings are out of
    /// bounds.
    pub fn start_retention_sweep(
        &self,
        config: &RetentionConfig,
    ) -> SwapResult<tokio::task::JoinHandle<()>> {
        if !config.enabled {
            return Ok(tokio::spawn(async {}));
        }
        config.validate()?;

        let store = self.clone();
        let max_age = config.max_age()?;
        let every = std::time::Duration::from_secs(config.sweep_interval_secs);

        Ok(tokio::spawn(async move {
            let mut sweep_interval = interval(every);
            loop {
                sweep_interval.tick().await;
                store.evict_terminal_older_than(max_age);
            }
        }))
    }
}

/// Swap counts by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapStats {
    pub pending_deposit: u64,
    pub incomplete_deposit: u64,
    pub processing: u64,
    pub success: u64,
    pub refunded: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{Quote, QuoteRequest, Route, SwapType};

    fn quote_response(quote_id: &str) -> QuoteResponse {
        QuoteResponse {
            quote_id: quote_id.to_string(),
            timestamp: Utc::now(),
            quote_request: QuoteRequest {
                swap_type: SwapType::ExactInput,
                origin_asset: "near:native".to_string(),
                destination_asset: "near:wrap.near".to_string(),
                amount: "1000".to_string(),
                refund_to: "alice".to_string(),
                recipient: "bob".to_string(),
                slippage_tolerance: None,
                deadline: None,
                dry: false,
            },
            quote: Quote {
                deposit_address: "alice".to_string(),
                amount_in: "1000".to_string(),
                amount_out: "987".to_string(),
                amount_out_formatted: "0.00 wNEAR".to_string(),
                deadline: Utc::now() + Duration::minutes(5),
                time_estimate: 7,
                fee: "3".to_string(),
                route: Route::default(),
            },
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = SwapStore::new();
        let id = store.create(quote_response("q-1"));
        assert_eq!(id, "q-1");

        let record = store.get("q-1").unwrap();
        assert_eq!(record.status, SwapStatus::PendingDeposit);
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.swap_details.is_none());

        assert!(store.get("q-2").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reads_have_no_side_effects() {
        let store = SwapStore::new();
        store.create(quote_response("q-1"));
        assert_eq!(store.get("q-1"), store.get("q-1"));
    }

    #[test]
    fn test_transition_rules() {
        let store = SwapStore::new();
        store.create(quote_response("q-1"));

        let err = store
            .transition("q-1", SwapStatus::Success, |_| {})
            .unwrap_err();
        assert!(matches!(err, SwapError::InvalidStateTransition { .. }));

        let record = store
            .transition("q-1", SwapStatus::Processing, |_| {})
            .unwrap();
        assert_eq!(record.status, SwapStatus::Processing);
        assert!(record.updated_at >= record.created_at);

        let record = store
            .transition("q-1", SwapStatus::Failed, |r| r.error = Some("boom".to_string()))
            .unwrap();
        assert_eq!(record.error.as_deref(), Some("boom"));

        assert!(matches!(
            store.transition("missing", SwapStatus::Processing, |_| {}),
            Err(SwapError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_unknown_is_not_found() {
        let store = SwapStore::new();
        assert!(matches!(
            store.update("nope", |_| {}),
            Err(SwapError::NotFound { .. })
        ));
    }

    #[test]
    fn test_stats_and_eviction() {
        let store = SwapStore::new();
        store.create(quote_response("pending"));
        store.create(quote_response("done"));
        store
            .transition("done", SwapStatus::Processing, |_| {})
            .unwrap();
        store.transition("done", SwapStatus::Success, |_| {}).unwrap();

        let stats = store.stats();
        assert_eq!(stats.pending_deposit, 1);
        assert_eq!(stats.success, 1);

        // Nothing is old enough yet
        assert_eq!(store.evict_terminal_older_than(Duration::hours(1)), 0);

        store
            .update("done", |r| r.updated_at = Utc::now() - Duration::hours(2))
            .unwrap();
        store
            .update("pending", |r| r.updated_at = Utc::now() - Duration::hours(2))
            .unwrap();

        assert_eq!(store.evict_terminal_older_than(Duration::hours(1)), 1);
        assert!(store.get("done").is_none());
        assert!(store.get("pending").is_some());
    }

    #[tokio::test]
    async fn test_retention_sweep_rejects_out_of_range_age() {
        let store = SwapStore::new();
        let config = RetentionConfig {
            enabled: true,
            max_age_secs: u64::MAX,
            sweep_interval_secs: 60,
        };
        assert!(matches!(
            store.start_retention_sweep(&config),
            Err(SwapError::Config(_))
        ));

        let disabled = RetentionConfig {
            enabled: false,
            ..config
        };
        assert!(store.start_retention_sweep(&disabled).is_ok());
    }
}
