//! Keyspace inventory pipeline
//!
//! Pulls batches from the store through the [`KeyEnumerator`] and folds
//! every key into the [`AggregateTable`]. Everything runs on the calling
//! thread: at most one store call is in flight, and the table is only
//! touched between calls.
//!
//! ```text
//! SCAN batch ──► PrefixAggregator ──► AggregateTable
//!     ▲               │ DUMP (sampled)
//!     │               ▼
//!     └──── ConnectionManager (reconnect on timeout)
//! ```

use crate::aggregate::{AggregateTable, PrefixAggregator, PrefixRule};
use crate::config::ScanConfig;
use crate::error::{InventoryError, Result};
use crate::progress::ProgressReporter;
use crate::scan::KeyEnumerator;
use crate::store::{ConnectionManager, Connector, RetryPolicy};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Outcome of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySummary {
    /// Keys fed to the aggregator (duplicates included)
    pub keys_processed: u64,
    /// Successful SCAN calls
    pub batches: u64,
    /// Reconnects performed after transient errors
    pub reconnects: u64,
    /// The scan reached the end of the keyspace
    pub completed: bool,
    /// The key limit stopped the scan first
    pub stopped_early: bool,
    /// Wall time of the scan
    pub duration: Duration,
}

/// One inventory run against a store
pub struct Inventory<C: Connector> {
    config: ScanConfig,
    connection: ConnectionManager<C>,
    enumerator: KeyEnumerator,
    aggregator: PrefixAggregator,
}

impl<C: Connector> Inventory<C> {
    /// Connect and check that the store answers
    ///
    /// Neither the first connection nor the liveness check is retried:
    /// nothing has been aggregated yet, so there is nothing to preserve.
    pub fn connect(config: ScanConfig, connector: C) -> Result<Self> {
        let target = connector.describe();
        let unreachable = |source| InventoryError::Unreachable {
            target: target.clone(),
            source,
        };

        let mut connection =
            ConnectionManager::connect(connector, RetryPolicy::from_flag(config.reconnect))
                .map_err(unreachable)?;
        connection.ping().map_err(unreachable)?;
        info!(store = %target, "Store is alive");

        let enumerator = KeyEnumerator::new(config.pattern.clone(), config.batch_hint);
        let aggregator = PrefixAggregator::new(
            PrefixRule::new(config.explicit_prefixes.clone(), config.separator.clone()),
            config.sampling_cap,
        );

        Ok(Self {
            config,
            connection,
            enumerator,
            aggregator,
        })
    }

    /// The configuration of this run
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan the keyspace into `table`
    ///
    /// On error the table keeps everything recorded before the failure.
    pub fn run(&mut self, table: &mut AggregateTable) -> Result<InventorySummary> {
        let expected = self.expected_keys()?;
        info!(expected, "Starting scan");

        let progress = self
            .config
            .show_progress
            .then(|| ProgressReporter::new(expected));
        let progress = progress.as_ref();

        let start = Instant::now();
        let result = self.scan_loop(table, progress);

        let (keys_processed, stopped_early) = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if let Some(p) = progress {
                    p.abandon("Scan failed");
                }
                return Err(e);
            }
        };

        let summary = InventorySummary {
            keys_processed,
            batches: self.enumerator.batches(),
            reconnects: self.connection.reconnects(),
            completed: self.enumerator.is_done(),
            stopped_early,
            duration: start.elapsed(),
        };

        if let Some(p) = progress {
            p.finish(if summary.completed {
                "Scan completed"
            } else {
                "Scan stopped at limit"
            });
        }

        info!(
            keys = summary.keys_processed,
            prefixes = table.len(),
            batches = summary.batches,
            reconnects = summary.reconnects,
            completed = summary.completed,
            "Inventory finished"
        );

        Ok(summary)
    }

    /// Number of keys the scan is expected to visit
    pub fn expected_keys(&mut self) -> Result<u64> {
        let total = self.connection.total_key_count()?;
        Ok(match self.config.key_limit {
            Some(limit) if limit < total => limit,
            _ => total,
        })
    }

    fn scan_loop(
        &mut self,
        table: &mut AggregateTable,
        progress: Option<&ProgressReporter>,
    ) -> Result<(u64, bool)> {
        let mut processed = 0u64;

        while let Some(keys) = self.enumerator.next_batch(&mut self.connection)? {
            self.aggregator
                .record_batch(table, &keys, &mut self.connection)?;
            processed += keys.len() as u64;

            if let Some(p) = progress {
                p.update(keys.len() as u64, table.len(), table.total_sampled_bytes());
            }

            if self.enumerator.is_done() {
                break;
            }

            if let Some(limit) = self.config.key_limit {
                if processed >= limit {
                    debug!(processed, limit, "Key limit reached");
                    return Ok((processed, true));
                }
            }

            if let Some(delay) = self.config.throttle {
                thread::sleep(delay);
            }
        }

        Ok((processed, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::store::{ScanPage, StoreClient};

    /// Serves `total` keys named `k:<n>`, `per_page` at a time
    #[derive(Clone)]
    struct CountingStore {
        total: u64,
        per_page: u64,
    }

    impl StoreClient for CountingStore {
        fn ping(&mut self) -> StoreResult<()> {
            Ok(())
        }

        fn total_key_count(&mut self) -> StoreResult<u64> {
            Ok(self.total)
        }

        fn scan(&mut self, cursor: u64, _: Option<&str>, _: u64) -> StoreResult<ScanPage> {
            let end = (cursor + self.per_page).min(self.total);
            let keys = (cursor..end).map(|n| format!("k:{}", n).into_bytes()).collect();
            let next_cursor = if end >= self.total { 0 } else { end };
            Ok(ScanPage { keys, next_cursor })
        }

        fn serialized_size(&mut self, _: &[u8]) -> StoreResult<Option<u64>> {
            Ok(Some(16))
        }
    }

    impl Connector for CountingStore {
        type Client = CountingStore;

        fn connect(&self) -> StoreResult<CountingStore> {
            Ok(self.clone())
        }

        fn describe(&self) -> String {
            "counting".into()
        }
    }

    const THROTTLE: Duration = Duration::from_millis(20);

    fn config(key_limit: Option<u64>) -> ScanConfig {
        ScanConfig {
            target: crate::config::StoreTarget::new("localhost", 6379, 0),
            pattern: None,
            batch_hint: 10,
            throttle: Some(THROTTLE),
            key_limit,
            top: None,
            explicit_prefixes: Vec::new(),
            sampling_cap: 2,
            separator: ":".into(),
            reconnect: false,
            show_progress: false,
        }
    }

    fn store() -> CountingStore {
        CountingStore {
            total: 25,
            per_page: 10,
        }
    }

    #[test]
    fn test_expected_keys_respects_limit() {
        let mut inventory = Inventory::connect(config(None), store()).unwrap();
        assert_eq!(inventory.expected_keys().unwrap(), 25);

        let mut limited = Inventory::connect(config(Some(12)), store()).unwrap();
        assert_eq!(limited.expected_keys().unwrap(), 12);

        let mut loose = Inventory::connect(config(Some(100)), store()).unwrap();
        assert_eq!(loose.expected_keys().unwrap(), 25);
    }

    #[test]
    fn test_full_run_with_throttle() {
        let mut inventory = Inventory::connect(config(None), store()).unwrap();
        let mut table = AggregateTable::new();

        let summary = inventory.run(&mut table).unwrap();

        assert!(summary.completed);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.keys_processed, 25);
        let stat = table.get("k:*").unwrap();
        assert_eq!(stat.key_count, 25);
        assert_eq!(stat.sample_count, 2);
        assert_eq!(stat.estimated_total_bytes(), 400);
        assert_eq!(inventory.config().sampling_cap, 2);
        // One pause between each pair of batches
        assert!(summary.duration >= THROTTLE * 2);
    }

    #[test]
    fn test_no_pause_after_last_batch() {
        let mut config = config(None);
        config.throttle = Some(Duration::from_secs(5));
        let single_page = CountingStore {
            total: 3,
            per_page: 10,
        };

        let mut inventory = Inventory::connect(config, single_page).unwrap();
        let summary = inventory.run(&mut AggregateTable::new()).unwrap();

        assert!(summary.completed);
        assert_eq!(summary.batches, 1);
        assert!(summary.duration < Duration::from_secs(5));
    }
}
