//! Key recording and size sampling

use super::prefix::PrefixRule;
use super::table::AggregateTable;
use crate::error::StoreResult;
use crate::store::{ConnectionManager, Connector};
use tracing::trace;

/// Measures the serialized size of a key
pub trait SizeProbe {
    /// Size in bytes, None if the key no longer exists
    fn serialized_size(&mut self, key: &[u8]) -> StoreResult<Option<u64>>;
}

impl<C: Connector> SizeProbe for ConnectionManager<C> {
    fn serialized_size(&mut self, key: &[u8]) -> StoreResult<Option<u64>> {
        ConnectionManager::serialized_size(self, key)
    }
}

impl<F> SizeProbe for F
where
    F: FnMut(&[u8]) -> StoreResult<Option<u64>>,
{
    fn serialized_size(&mut self, key: &[u8]) -> StoreResult<Option<u64>> {
        self(key)
    }
}

/// Folds keys into an [`AggregateTable`]
#[derive(Debug, Clone)]
pub struct PrefixAggregator {
    rule: PrefixRule,
    sampling_cap: u64,
}

impl PrefixAggregator {
    /// Create an aggregator; a `sampling_cap` of 0 disables size probes
    pub fn new(rule: PrefixRule, sampling_cap: u64) -> Self {
        Self { rule, sampling_cap }
    }

    /// Record one observation of `key`
    ///
    /// The key count always increases. While the prefix has fewer than
    /// `sampling_cap` samples, the key's size is probed and added. A key
    /// that vanished before the probe counts but is not sampled.
    ///
    /// Keys are raw bytes; the prefix is derived from their lossy UTF-8
    /// reading while the probe gets the exact key.
    pub fn record_key<P: SizeProbe + ?Sized>(
        &self,
        table: &mut AggregateTable,
        key: &[u8],
        probe: &mut P,
    ) -> StoreResult<()> {
        let stat = table.entry_mut(self.rule.derive(&String::from_utf8_lossy(key)));
        stat.key_count += 1;

        if stat.sample_count >= self.sampling_cap {
            return Ok(());
        }

        match probe.serialized_size(key)? {
            Some(size) => {
                stat.sampled_bytes += size;
                stat.sample_count += 1;
            }
            None => trace!(
                key = %String::from_utf8_lossy(key),
                "Key vanished before size probe"
            ),
        }

        Ok(())
    }

    /// Record a batch of keys in order
    pub fn record_batch<K, P>(
        &self,
        table: &mut AggregateTable,
        keys: &[K],
        probe: &mut P,
    ) -> StoreResult<()>
    where
        K: AsRef<[u8]>,
        P: SizeProbe + ?Sized,
    {
        for key in keys {
            self.record_key(table, key.as_ref(), probe)?;
        }
        Ok(())
    }
}
