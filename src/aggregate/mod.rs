//! Prefix aggregation
//!
//! Every key is mapped to a prefix group by [`PrefixRule`] and counted in
//! the [`AggregateTable`]. Up to a per-prefix cap, the serialized size of
//! the key is probed as well, and the average of those samples is used to
//! estimate the footprint of the whole group.
//!
//! Aggregation is a plain fold over the keys: the table depends only on
//! which keys were recorded and in which order, never on how they were
//! split into batches. Keys the store returns twice are counted twice.

mod aggregator;
mod prefix;
mod table;

pub use aggregator::{PrefixAggregator, SizeProbe};
pub use prefix::{PrefixRule, WILDCARD};
pub use table::{AggregateTable, PrefixStat};
