//! Store access module
//!
//! The pipeline only needs four calls from the store: a liveness check, the
//! total key count, one page of a cursor scan and the serialized size of a
//! key. Those calls are the [`StoreClient`] trait; [`Connector`] builds a
//! fresh client for a fixed target so the [`ConnectionManager`] can replace
//! a broken one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 ConnectionManager                    │
//! │  - Owns the current client handle                   │
//! │  - RetryPolicy: reconnect + retry on timeouts       │
//! └─────────────────────────┬───────────────────────────┘
//!                           │ Connector::connect()
//!                           ▼
//! ┌─────────────────────────────────────────────────────┐
//! │              RedisStore (StoreClient)                │
//! │  - PING / DBSIZE / SCAN / DUMP                      │
//! │  - Blocking calls bounded by the read timeout       │
//! └─────────────────────────────────────────────────────┘
//! ```

mod connection;
mod redis_store;

pub use connection::{ConnectionManager, RetryPolicy};
pub use redis_store::{RedisConnector, RedisStore};

use crate::error::StoreResult;

/// Cursor value that starts a scan and also marks its completion
pub const SCAN_CURSOR_START: u64 = 0;

/// One page of a cursor scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Keys returned by this call (count is only a hint), as raw bytes
    pub keys: Vec<Vec<u8>>,

    /// Cursor to resume from; [`SCAN_CURSOR_START`] means the scan is over
    pub next_cursor: u64,
}

/// Calls the pipeline makes against the store
pub trait StoreClient {
    /// Liveness check
    fn ping(&mut self) -> StoreResult<()>;

    /// Number of keys in the selected database
    fn total_key_count(&mut self) -> StoreResult<u64>;

    /// Fetch one page of keys starting at `cursor`
    fn scan(&mut self, cursor: u64, pattern: Option<&str>, batch_hint: u64)
        -> StoreResult<ScanPage>;

    /// Length of the serialized value of `key`, or None if the key no
    /// longer exists
    fn serialized_size(&mut self, key: &[u8]) -> StoreResult<Option<u64>>;
}

/// Builds store clients bound to a fixed target
pub trait Connector {
    type Client: StoreClient;

    /// Open a new client
    fn connect(&self) -> StoreResult<Self::Client>;

    /// Human readable target for logs
    fn describe(&self) -> String;
}
