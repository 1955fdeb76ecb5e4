//! Connection ownership and transient-error recovery
//!
//! The manager owns the only client handle. When a call fails with a
//! transient error and the retry policy allows it, the handle is rebuilt
//! through the connector and the same request is issued again. There is no
//! attempt bound and no backoff: a timeout is expected to clear once the
//! connection is replaced, and any other failure ends the loop.

use super::{Connector, ScanPage, StoreClient};
use crate::error::{ErrorClass, StoreError, StoreResult};
use tracing::{debug, warn};

/// What to do when a store call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Every error is returned to the caller
    #[default]
    Never,
    /// Transient errors trigger a reconnect and an identical retry, forever
    ReconnectOnTransient,
}

impl RetryPolicy {
    /// Build the policy from the `--reconnect` flag
    pub fn from_flag(reconnect: bool) -> Self {
        if reconnect {
            RetryPolicy::ReconnectOnTransient
        } else {
            RetryPolicy::Never
        }
    }

    /// Check whether `err` should be retried under this policy
    pub fn should_retry(&self, err: &StoreError) -> bool {
        match self {
            RetryPolicy::Never => false,
            RetryPolicy::ReconnectOnTransient => err.class() == ErrorClass::Transient,
        }
    }
}

/// Owns the current store client and replaces it on transient failures
pub struct ConnectionManager<C: Connector> {
    connector: C,
    client: C::Client,
    policy: RetryPolicy,
    reconnects: u64,
}

impl<C: Connector> ConnectionManager<C> {
    /// Open the first connection
    ///
    /// Connection failures here are never retried.
    pub fn connect(connector: C, policy: RetryPolicy) -> StoreResult<Self> {
        let client = connector.connect()?;

        Ok(Self {
            connector,
            client,
            policy,
            reconnects: 0,
        })
    }

    /// Classify an error for the retry loop
    pub fn classify(err: &StoreError) -> ErrorClass {
        err.class()
    }

    /// Discard the current client and open a new one with the same target
    pub fn reconnect(&mut self) -> StoreResult<()> {
        let client = self.connector.connect().map_err(|e| StoreError::Reconnect {
            source: Box::new(e),
        })?;

        self.client = client;
        self.reconnects += 1;
        debug!(
            store = %self.connector.describe(),
            reconnects = self.reconnects,
            "Reconnected to store"
        );

        Ok(())
    }

    /// Number of successful reconnects so far
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// The active retry policy
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Liveness check
    ///
    /// Runs once before any work exists, so it bypasses the retry policy.
    pub fn ping(&mut self) -> StoreResult<()> {
        self.client.ping()
    }

    /// Number of keys in the database
    pub fn total_key_count(&mut self) -> StoreResult<u64> {
        self.call("DBSIZE", |client| client.total_key_count())
    }

    /// One page of a cursor scan
    pub fn scan(
        &mut self,
        cursor: u64,
        pattern: Option<&str>,
        batch_hint: u64,
    ) -> StoreResult<ScanPage> {
        self.call("SCAN", |client| client.scan(cursor, pattern, batch_hint))
    }

    /// Serialized size of `key`, None if it vanished
    pub fn serialized_size(&mut self, key: &[u8]) -> StoreResult<Option<u64>> {
        self.call("DUMP", |client| client.serialized_size(key))
    }

    fn call<T, F>(&mut self, op: &'static str, mut f: F) -> StoreResult<T>
    where
        F: FnMut(&mut C::Client) -> StoreResult<T>,
    {
        loop {
            match f(&mut self.client) {
                Ok(value) => return Ok(value),
                Err(e) if self.policy.should_retry(&e) => {
                    warn!(op, error = %e, "Transient store error, reconnecting");
                    self.reconnect()?;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
