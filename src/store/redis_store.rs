//! Redis implementation of the store client
//!
//! Uses the blocking `redis` connection. Every call is bounded by the
//! target timeout, which surfaces as a transient [`StoreError::Timeout`].

use super::{Connector, ScanPage, StoreClient};
use crate::config::StoreTarget;
use crate::error::{StoreError, StoreResult};

use redis::{Client, Connection, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use tracing::debug;

/// Builds Redis connections for a fixed target
#[derive(Debug, Clone)]
pub struct RedisConnector {
    target: StoreTarget,
}

impl RedisConnector {
    /// Create a connector for `target`
    pub fn new(target: StoreTarget) -> Self {
        Self { target }
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.target.host.clone(), self.target.port),
            redis: RedisConnectionInfo {
                db: self.target.db,
                password: self.target.password.clone(),
                ..Default::default()
            },
        }
    }

    fn connect_error(&self, err: redis::RedisError) -> StoreError {
        StoreError::Connect {
            target: self.target.to_display_string(),
            reason: err.to_string(),
        }
    }
}

impl Connector for RedisConnector {
    type Client = RedisStore;

    fn connect(&self) -> StoreResult<RedisStore> {
        let client = Client::open(self.connection_info()).map_err(|e| self.connect_error(e))?;

        // AUTH and SELECT run inside get_connection, so a bad password
        // surfaces here rather than on the first command
        let connection = client
            .get_connection_with_timeout(self.target.timeout)
            .map_err(|e| match e.kind() {
                redis::ErrorKind::AuthenticationFailed => StoreError::from(e),
                _ => self.connect_error(e),
            })?;

        connection
            .set_read_timeout(Some(self.target.timeout))
            .map_err(|e| self.connect_error(e))?;
        connection
            .set_write_timeout(Some(self.target.timeout))
            .map_err(|e| self.connect_error(e))?;

        debug!(store = %self.target.to_display_string(), "Connected to store");

        Ok(RedisStore { connection })
    }

    fn describe(&self) -> String {
        self.target.to_display_string()
    }
}

/// A live Redis connection
pub struct RedisStore {
    connection: Connection,
}

impl StoreClient for RedisStore {
    fn ping(&mut self) -> StoreResult<()> {
        redis::cmd("PING").query::<String>(&mut self.connection)?;
        Ok(())
    }

    fn total_key_count(&mut self) -> StoreResult<u64> {
        Ok(redis::cmd("DBSIZE").query::<u64>(&mut self.connection)?)
    }

    fn scan(
        &mut self,
        cursor: u64,
        pattern: Option<&str>,
        batch_hint: u64,
    ) -> StoreResult<ScanPage> {
        let mut cmd = redis::cmd("SCAN");
        cmd.arg(cursor);
        if let Some(pattern) = pattern {
            cmd.arg("MATCH").arg(pattern);
        }
        cmd.arg("COUNT").arg(batch_hint);

        // Keys are binary safe and may not be valid UTF-8
        let (next_cursor, keys): (u64, Vec<Vec<u8>>) = cmd.query(&mut self.connection)?;
        Ok(ScanPage { keys, next_cursor })
    }

    fn serialized_size(&mut self, key: &[u8]) -> StoreResult<Option<u64>> {
        let dump: Option<Vec<u8>> = redis::cmd("DUMP").arg(key).query(&mut self.connection)?;
        Ok(dump.map(|bytes| bytes.len() as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // Talking to a real server is left to manual runs; these cover the
    // connection parameters only

    #[test]
    fn test_connection_info() {
        let mut target = StoreTarget::new("cache-1", 6380, 3);
        target.password = Some("secret".into());
        target.timeout = Duration::from_millis(250);

        let info = RedisConnector::new(target).connection_info();
        match info.addr {
            ConnectionAddr::Tcp(ref host, port) => {
                assert_eq!(host, "cache-1");
                assert_eq!(port, 6380);
            }
            ref other => panic!("unexpected address {:?}", other),
        }
        assert_eq!(info.redis.db, 3);
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
        assert_eq!(info.redis.username, None);
    }

    #[test]
    fn test_describe() {
        let connector = RedisConnector::new(StoreTarget::new("localhost", 6379, 0));
        assert_eq!(connector.describe(), "localhost:6379/0");
    }
}
