use crate::error::StoreResult;
use crate::store::{ConnectionManager, Connector, SCAN_CURSOR_START};
use tracing::debug;

/// Position of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No call made yet
    #[default]
    NotStarted,
    /// Resume from this cursor
    InProgress(u64),
    /// The store returned the end-of-scan cursor
    Done,
}

impl ScanState {
    /// Cursor to send for the next call, None once the scan is over
    pub fn cursor(&self) -> Option<u64> {
        match self {
            ScanState::NotStarted => Some(SCAN_CURSOR_START),
            ScanState::InProgress(cursor) => Some(*cursor),
            ScanState::Done => None,
        }
    }

    /// State after a successful call returned `next_cursor`
    pub fn advance(self, next_cursor: u64) -> Self {
        if next_cursor == SCAN_CURSOR_START {
            ScanState::Done
        } else {
            ScanState::InProgress(next_cursor)
        }
    }
}

/// Drives the scan protocol one batch at a time
#[derive(Debug, Clone)]
pub struct KeyEnumerator {
    state: ScanState,
    pattern: Option<String>,
    batch_hint: u64,
    batches: u64,
}

impl KeyEnumerator {
    /// Create an enumerator for keys matching `pattern` (all keys if None)
    pub fn new(pattern: Option<String>, batch_hint: u64) -> Self {
        Self {
            state: ScanState::NotStarted,
            pattern,
            batch_hint,
            batches: 0,
        }
    }

    /// Current position
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// True once the store signalled the end of the scan
    pub fn is_done(&self) -> bool {
        self.state == ScanState::Done
    }

    /// Number of successful batch fetches
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Fetch the next batch of keys
    ///
    /// Returns `Ok(None)` once the scan is complete. Transient errors are
    /// handled by the connection manager's retry policy; anything that
    /// comes back here is final and leaves the state untouched.
    pub fn next_batch<C: Connector>(
        &mut self,
        conn: &mut ConnectionManager<C>,
    ) -> StoreResult<Option<Vec<Vec<u8>>>> {
        let Some(cursor) = self.state.cursor() else {
            return Ok(None);
        };

        let page = conn.scan(cursor, self.pattern.as_deref(), self.batch_hint)?;

        self.batches += 1;
        self.state = self.state.advance(page.next_cursor);
        debug!(
            cursor,
            next_cursor = page.next_cursor,
            keys = page.keys.len(),
            "Fetched batch"
        );

        Ok(Some(page.keys))
    }
}
