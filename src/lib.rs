//! keyspace-inventory - Redis Keyspace Inventory
//!
//! A tool for capacity analysis and schema-hygiene audits on live Redis
//! stores. It enumerates every key with `SCAN`, groups keys by a derived
//! prefix, estimates each group's footprint from a bounded sample of `DUMP`
//! sizes, and reports the largest groups. No export is needed and the store
//! keeps serving traffic while it runs.
//!
//! # Features
//!
//! - **Cursor Scan**: Walks the keyspace with `SCAN`, optionally filtered
//!   by a `MATCH` glob and throttled between batches.
//!
//! - **Prefix Grouping**: Keys are grouped by everything before their last
//!   separator, or by the first matching explicit prefix.
//!
//! - **Bounded Sampling**: At most N `DUMP` probes per prefix; the sample
//!   average is extrapolated over the whole group.
//!
//! - **Timeout Recovery**: With `--reconnect`, timed-out calls are retried
//!   on a fresh connection.
//!
//! - **Partial Reports**: Whatever was aggregated is printed even when the
//!   run fails.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Redis Server                             │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ PING / DBSIZE / SCAN / DUMP
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ConnectionManager  - owns the connection, reconnects on timeout │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!            ┌──────────────────┴──────────────────┐
//!            ▼                                     ▼
//! ┌──────────────────────┐              ┌──────────────────────┐
//! │    KeyEnumerator     │  key batches │   PrefixAggregator   │
//! │ NotStarted/InProgress├─────────────►│ derive prefix, count │
//! │        /Done         │              │ sample DUMP sizes    │
//! └──────────────────────┘              └──────────┬───────────┘
//!                                                  ▼
//!                                       ┌──────────────────────┐
//!                                       │    AggregateTable    │
//!                                       └──────────┬───────────┘
//!                                                  ▼
//!                                       ┌──────────────────────┐
//!                                       │   Report (stdout)    │
//!                                       │ size desc, count desc│
//!                                       └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Count keys per prefix
//! keyspace-inventory --host cache-1
//!
//! # Estimate sizes from 50 samples per prefix, show the top 20
//! keyspace-inventory --dump-limit 50 --top 20
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod inventory;
pub mod progress;
pub mod report;
pub mod scan;
pub mod store;

pub use aggregate::{AggregateTable, PrefixAggregator, PrefixRule, PrefixStat};
pub use config::{CliArgs, ScanConfig, StoreTarget};
pub use error::{InventoryError, Result, StoreError};
pub use inventory::{Inventory, InventorySummary};
pub use report::ReportOnExit;
