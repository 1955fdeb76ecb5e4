//! Configuration types for keyspace-inventory
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation
//! - The store target a connection is bound to

use crate::error::ConfigError;
use clap::Parser;
use std::fmt;
use std::time::Duration;

/// Default Redis port
pub const DEFAULT_PORT: u16 = 6379;

/// Default SCAN COUNT hint
pub const DEFAULT_BATCH_HINT: u64 = 10;

/// Default per-call timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Inventory a live Redis keyspace grouped by key prefix
#[derive(Parser, Debug, Clone)]
#[command(
    name = "keyspace-inventory",
    version,
    about = "Inventory a live Redis keyspace grouped by key prefix",
    long_about = "Enumerates every key with SCAN, groups keys by a derived prefix and \
                  reports the largest groups.\n\n\
                  With --dump-limit N, up to N keys per prefix are measured with DUMP and \
                  the average is used to estimate the size of the whole group.",
    after_help = "EXAMPLES:\n    \
        keyspace-inventory --host cache-1 --top 20\n    \
        keyspace-inventory --match 'session:*' --dump-limit 100\n    \
        keyspace-inventory --prefixes 'user:,order:' --separator '/'\n    \
        keyspace-inventory --count 1000 --sleep 5 --reconnect --no-progress"
)]
pub struct CliArgs {
    /// Store host
    #[arg(long, default_value = "localhost", value_name = "HOST")]
    pub host: String,

    /// Store port
    #[arg(long, default_value_t = DEFAULT_PORT, value_name = "PORT")]
    pub port: u16,

    /// Store database index
    #[arg(long, default_value = "0", value_name = "INDEX")]
    pub db: i64,

    /// Store password (empty for no AUTH)
    #[arg(long, env = "REDIS_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    /// SCAN MATCH glob (empty scans every key)
    #[arg(long = "match", default_value = "", value_name = "GLOB")]
    pub pattern: String,

    /// SCAN COUNT hint
    #[arg(long, default_value_t = DEFAULT_BATCH_HINT, value_name = "NUM")]
    pub count: u64,

    /// Milliseconds to wait between batches
    #[arg(long, default_value = "0", value_name = "MS")]
    pub sleep: u64,

    /// Stop after this many keys have been processed (0 for no limit)
    #[arg(long, default_value = "0", value_name = "NUM")]
    pub limit: u64,

    /// Only show the top N prefixes (0 or less shows all)
    #[arg(long, default_value = "0", value_name = "NUM", allow_negative_numbers = true)]
    pub top: i64,

    /// Explicit prefixes to group by (comma-separated, first match wins)
    #[arg(long, default_value = "", value_name = "LIST")]
    pub prefixes: String,

    /// Maximum number of DUMP size samples per prefix (0 disables sampling)
    #[arg(long, visible_alias = "sample-limit", default_value = "0", value_name = "NUM")]
    pub dump_limit: u64,

    /// Per-call network timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, value_name = "MS")]
    pub timeout: u64,

    /// Segment separator used to derive prefixes
    #[arg(long, default_value = ":", value_name = "SEP")]
    pub separator: String,

    /// Reconnect and retry when a call times out
    #[arg(long)]
    pub reconnect: bool,

    /// Do not show the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Fixed target a store connection is bound to
#[derive(Clone, PartialEq, Eq)]
pub struct StoreTarget {
    /// Store hostname or IP
    pub host: String,

    /// Store port
    pub port: u16,

    /// Database index
    pub db: i64,

    /// Password (None means no AUTH)
    pub password: Option<String>,

    /// Connect, read and write timeout for every call
    pub timeout: Duration,
}

impl StoreTarget {
    /// Create a target with no password and the default timeout
    pub fn new(host: impl Into<String>, port: u16, db: i64) -> Self {
        Self {
            host: host.into(),
            port,
            db,
            password: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Format as `host:port/db` for display
    pub fn to_display_string(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.db)
    }
}

// Keeps the password out of logs and error chains
impl fmt::Debug for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db", &self.db)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Store the run connects to
    pub target: StoreTarget,

    /// SCAN MATCH glob
    pub pattern: Option<String>,

    /// SCAN COUNT hint
    pub batch_hint: u64,

    /// Pause between batches
    pub throttle: Option<Duration>,

    /// Early-stop key count
    pub key_limit: Option<u64>,

    /// Number of ranked prefixes to print
    pub top: Option<usize>,

    /// Explicit prefixes, in priority order
    pub explicit_prefixes: Vec<String>,

    /// Maximum size samples per prefix
    pub sampling_cap: u64,

    /// Segment separator for prefix derivation
    pub separator: String,

    /// Reconnect and retry on transient errors
    pub reconnect: bool,

    /// Show progress indicator
    pub show_progress: bool,
}

impl ScanConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }

        if args.count == 0 {
            return Err(ConfigError::InvalidBatchHint { count: args.count });
        }

        if args.separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }

        if args.timeout == 0 {
            return Err(ConfigError::InvalidTimeout {
                millis: args.timeout,
            });
        }

        let password = if args.password.is_empty() {
            None
        } else {
            Some(args.password)
        };

        let target = StoreTarget {
            host: args.host,
            port: args.port,
            db: args.db,
            password,
            timeout: Duration::from_millis(args.timeout),
        };

        Ok(Self {
            target,
            pattern: non_empty(args.pattern),
            batch_hint: args.count,
            throttle: (args.sleep > 0).then(|| Duration::from_millis(args.sleep)),
            key_limit: (args.limit > 0).then_some(args.limit),
            top: usize::try_from(args.top).ok().filter(|&n| n > 0),
            explicit_prefixes: parse_prefix_list(&args.prefixes),
            sampling_cap: args.dump_limit,
            separator: args.separator,
            reconnect: args.reconnect,
            show_progress: !args.no_progress,
        })
    }
}

/// Split a comma-separated prefix list, dropping empty entries
///
/// An empty entry would be a prefix of every key and swallow the whole
/// keyspace into a single group.
pub fn parse_prefix_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("keyspace-inventory").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = ScanConfig::from_args(parse(&[])).unwrap();
        assert_eq!(config.target.host, "localhost");
        assert_eq!(config.target.port, 6379);
        assert_eq!(config.target.db, 0);
        assert_eq!(config.target.password, None);
        assert_eq!(config.target.timeout, Duration::from_millis(3000));
        assert_eq!(config.pattern, None);
        assert_eq!(config.batch_hint, 10);
        assert_eq!(config.throttle, None);
        assert_eq!(config.key_limit, None);
        assert_eq!(config.top, None);
        assert!(config.explicit_prefixes.is_empty());
        assert_eq!(config.sampling_cap, 0);
        assert_eq!(config.separator, ":");
        assert!(!config.reconnect);
        assert!(config.show_progress);
    }

    #[test]
    fn test_all_flags() {
        let config = ScanConfig::from_args(parse(&[
            "--host",
            "cache-1",
            "--port",
            "6380",
            "--db",
            "2",
            "--password",
            "secret",
            "--match",
            "user:*",
            "--count",
            "500",
            "--sleep",
            "25",
            "--limit",
            "1000",
            "--top",
            "5",
            "--prefixes",
            "user:,order:",
            "--dump-limit",
            "10",
            "--timeout",
            "100",
            "--separator",
            "/",
            "--reconnect",
            "--no-progress",
        ]))
        .unwrap();

        assert_eq!(config.target.host, "cache-1");
        assert_eq!(config.target.port, 6380);
        assert_eq!(config.target.db, 2);
        assert_eq!(config.target.password.as_deref(), Some("secret"));
        assert_eq!(config.target.timeout, Duration::from_millis(100));
        assert_eq!(config.pattern.as_deref(), Some("user:*"));
        assert_eq!(config.batch_hint, 500);
        assert_eq!(config.throttle, Some(Duration::from_millis(25)));
        assert_eq!(config.key_limit, Some(1000));
        assert_eq!(config.top, Some(5));
        assert_eq!(config.explicit_prefixes, vec!["user:", "order:"]);
        assert_eq!(config.sampling_cap, 10);
        assert_eq!(config.separator, "/");
        assert!(config.reconnect);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_sample_limit_alias() {
        let config = ScanConfig::from_args(parse(&["--sample-limit", "3"])).unwrap();
        assert_eq!(config.sampling_cap, 3);
    }

    #[test]
    fn test_negative_top_shows_all() {
        let config = ScanConfig::from_args(parse(&["--top", "-1"])).unwrap();
        assert_eq!(config.top, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ScanConfig::from_args(parse(&["--count", "0"])),
            Err(ConfigError::InvalidBatchHint { count: 0 })
        ));
        assert!(matches!(
            ScanConfig::from_args(parse(&["--separator", ""])),
            Err(ConfigError::EmptySeparator)
        ));
        assert!(matches!(
            ScanConfig::from_args(parse(&["--timeout", "0"])),
            Err(ConfigError::InvalidTimeout { millis: 0 })
        ));
        assert!(matches!(
            ScanConfig::from_args(parse(&["--host", " "])),
            Err(ConfigError::EmptyHost)
        ));
    }

    #[test]
    fn test_prefix_list() {
        assert!(parse_prefix_list("").is_empty());
        assert_eq!(parse_prefix_list("a:,b:"), vec!["a:", "b:"]);
        assert_eq!(parse_prefix_list("a:,,b:,"), vec!["a:", "b:"]);
    }

    #[test]
    fn test_target_debug_redacts_password() {
        let mut target = StoreTarget::new("localhost", 6379, 0);
        target.password = Some("hunter2".into());
        let debug = format!("{:?}", target);
        assert!(!debug.contains("hunter2"));
        assert_eq!(target.to_display_string(), "localhost:6379/0");
    }
}
