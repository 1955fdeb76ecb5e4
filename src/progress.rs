//! Progress reporting for the keyspace scan
//!
//! Provides a progress bar sized to the key count using indicatif, and a
//! styled header and summary. Everything here writes to stderr; stdout is
//! reserved for the report.

use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress bar over the number of keys processed
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a bar expecting `total` keys
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} keys ({per_sec}, {eta}) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> ")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Advance by the size of one batch and refresh the message
    pub fn update(&self, keys: u64, prefixes: usize, sampled_bytes: u64) {
        self.bar.inc(keys);

        let msg = if sampled_bytes > 0 {
            format!(
                "| Prefixes: {} | Sampled: {}",
                format_number(prefixes as u64),
                format_size(sampled_bytes, BINARY)
            )
        } else {
            format!("| Prefixes: {}", format_number(prefixes as u64))
        };

        self.bar.set_message(msg);
    }

    /// Keys counted so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish the bar
    ///
    /// Batch sizes are only a hint, so a limited scan can overshoot the
    /// expected total; the length is raised to match before finishing.
    pub fn finish(&self, message: &str) {
        let position = self.bar.position();
        if self.bar.length().is_some_and(|len| position > len) {
            self.bar.set_length(position);
        }
        self.bar.finish_with_message(message.to_string());
    }

    /// Leave the bar on screen as it is after a failure
    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header before the scan starts
pub fn print_header(target: &str, pattern: Option<&str>, sampling_cap: u64) {
    eprintln!();
    eprintln!(
        "{} {}",
        style("keyspace-inventory").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Target:").bold(), target);
    eprintln!("  {} {}", style("Match:").bold(), pattern.unwrap_or("*"));
    if sampling_cap > 0 {
        eprintln!(
            "  {} up to {} per prefix",
            style("Sampling:").bold(),
            format_number(sampling_cap)
        );
    } else {
        eprintln!("  {} disabled", style("Sampling:").bold());
    }
    eprintln!();
}

/// Print a summary after the scan
pub fn print_summary(
    keys: u64,
    prefixes: usize,
    batches: u64,
    reconnects: u64,
    duration: Duration,
    completed: bool,
) {
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        keys as f64 / duration_secs
    } else {
        0.0
    };

    let title = if completed {
        style("Scan Complete").green().bold()
    } else {
        style("Scan Stopped At Limit").yellow().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Keys:").bold(), format_number(keys));
    eprintln!(
        "  {} {}",
        style("Prefixes:").bold(),
        format_number(prefixes as u64)
    );
    eprintln!("  {} {}", style("Batches:").bold(), format_number(batches));
    if reconnects > 0 {
        eprintln!(
            "  {} {}",
            style("Reconnects:").yellow().bold(),
            format_number(reconnects)
        );
    }
    eprintln!(
        "  {} {:.1}s ({:.0} keys/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_finish_raises_length_on_overshoot() {
        let progress = ProgressReporter::new(10);
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        progress.update(8, 1, 0);
        progress.update(8, 2, 512);
        assert_eq!(progress.position(), 16);

        progress.finish("done");
        assert_eq!(progress.bar.length(), Some(16));
    }
}
