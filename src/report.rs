//! Ranked prefix report
//!
//! Entries are ranked by estimated size, then by key count, both
//! descending. Each entry renders as one line:
//!
//! ```text
//! user:* -> 120341 keys, ~1.21 GB estimated size
//! order:* -> 33 keys
//! ```
//!
//! The size part only appears for prefixes with at least one size sample.

use crate::aggregate::{AggregateTable, PrefixStat};
use std::io::{self, Write};
use tracing::warn;

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// Rank entries, keeping at most `top` of them (all if None)
pub fn rank(table: &AggregateTable, top: Option<usize>) -> Vec<&PrefixStat> {
    let mut ranked: Vec<&PrefixStat> = table.iter().collect();

    ranked.sort_by(|a, b| {
        b.estimated_total_bytes()
            .cmp(&a.estimated_total_bytes())
            .then_with(|| b.key_count.cmp(&a.key_count))
    });

    if let Some(top) = top {
        ranked.truncate(top);
    }

    ranked
}

/// Render one entry
pub fn render_line(stat: &PrefixStat) -> String {
    if stat.has_samples() {
        format!(
            "{} -> {} keys, ~{} estimated size",
            stat.prefix,
            stat.key_count,
            format_size(stat.estimated_total_bytes())
        )
    } else {
        format!("{} -> {} keys", stat.prefix, stat.key_count)
    }
}

/// Render the ranked report
pub fn render(table: &AggregateTable, top: Option<usize>) -> Vec<String> {
    rank(table, top).into_iter().map(render_line).collect()
}

/// Write the ranked report, one line per entry
pub fn write_report<W: Write>(
    out: &mut W,
    table: &AggregateTable,
    top: Option<usize>,
) -> io::Result<()> {
    for line in render(table, top) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

/// Format a byte count with base-1024 units
///
/// Below 1 KB the exact byte count is shown; larger sizes are rounded to
/// three significant digits.
pub fn format_size(size: u64) -> String {
    match size {
        s if s < KB => format!("{} bytes", s),
        s if s < MB => format!("{} KB", significant(s as f64 / KB as f64)),
        s if s < GB => format!("{} MB", significant(s as f64 / MB as f64)),
        s => format!("{} GB", significant(s as f64 / GB as f64)),
    }
}

/// Round to three significant digits and drop trailing zeros
fn significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }

    let scale = 2 - value.abs().log10().floor() as i32;
    let rounded = if scale >= 0 {
        let factor = 10f64.powi(scale);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-scale);
        (value / factor).round() * factor
    };

    // Rounding may carry into the next power of ten (9.996 -> 10.0)
    let decimals = (2 - rounded.abs().log10().floor() as i32).max(0) as usize;
    let text = format!("{:.*}", decimals, rounded);

    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// Prints the report for a table exactly once, even on early return
///
/// The pipeline records into [`ReportOnExit::table_mut`]. A successful run
/// calls [`ReportOnExit::finish`]; on any other path (an error propagated
/// with `?`, a panic) the report is written when the guard is dropped, so
/// whatever was aggregated before the failure is still shown.
pub struct ReportOnExit<W: Write> {
    out: W,
    table: AggregateTable,
    top: Option<usize>,
    written: bool,
}

impl<W: Write> ReportOnExit<W> {
    /// Create a guard around an empty table
    pub fn new(out: W, top: Option<usize>) -> Self {
        Self {
            out,
            table: AggregateTable::new(),
            top,
            written: false,
        }
    }

    /// The table being reported
    pub fn table(&self) -> &AggregateTable {
        &self.table
    }

    /// Mutable access for the pipeline
    pub fn table_mut(&mut self) -> &mut AggregateTable {
        &mut self.table
    }

    /// Write the report now
    pub fn finish(mut self) -> io::Result<()> {
        self.write_once()
    }

    fn write_once(&mut self) -> io::Result<()> {
        if self.written {
            return Ok(());
        }
        self.written = true;
        write_report(&mut self.out, &self.table, self.top)
    }
}

impl<W: Write> Drop for ReportOnExit<W> {
    fn drop(&mut self) {
        if let Err(e) = self.write_once() {
            warn!(error = %e, "Failed to write report");
        }
    }
}
