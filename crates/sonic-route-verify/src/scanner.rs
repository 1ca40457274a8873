//! Line scanner.
//!
//! Order matters downstream: a next-hop line belongs to the closest header
//! line above it.

/// Splits captured output into ordered lines.
///
/// `\r\n` endings are accepted; other trailing artifacts are left for the
/// field parsers to trim.
pub fn scan_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}
