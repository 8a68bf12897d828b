// SPDX-FileCopyrightText: 2026 Fortibit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Range response parsing.
//!
//! A range body is one `SUFFIX:COUNT` pair per line. Padding lines carry a
//! count of zero.

/// Occurrences of `suffix` in a range response body, or `0` when absent.
///
/// Matching is case-insensitive. Malformed lines are skipped.
pub fn occurrences(body: &str, suffix: &str) -> u64 {
    body.lines()
        .filter_map(parse_line)
        .find(|(line_suffix, _)| line_suffix.eq_ignore_ascii_case(suffix))
        .map(|(_, count)| count)
        .unwrap_or(0)
}

fn parse_line(line: &str) -> Option<(&str, u64)> {
    let (suffix, count) = line.trim().split_once(':')?;
    let suffix = suffix.trim();
    if suffix.is_empty() {
        return None;
    }
    let count = count.trim().parse().ok()?;
    Some((suffix, count))
}
