//! Run counters and the per-entry progress record.

use std::fmt;

use crate::classify::Classification;

/// Longest display name shown on a progress line.
pub const MAX_NAME_CHARS: usize = 30;

/// Counts for one run. `rejected` is derived so the totals always add up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub accepted: usize,
}

impl RunSummary {
    pub fn rejected(&self) -> usize {
        self.total - self.accepted
    }

    /// Count one classified entry.
    pub fn record(&mut self, classification: &Classification) {
        self.total += 1;
        if classification.is_accepted() {
            self.accepted += 1;
        }
    }
}

/// What the run loop reports after classifying one entry.
#[derive(Debug, Clone)]
pub struct EntryReport<'a> {
    /// 1-based position among complete entries.
    pub index: usize,
    pub name: &'a str,
    pub url: &'a str,
    pub classification: &'a Classification,
}

impl fmt::Display for EntryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.classification;
        write!(
            f,
            "[{:>4}] {:<width$}  {}  ({}: {})",
            self.index,
            truncate_name(self.name),
            c.verdict,
            c.stage,
            c.reason,
            width = MAX_NAME_CHARS
        )
    }
}

/// Shorten `name` to at most [`MAX_NAME_CHARS`] characters, ending in `...`
/// when cut.
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_CHARS {
        return name.to_string();
    }
    let mut short: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
    short.push_str("...");
    short
}
