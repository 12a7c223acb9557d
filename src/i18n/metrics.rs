//! Translation metrics and observability.
//!
//! Counts binding lookups and injections across language switches. The
//! metrics are owned by the language switch controller rather than held
//! globally, so every page instance reports its own numbers.

use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct TranslationMetrics {
    /// Number of language switches applied
    switches: usize,

    /// Number of binding lookups attempted
    lookups: usize,

    /// Number of lookups that resolved to a string
    hits: usize,

    /// Number of lookups that left the element untouched
    misses: usize,

    /// Number of resolved strings injected as markup
    rich_injections: usize,

    /// Number of resolved strings injected as plain text
    plain_injections: usize,
}

/// Snapshot of [`TranslationMetrics`] with derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub switches: usize,
    pub lookups: usize,
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f64,
    pub rich_injections: usize,
    pub plain_injections: usize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_switch(&mut self) {
        self.switches += 1;
    }

    pub fn record_hit(&mut self, rich: bool) {
        self.lookups += 1;
        self.hits += 1;
        if rich {
            self.rich_injections += 1;
        } else {
            self.plain_injections += 1;
        }
    }

    pub fn record_miss(&mut self) {
        self.lookups += 1;
        self.misses += 1;
    }

    pub fn switches(&self) -> usize {
        self.switches
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hit_rate = if self.lookups > 0 {
            (self.hits as f64 / self.lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            switches: self.switches,
            lookups: self.lookups,
            hits: self.hits,
            misses: self.misses,
            hit_rate,
            rich_injections: self.rich_injections,
            plain_injections: self.plain_injections,
        }
    }
}
