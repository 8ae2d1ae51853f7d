use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Degradation {
    /// One candidate could not be scored and got the neutral score.
    ScoringFailure,
    /// No candidate could be scored, a random safe candidate was picked.
    FallbackSelection,
    /// Meal history could not be read, an empty snapshot was used.
    SnapshotFailure,
}

/// Process-wide failure tracking.
///
/// Constructed once at startup and shared by `Arc` with whatever needs to
/// record a degraded path.
#[derive(Debug, Default)]
pub struct DegradationMonitor {
    scoring_failures: AtomicU64,
    fallback_selections: AtomicU64,
    snapshot_failures: AtomicU64,
    safety_rejections: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DegradationReport {
    pub scoring_failures: u64,
    pub fallback_selections: u64,
    pub snapshot_failures: u64,
    pub safety_rejections: u64,
}

impl DegradationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, degradation: Degradation) {
        let total = self.counter(degradation).fetch_add(1, Ordering::Relaxed) + 1;

        tracing::warn!(
            degradation = ?degradation,
            total = total,
            "recommendation degraded"
        );
    }

    pub fn record_rejections(&self, count: u64) {
        if count > 0 {
            self.safety_rejections.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn count(&self, degradation: Degradation) -> u64 {
        self.counter(degradation).load(Ordering::Relaxed)
    }

    pub fn report(&self) -> DegradationReport {
        DegradationReport {
            scoring_failures: self.scoring_failures.load(Ordering::Relaxed),
            fallback_selections: self.fallback_selections.load(Ordering::Relaxed),
            snapshot_failures: self.snapshot_failures.load(Ordering::Relaxed),
            safety_rejections: self.safety_rejections.load(Ordering::Relaxed),
        }
    }

    fn counter(&self, degradation: Degradation) -> &AtomicU64 {
        match degradation {
            Degradation::ScoringFailure => &self.scoring_failures,
            Degradation::FallbackSelection => &self.fallback_selections,
            Degradation::SnapshotFailure => &self.snapshot_failures,
        }
    }
}
