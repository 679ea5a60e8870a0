//! Lightweight operational metrics for the analyzer and query path. The
//! reference system exposes these through a REST endpoint; that surface is
//! outside this crate's scope, but the counters and histograms themselves
//! are not a surface — they're ambient observability, collected the same
//! way regardless of how (or whether) a host chooses to serve them.

use std::sync::Arc;

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};

/// Process-wide counters and histograms for this engine, registered
/// against their own private [`Registry`] rather than the default global
/// one — so a host (or a test) can construct more than one [`Metrics`]
/// without colliding on metric names. Cloning is cheap since `prometheus`
/// handles and the registry handle share an `Arc` internally.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Rows scanned by the high-frequency analyzer, across all runs.
    pub analyzer_rows_scanned: IntCounter,
    /// Analysis runs that completed successfully.
    pub analyzer_runs_completed: IntCounter,
    /// Analysis runs that failed (a worker reported an error).
    pub analyzer_runs_failed: IntCounter,
    /// Queries scored against the index.
    pub queries_scored: IntCounter,
    /// Wall-clock seconds spent extracting + scoring one query.
    pub query_latency_seconds: Histogram,
}

impl Metrics {
    /// Register a fresh set of metrics against a new, private registry.
    ///
    /// # Errors
    ///
    /// Returns an error if `prometheus` rejects one of the metric
    /// descriptors (e.g. a malformed name).
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let analyzer_rows_scanned = IntCounter::new(
            "kmerdex_analyzer_rows_scanned_total",
            "Rows scanned by the high-frequency analyzer",
        )?;
        registry.register(Box::new(analyzer_rows_scanned.clone()))?;

        let analyzer_runs_completed = IntCounter::new(
            "kmerdex_analyzer_runs_completed_total",
            "Analysis runs completed successfully",
        )?;
        registry.register(Box::new(analyzer_runs_completed.clone()))?;

        let analyzer_runs_failed =
            IntCounter::new("kmerdex_analyzer_runs_failed_total", "Analysis runs that failed")?;
        registry.register(Box::new(analyzer_runs_failed.clone()))?;

        let queries_scored =
            IntCounter::new("kmerdex_queries_scored_total", "Queries scored against the index")?;
        registry.register(Box::new(queries_scored.clone()))?;

        let query_latency_seconds = Histogram::with_opts(HistogramOpts::new(
            "kmerdex_query_latency_seconds",
            "Time to extract and score one query",
        ))?;
        registry.register(Box::new(query_latency_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            analyzer_rows_scanned,
            analyzer_runs_completed,
            analyzer_runs_failed,
            queries_scored,
            query_latency_seconds,
        })
    }

    /// The private registry these metrics are registered against, for a
    /// host to gather and export however it serves its own `/metrics`
    /// surface.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_instances_do_not_collide() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.analyzer_rows_scanned.inc();
        assert_eq!(a.analyzer_rows_scanned.get(), 1);
        assert_eq!(b.analyzer_rows_scanned.get(), 0);
    }
}
