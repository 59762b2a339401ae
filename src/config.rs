//! Knobs shared by the Froidure-Pin and Todd-Coxeter engines (spec §6).

/// Request the engine enumerate everything it can, without a soft cap.
pub const LIMIT_MAX: usize = crate::utils::UNDEFINED;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of extra elements to generate per implicit enumeration step
    /// triggered by a query such as `position`.
    pub batch_size: usize,
    /// Upper bound on worker threads used by idempotent search and the
    /// congruence parallel driver. Clamped to hardware concurrency.
    pub max_threads: usize,
    /// Process-wide toggle for progress logging via the `log` facade. Never
    /// affects results, only whether `log::info!` lines are emitted.
    pub report: bool,
}

impl Config {
    fn hardware_concurrency() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    pub fn with_max_threads(mut self, n: usize) -> Self {
        self.max_threads = std::cmp::min(n, Self::hardware_concurrency());
        self
    }

    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    pub fn with_report(mut self, report: bool) -> Self {
        self.report = report;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            batch_size: 8192,
            max_threads: Self::hardware_concurrency(),
            report: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.batch_size, 8192);
        assert!(cfg.max_threads >= 1);
        assert!(!cfg.report);
    }

    #[test]
    fn builder_clamps_threads() {
        let cfg = Config::default().with_max_threads(usize::MAX);
        assert!(cfg.max_threads <= Config::hardware_concurrency());
    }
}
