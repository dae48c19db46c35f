//! Logging facilities for Lattice View.
//!
//! Lattice View uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_view::view=debug")
//!     .init();
//! ```
//!
//! Per-item incremental operations log at `trace`, strategy decisions
//! (incremental vs. rebuild, sort-diff move counts) at `debug`, and recovered
//! divergence at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// View synchronizer target.
    pub const VIEW: &str = "lattice_view::view";
    /// Observable collection (notification sink) target.
    pub const COLLECTION: &str = "lattice_view::collection";
    /// Dispatcher target.
    pub const DISPATCH: &str = "lattice_view::dispatch";
    /// Signal emission target.
    pub const SIGNAL: &str = "lattice_view::signal";
    /// Performance spans.
    pub const PERF: &str = "lattice_view::perf";
}

/// A performance tracing span guard.
///
/// The span is active until the guard is dropped.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "lattice_view::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("lattice_view=trace")
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_perf_span() {
        setup();
        let _span = PerfSpan::new("test_operation");
        tracing::debug!(target: targets::VIEW, "inside perf span");
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [
            targets::VIEW,
            targets::COLLECTION,
            targets::DISPATCH,
            targets::SIGNAL,
            targets::PERF,
        ] {
            assert!(target.starts_with("lattice_view::"));
        }
    }
}
