use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SweepError};

/// Shared cancellation flag for one top-level operation.
///
/// Cancellation is all-or-nothing: a cancelled operation discards its graph
/// and reports [`SweepError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a flag in the non-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every operation holding this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parameters threaded into every top-level kernel operation.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Snapping grid used by the sweep. `None` scales it to the input extent.
    pub epsilon: Option<f64>,
    /// Maximum deviation between a curve and its polyline approximation.
    pub flatten_tolerance: f64,
    /// Sweep event heap capacity. `None` sizes it from the edge count.
    pub event_capacity: Option<usize>,
    /// Maximum number of re-sweeps before the arrangement is declared unstable.
    pub max_passes: usize,
    /// Worker pool size used when processing connected components.
    pub worker_threads: usize,
    /// Optional cancellation flag checked between sweep events.
    pub cancel: Option<CancelFlag>,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            epsilon: None,
            flatten_tolerance: 0.01,
            event_capacity: None,
            max_passes: 8,
            worker_threads: 1,
            cancel: None,
        }
    }
}

impl KernelConfig {
    /// Sets a fixed snapping grid.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    /// Sets the curve flattening tolerance.
    #[must_use]
    pub fn with_flatten_tolerance(mut self, tolerance: f64) -> Self {
        self.flatten_tolerance = tolerance;
        self
    }

    /// Pre-sizes the sweep event heap.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Sets how many times the sweep may re-run before giving up.
    #[must_use]
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    /// Sets the worker pool size for component processing.
    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    /// Attaches a cancellation flag.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Resolves the snapping grid for geometry spanning `extent` units.
    #[must_use]
    pub fn epsilon_for(&self, extent: f64) -> f64 {
        match self.epsilon {
            Some(eps) if eps > 0.0 => eps,
            _ => extent.max(1.0) * 1e-9,
        }
    }

    /// Resolves the sweep heap capacity for `edge_count` input edges.
    #[must_use]
    pub fn capacity_for(&self, edge_count: usize) -> usize {
        self.event_capacity.unwrap_or(4 * edge_count + 64)
    }

    /// Returns an error if the operation was cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Cancelled`] once the attached flag is raised.
    pub fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => Err(SweepError::Cancelled.into()),
            _ => Ok(()),
        }
    }
}
