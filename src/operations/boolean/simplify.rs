use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::{Path, PathVector};

use super::engine::{simplify_execute, Operand};
use super::select::FillRule;

/// Removes self-intersections and overlaps from a single region.
pub struct Simplify<'a> {
    operand: Operand<'a>,
}

impl<'a> Simplify<'a> {
    /// Creates a new `Simplify` operation using the non-zero rule.
    #[must_use]
    pub fn new(paths: &'a [Path]) -> Self {
        Self {
            operand: Operand::new(paths),
        }
    }

    #[must_use]
    pub fn with_fill_rule(mut self, fill: FillRule) -> Self {
        self.operand.fill = fill;
        self
    }

    /// Executes the simplification.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub fn execute(&self, config: &KernelConfig) -> Result<PathVector> {
        simplify_execute(self.operand, config)
    }
}
