use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::{Path, PathVector};

use super::engine::{boolean_execute, Operand};
use super::select::{BooleanOp, FillRule};

/// Computes the boolean symmetric difference of two regions.
pub struct Exclude<'a> {
    a: Operand<'a>,
    b: Operand<'a>,
}

impl<'a> Exclude<'a> {
    /// Creates a new `Exclude` operation reading both operands with the
    /// non-zero rule.
    #[must_use]
    pub fn new(a: &'a [Path], b: &'a [Path]) -> Self {
        Self {
            a: Operand::new(a),
            b: Operand::new(b),
        }
    }

    /// Sets the fill rule of each operand.
    #[must_use]
    pub fn with_fill_rules(mut self, fill_a: FillRule, fill_b: FillRule) -> Self {
        self.a.fill = fill_a;
        self.b.fill = fill_b;
        self
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    pub fn execute(&self, config: &KernelConfig) -> Result<PathVector> {
        boolean_execute(self.a, self.b, BooleanOp::Exclusion, config)
    }
}
