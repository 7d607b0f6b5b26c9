use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::{Path, PathVector};

use super::engine::{boolean_execute, Operand};
use super::select::{BooleanOp, FillRule};

/// Boolean combination of two regions with the operation chosen at run time.
pub struct Boolean<'a> {
    a: Operand<'a>,
    b: Operand<'a>,
    op: BooleanOp,
}

impl<'a> Boolean<'a> {
    #[must_use]
    pub fn new(a: &'a [Path], b: &'a [Path], op: BooleanOp) -> Self {
        Self {
            a: Operand::new(a),
            b: Operand::new(b),
            op,
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
        boolean_execute(self.a, self.b, self.op, config)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::total_signed_area;
    use crate::math::Point2;

    #[test]
    fn op_code_drives_execution() {
        let a = [Path::rect(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0))];
        let b = [Path::rect(Point2::new(1.0, 0.0), Point2::new(3.0, 2.0))];
        let op = BooleanOp::try_from(2).unwrap();
        let out = Boolean::new(&a, &b, op)
            .execute(&KernelConfig::default())
            .unwrap();
        assert!((total_signed_area(&out) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn even_odd_operand_with_self_overlap() {
        // Operand A covers [1, 2] twice, which even-odd reads as a gap.
        let a = [
            Path::rect(Point2::new(0.0, 0.0), Point2::new(2.0, 1.0)),
            Path::rect(Point2::new(1.0, 0.0), Point2::new(3.0, 1.0)),
        ];
        let b = [Path::rect(Point2::new(0.0, 0.0), Point2::new(3.0, 1.0))];
        let out = Boolean::new(&a, &b, BooleanOp::Intersection)
            .with_fill_rules(FillRule::EvenOdd, FillRule::NonZero)
            .execute(&KernelConfig::default())
            .unwrap();
        assert!((total_signed_area(&out) - 2.0).abs() < 1e-9);
    }
}
