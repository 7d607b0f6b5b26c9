use tracing::debug;

use super::select::{BooleanOp, FillRule};
use crate::config::KernelConfig;
use crate::error::Result;
use crate::geometry::{Path, PathVector};
use crate::graph::GraphBuilder;

/// One boolean operand: its paths and the fill rule they are read with.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    pub paths: &'a [Path],
    pub fill: FillRule,
}

impl<'a> Operand<'a> {
    /// Operand read with the non-zero rule.
    #[must_use]
    pub fn new(paths: &'a [Path]) -> Self {
        Self {
            paths,
            fill: FillRule::NonZero,
        }
    }

    #[must_use]
    pub fn with_fill(mut self, fill: FillRule) -> Self {
        self.fill = fill;
        self
    }
}

/// Executes a boolean operation on two filled regions.
///
/// Orchestrates the full pipeline: approximation, sweep normalization,
/// winding resolution and contour extraction. [`FillRule::Raw`] operands are
/// read with the positive rule, since a region is needed.
///
/// # Errors
///
/// Returns an error if the input is not finite, the sweep fails, or the
/// operation is cancelled.
pub fn boolean_execute(
    a: Operand<'_>,
    b: Operand<'_>,
    op: BooleanOp,
    config: &KernelConfig,
) -> Result<PathVector> {
    let region_fill = |fill: FillRule| {
        if fill == FillRule::Raw {
            FillRule::Positive
        } else {
            fill
        }
    };
    let mut builder = GraphBuilder::new(config.clone());
    builder.add_operand(a.paths, region_fill(a.fill))?;
    builder.add_operand(b.paths, region_fill(b.fill))?;
    builder.normalize()?;
    builder.resolve(|inside| op.combine(inside[0], inside[1]))?;
    let result = builder.extract()?;
    debug!(
        ?op,
        inputs = a.paths.len() + b.paths.len(),
        contours = result.len(),
        "boolean operation finished"
    );
    Ok(result)
}

/// Rebuilds one region so that no contour crosses another.
///
/// With [`FillRule::Raw`] the normalized edges are kept with their own
/// orientation and open subpaths stay open.
///
/// # Errors
///
/// Returns an error if the input is not finite, the sweep fails, or the
/// operation is cancelled.
pub fn simplify_execute(operand: Operand<'_>, config: &KernelConfig) -> Result<PathVector> {
    let mut builder = GraphBuilder::new(config.clone());
    builder.add_operand(operand.paths, operand.fill)?;
    builder.normalize()?;
    if operand.fill == FillRule::Raw {
        builder.resolve_raw()?;
    } else {
        builder.resolve(|inside| inside[0])?;
    }
    let result = builder.extract()?;
    debug!(
        fill = ?operand.fill,
        inputs = operand.paths.len(),
        contours = result.len(),
        "simplify finished"
    );
    Ok(result)
}
