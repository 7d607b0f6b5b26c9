use std::str::FromStr;

use crate::error::OperationError;

/// Policy mapping a winding number to inside/outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
    Positive,
    /// No classification: normalized edges keep their own orientation.
    /// Behaves like [`FillRule::Positive`] where a region is required.
    Raw,
}

impl FillRule {
    /// Returns whether a point with winding number `winding` is filled.
    #[must_use]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::EvenOdd => winding % 2 != 0,
            Self::Positive | Self::Raw => winding > 0,
        }
    }
}

impl TryFrom<u8> for FillRule {
    type Error = OperationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NonZero),
            1 => Ok(Self::EvenOdd),
            2 => Ok(Self::Positive),
            3 => Ok(Self::Raw),
            _ => Err(OperationError::UnknownVariant {
                kind: "fill rule",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for FillRule {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nonzero" | "non-zero" => Ok(Self::NonZero),
            "evenodd" | "even-odd" => Ok(Self::EvenOdd),
            "positive" => Ok(Self::Positive),
            "raw" | "justdont" => Ok(Self::Raw),
            _ => Err(OperationError::UnknownVariant {
                kind: "fill rule",
                value: s.to_owned(),
            }),
        }
    }
}

/// The type of boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersection,
    /// `A` minus `B`.
    Difference,
    Exclusion,
}

impl BooleanOp {
    /// Decides whether a region is part of the result from whether it lies
    /// inside each operand.
    ///
    /// | in A | in B | Union | Intersection | Difference | Exclusion |
    /// |------|------|-------|--------------|------------|-----------|
    /// | no   | no   | out   | out          | out        | out       |
    /// | yes  | no   | in    | out          | in         | in        |
    /// | no   | yes  | in    | out          | out        | in        |
    /// | yes  | yes  | in    | in           | out        | out       |
    #[allow(clippy::match_same_arms)]
    #[must_use]
    pub fn combine(self, in_a: bool, in_b: bool) -> bool {
        match (self, in_a, in_b) {
            (_, false, false) => false,

            (Self::Union, _, _) => true,

            (Self::Intersection, true, true) => true,
            (Self::Intersection, _, _) => false,

            (Self::Difference, true, false) => true,
            (Self::Difference, _, _) => false,

            (Self::Exclusion, true, true) => false,
            (Self::Exclusion, _, _) => true,
        }
    }
}

impl TryFrom<u8> for BooleanOp {
    type Error = OperationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Union),
            1 => Ok(Self::Intersection),
            2 => Ok(Self::Difference),
            3 => Ok(Self::Exclusion),
            _ => Err(OperationError::UnknownVariant {
                kind: "boolean operation",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for BooleanOp {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "union" => Ok(Self::Union),
            "intersection" | "intersect" => Ok(Self::Intersection),
            "difference" | "subtract" => Ok(Self::Difference),
            "exclusion" | "xor" => Ok(Self::Exclusion),
            _ => Err(OperationError::UnknownVariant {
                kind: "boolean operation",
                value: s.to_owned(),
            }),
        }
    }
}
