use std::str::FromStr;

use crate::error::{OperationError, Result};

/// Automatic tolerance as a fraction of the stroke width.
const AUTO_TOLERANCE_FACTOR: f64 = 2.5e-3;

/// Smallest tolerance ever used for flattening and arc fitting.
const MIN_TOLERANCE: f64 = 1e-6;

/// How the outside of a corner is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Bevel,
    Round,
    /// Sharp corner, replaced by a bevel past the miter limit.
    Miter,
    /// Sharp corner, clipped at the miter limit.
    MiterClip,
    /// Extends both sides along their circles of curvature.
    Extrapolate,
    /// Like [`LineJoin::Extrapolate`], averaging two curvature samples per side.
    Extrapolate1,
    /// Like [`LineJoin::Extrapolate`], averaging three curvature samples per side.
    Extrapolate2,
    /// One curvature, blended from both sides, used for both extensions.
    Extrapolate3,
}

/// How the ends of an open path are finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    ButtFlat,
    ButtRound,
    ButtSquare,
    ButtPeak,
}

impl TryFrom<u8> for LineJoin {
    type Error = OperationError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Bevel),
            1 => Ok(Self::Round),
            2 => Ok(Self::Miter),
            3 => Ok(Self::MiterClip),
            4 => Ok(Self::Extrapolate),
            5 => Ok(Self::Extrapolate1),
            6 => Ok(Self::Extrapolate2),
            7 => Ok(Self::Extrapolate3),
            _ => Err(OperationError::UnknownVariant {
                kind: "line join",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for LineJoin {
    type Err = OperationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bevel" => Ok(Self::Bevel),
            "round" => Ok(Self::Round),
            "miter" => Ok(Self::Miter),
            "miter-clip" | "miterclip" => Ok(Self::MiterClip),
            "extrapolate" => Ok(Self::Extrapolate),
            "extrapolate1" => Ok(Self::Extrapolate1),
            "extrapolate2" => Ok(Self::Extrapolate2),
            "extrapolate3" => Ok(Self::Extrapolate3),
            _ => Err(OperationError::UnknownVariant {
                kind: "line join",
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<u8> for LineCap {
    type Error = OperationError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::ButtFlat),
            1 => Ok(Self::ButtRound),
            2 => Ok(Self::ButtSquare),
            3 => Ok(Self::ButtPeak),
            _ => Err(OperationError::UnknownVariant {
                kind: "line cap",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for LineCap {
    type Err = OperationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "butt" | "flat" => Ok(Self::ButtFlat),
            "round" => Ok(Self::ButtRound),
            "square" => Ok(Self::ButtSquare),
            "peak" => Ok(Self::ButtPeak),
            _ => Err(OperationError::UnknownVariant {
                kind: "line cap",
                value: s.to_owned(),
            }),
        }
    }
}

/// Style parameters for offsetting and stroking.
///
/// For offsets `width` is the signed distance (positive to the left of
/// travel); for strokes it is the full stroke width.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    width: f64,
    join: LineJoin,
    cap: LineCap,
    miter_limit: f64,
    tolerance: f64,
}

impl StrokeStyle {
    /// Creates a new style with bevel joins, flat caps, a miter limit of 4
    /// and automatic tolerance.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` is not finite.
    pub fn new(width: f64) -> Result<Self> {
        if !width.is_finite() {
            return Err(OperationError::InvalidInput(format!(
                "stroke width must be finite, got {width}"
            ))
            .into());
        }
        Ok(Self {
            width,
            join: LineJoin::default(),
            cap: LineCap::default(),
            miter_limit: 4.0,
            tolerance: 0.0,
        })
    }

    #[must_use]
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    #[must_use]
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Sets the miter limit, as a multiple of the offset distance.
    ///
    /// # Errors
    ///
    /// Returns an error if `limit` is below 1 or not finite.
    pub fn with_miter_limit(mut self, limit: f64) -> Result<Self> {
        if !(limit.is_finite() && limit >= 1.0) {
            return Err(OperationError::InvalidInput(format!(
                "miter limit must be at least 1, got {limit}"
            ))
            .into());
        }
        self.miter_limit = limit;
        Ok(self)
    }

    /// Sets the approximation tolerance; values `<= 0` select automatic.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns the stroke width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns half the stroke width.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.width * 0.5
    }

    #[must_use]
    pub fn join(&self) -> LineJoin {
        self.join
    }

    #[must_use]
    pub fn cap(&self) -> LineCap {
        self.cap
    }

    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    /// Effective tolerance, scaled by the width when automatic.
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        if self.tolerance > 0.0 {
            self.tolerance
        } else {
            auto_tolerance(self.width)
        }
    }
}

/// Tolerance derived from an offset or stroke width.
pub(super) fn auto_tolerance(width: f64) -> f64 {
    (width.abs() * AUTO_TOLERANCE_FACTOR).max(MIN_TOLERANCE)
}
