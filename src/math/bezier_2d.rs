use super::{cross, Point2, Vector2};

/// A cubic Bézier curve with explicit start point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBez {
    pub p0: Point2,
    pub p1: Point2,
    pub p2: Point2,
    pub p3: Point2,
}

impl CubicBez {
    #[must_use]
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Evaluates the curve at `t` in `[0, 1]`.
    #[must_use]
    pub fn eval(&self, t: f64) -> Point2 {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point2::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x + d * self.p3.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y + d * self.p3.y,
        )
    }

    /// First derivative at `t`.
    #[must_use]
    pub fn deriv(&self, t: f64) -> Vector2 {
        let mt = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * mt * mt)
            + (self.p2 - self.p1) * (6.0 * mt * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Second derivative at `t`.
    #[must_use]
    pub fn deriv2(&self, t: f64) -> Vector2 {
        let a = (self.p2 - self.p1) - (self.p1 - self.p0);
        let b = (self.p3 - self.p2) - (self.p2 - self.p1);
        (a * (1.0 - t) + b * t) * 6.0
    }

    /// Unit tangent at `t`, falling back to the control polygon where the
    /// derivative vanishes (coincident control points).
    #[must_use]
    pub fn unit_tangent(&self, t: f64) -> Option<Vector2> {
        let d = self.deriv(t);
        if d.norm() > 1e-12 {
            return Some(d.normalize());
        }
        let fallback = if t < 0.5 {
            [self.p2 - self.p0, self.p3 - self.p0]
        } else {
            [self.p3 - self.p1, self.p3 - self.p0]
        };
        fallback
            .into_iter()
            .find(|v| v.norm() > 1e-12)
            .map(|v| v.normalize())
    }

    /// Signed curvature at `t` (positive when turning left).
    #[must_use]
    pub fn curvature(&self, t: f64) -> f64 {
        let d1 = self.deriv(t);
        let len = d1.norm();
        if len < 1e-12 {
            return 0.0;
        }
        cross(&d1, &self.deriv2(t)) / (len * len * len)
    }

    /// Splits the curve at `t` using de Casteljau's algorithm.
    #[must_use]
    pub fn split(&self, t: f64) -> (Self, Self) {
        let p01 = self.p0 + (self.p1 - self.p0) * t;
        let p12 = self.p1 + (self.p2 - self.p1) * t;
        let p23 = self.p2 + (self.p3 - self.p2) * t;
        let p012 = p01 + (p12 - p01) * t;
        let p123 = p12 + (p23 - p12) * t;
        let mid = p012 + (p123 - p012) * t;
        (
            Self::new(self.p0, p01, p012, mid),
            Self::new(mid, p123, p23, self.p3),
        )
    }

    /// Returns the part of the curve between `t0` and `t1`.
    ///
    /// When `t0 > t1` the sub-curve runs backwards.
    #[must_use]
    pub fn subsegment(&self, t0: f64, t1: f64) -> Self {
        if t0 > t1 {
            return self.subsegment(t1, t0).reversed();
        }
        let (head, _) = self.split(t1);
        if t1 <= 1e-12 {
            return Self::new(self.p0, self.p0, self.p0, self.p0);
        }
        let (_, tail) = head.split(t0 / t1);
        tail
    }

    /// Returns the same curve traversed backwards.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.p3, self.p2, self.p1, self.p0)
    }

    /// Maximum distance of the inner control points from the chord.
    #[must_use]
    pub fn flatness(&self) -> f64 {
        let chord = self.p3 - self.p0;
        let len = chord.norm();
        if len < 1e-12 {
            return (self.p1 - self.p0).norm().max((self.p2 - self.p0).norm());
        }
        let d1 = cross(&chord, &(self.p1 - self.p0)).abs() / len;
        let d2 = cross(&chord, &(self.p2 - self.p0)).abs() / len;
        d1.max(d2)
    }

    /// Signed area between the curve and the origin (Green's theorem).
    ///
    /// Summing this over a closed path gives the enclosed signed area.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let (p0, p1, p2, p3) = (self.p0, self.p1, self.p2, self.p3);
        (p0.x * (6.0 * p1.y + 3.0 * p2.y + p3.y)
            + 3.0 * (p1.x * (-2.0 * p0.y + p2.y + p3.y) - p2.x * (p0.y + p1.y - 2.0 * p3.y))
            - p3.x * (p0.y + 3.0 * p1.y + 6.0 * p2.y))
            * (1.0 / 20.0)
    }

    /// Adaptively flattens the curve into `(t, point)` samples, excluding `t = 0`.
    ///
    /// Each emitted chord deviates from the curve by at most `tolerance`.
    #[must_use]
    pub fn flatten(&self, tolerance: f64) -> Vec<(f64, Point2)> {
        const MAX_DEPTH: u32 = 16;
        let mut out = Vec::new();
        let mut stack = vec![(0.0, 1.0, *self, 0u32)];
        while let Some((t0, t1, curve, depth)) = stack.pop() {
            if depth >= MAX_DEPTH || curve.flatness() <= tolerance {
                out.push((t1, curve.p3));
                continue;
            }
            let (left, right) = curve.split(0.5);
            let tm = 0.5 * (t0 + t1);
            // Right half first so the left half is processed next.
            stack.push((tm, t1, right, depth + 1));
            stack.push((t0, tm, left, depth + 1));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arch() -> CubicBez {
        CubicBez::new(
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        )
    }

    #[test]
    fn eval_endpoints_and_midpoint() {
        let c = arch();
        assert!((c.eval(0.0) - c.p0).norm() < 1e-12);
        assert!((c.eval(1.0) - c.p3).norm() < 1e-12);
        let mid = c.eval(0.5);
        assert!((mid.x - 0.5).abs() < 1e-12);
        assert!((mid.y - 0.75).abs() < 1e-12);
    }

    #[test]
    fn split_halves_meet() {
        let (a, b) = arch().split(0.3);
        assert!((a.p3 - b.p0).norm() < 1e-12);
        assert!((a.p3 - arch().eval(0.3)).norm() < 1e-12);
    }

    #[test]
    fn subsegment_matches_original() {
        let c = arch();
        let sub = c.subsegment(0.25, 0.75);
        assert!((sub.eval(0.0) - c.eval(0.25)).norm() < 1e-12);
        assert!((sub.eval(0.5) - c.eval(0.5)).norm() < 1e-12);
        assert!((sub.eval(1.0) - c.eval(0.75)).norm() < 1e-12);
        let back = c.subsegment(0.75, 0.25);
        assert!((back.eval(0.0) - c.eval(0.75)).norm() < 1e-12);
    }

    #[test]
    fn straight_cubic_area_matches_shoelace_term() {
        let c = CubicBez::new(
            Point2::new(1.0, 0.0),
            Point2::new(2.0 / 3.0, 1.0 / 3.0),
            Point2::new(1.0 / 3.0, 2.0 / 3.0),
            Point2::new(0.0, 1.0),
        );
        assert!((c.signed_area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn flatten_respects_tolerance() {
        let c = arch();
        let samples = c.flatten(1e-3);
        assert!(samples.len() > 4);
        assert!((samples.last().map_or(0.0, |s| s.0) - 1.0).abs() < 1e-12);
        let mut prev = 0.0;
        for (t, p) in &samples {
            assert!(*t > prev);
            assert!((c.eval(*t) - *p).norm() < 1e-12);
            prev = *t;
        }
    }

    #[test]
    fn curvature_of_straight_line_is_zero() {
        let c = CubicBez::new(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
        );
        assert!(c.curvature(0.5).abs() < 1e-12);
        assert!(arch().curvature(0.5) < 0.0);
    }
}
