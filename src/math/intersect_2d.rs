use super::{cross, Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() <= TOLERANCE * d1.norm() * d2.norm() {
        return None;
    }
    let d = p2 - p1;
    let t = cross(&d, d2) / denom;
    let u = cross(&d, d1) / denom;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel segments return `None`; use [`collinear_overlap_2d`] for those.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        let pt = a0 + da * t_clamped;
        Some((pt, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Overlap of two collinear segments.
///
/// Returns the parameters on `a` of the endpoints of `b` lying strictly inside
/// `a`, or `None` if the segments are not collinear within `eps`.
#[must_use]
pub fn collinear_overlap_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    eps: f64,
) -> Option<Vec<(f64, Point2)>> {
    let da = a1 - a0;
    let len_sq = da.norm_squared();
    if len_sq < eps * eps {
        return None;
    }
    let len = len_sq.sqrt();
    let off0 = cross(&da, &(b0 - a0)).abs() / len;
    let off1 = cross(&da, &(b1 - a0)).abs() / len;
    if off0 > eps || off1 > eps {
        return None;
    }

    let mut inside = Vec::new();
    for p in [b0, b1] {
        let t = (p - a0).dot(&da) / len_sq;
        let along = t * len;
        if along > eps && along < len - eps {
            inside.push((t, *p));
        }
    }
    Some(inside)
}

/// Intersections of the line `p + s * d` with a circle.
///
/// Returns the line parameters `s` of the (up to two) intersection points.
#[must_use]
pub fn line_circle_intersect_2d(p: &Point2, d: &Vector2, center: &Point2, radius: f64) -> Vec<f64> {
    let a = d.norm_squared();
    if a < TOLERANCE * TOLERANCE {
        return Vec::new();
    }
    let f = p - center;
    let b = 2.0 * f.dot(d);
    let c = f.norm_squared() - radius * radius;
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let disc_sqrt = discriminant.sqrt();
    if disc_sqrt < TOLERANCE {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    }
}

/// Intersection points of two full circles.
#[must_use]
pub fn circle_circle_intersect_2d(c1: &Point2, r1: f64, c2: &Point2, r2: f64) -> Vec<Point2> {
    let delta = c2 - c1;
    let dist_sq = delta.norm_squared();
    let dist = dist_sq.sqrt();

    if dist < TOLERANCE {
        // Concentric circles: no isolated intersection points.
        return Vec::new();
    }
    if dist > r1 + r2 + TOLERANCE || dist < (r1 - r2).abs() - TOLERANCE {
        return Vec::new();
    }

    // Distance from c1 along the line c1→c2 to the radical line.
    let a = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let mid = c1 + delta * (a / dist);
    let perp = Vector2::new(-delta.y, delta.x) / dist;

    if h < TOLERANCE {
        vec![mid]
    } else {
        vec![mid + perp * h, mid - perp * h]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments() {
        let (p, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 1.0).abs() < TOLERANCE);
        assert!((p.y - 1.0).abs() < TOLERANCE);
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn disjoint_segments() {
        let hit = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 2.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let hit = line_line_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Vector2::new(2.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn collinear_overlap_reports_inner_endpoints() {
        let inside = collinear_overlap_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(6.0, 0.0),
            1e-9,
        )
        .unwrap();
        assert_eq!(inside.len(), 1);
        assert!((inside[0].0 - 0.25).abs() < TOLERANCE);
    }

    #[test]
    fn offset_parallel_is_not_collinear() {
        let overlap = collinear_overlap_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 0.0),
            &Point2::new(1.0, 1.0),
            &Point2::new(6.0, 1.0),
            1e-9,
        );
        assert!(overlap.is_none());
    }

    #[test]
    fn line_through_circle_center() {
        let hits = line_circle_intersect_2d(
            &Point2::new(-5.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &Point2::origin(),
            2.0,
        );
        assert_eq!(hits.len(), 2);
        assert!((hits[0] - 3.0).abs() < TOLERANCE);
        assert!((hits[1] - 7.0).abs() < TOLERANCE);
    }

    #[test]
    fn two_unit_circles() {
        let pts = circle_circle_intersect_2d(&Point2::new(0.0, 0.0), 1.0, &Point2::new(1.0, 0.0), 1.0);
        assert_eq!(pts.len(), 2);
        for p in pts {
            assert!((p.x - 0.5).abs() < TOLERANCE);
            assert!((p.y.abs() - 0.75_f64.sqrt()).abs() < TOLERANCE);
        }
    }
}
