pub mod arc_2d;
pub mod bezier_2d;
pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Z component of the cross product of two planar vectors.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rounds a coordinate onto the snapping grid of spacing `eps`.
#[must_use]
pub fn snap(value: f64, eps: f64) -> f64 {
    (value / eps).round() * eps
}

/// Rounds a point onto the snapping grid of spacing `eps`.
#[must_use]
pub fn snap_point(p: &Point2, eps: f64) -> Point2 {
    Point2::new(snap(p.x, eps), snap(p.y, eps))
}

/// Orders points by sweep position: `y` first, then `x`.
#[must_use]
pub fn sweep_cmp(a: &Point2, b: &Point2) -> std::cmp::Ordering {
    a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_sign_follows_turn() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        assert!(cross(&a, &b) > 0.0);
        assert!(cross(&b, &a) < 0.0);
    }

    #[test]
    fn snap_rounds_to_grid() {
        let p = snap_point(&Point2::new(0.123_456, -0.987_654), 1e-3);
        assert!((p.x - 0.123).abs() < 1e-12);
        assert!((p.y + 0.988).abs() < 1e-12);
    }

    #[test]
    fn sweep_order_is_y_then_x() {
        use std::cmp::Ordering;
        let a = Point2::new(5.0, 0.0);
        let b = Point2::new(0.0, 1.0);
        let c = Point2::new(6.0, 0.0);
        assert_eq!(sweep_cmp(&a, &b), Ordering::Less);
        assert_eq!(sweep_cmp(&a, &c), Ordering::Less);
        assert_eq!(sweep_cmp(&a, &a), Ordering::Equal);
    }
}
