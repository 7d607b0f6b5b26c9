use super::{Point2, Vector2};

/// Winding number of a closed polygon around `p` (non-zero rule convention).
///
/// Counter-clockwise loops contribute `+1`. Points exactly on the boundary
/// may report either side.
#[must_use]
pub fn winding_number_2d(points: &[Point2], p: &Point2) -> i32 {
    let n = points.len();
    let mut winding = 0;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b, p) > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && is_left(a, b, p) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

fn is_left(a: &Point2, b: &Point2, p: &Point2) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}
