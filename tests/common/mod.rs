#![allow(dead_code)]

use pathgraph::math::Point2;
use pathgraph::Path;
use tracing_subscriber::EnvFilter;

/// Installs a tracing subscriber once per test binary; `RUST_LOG` filters it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn square(x0: f64, y0: f64, size: f64) -> Path {
    Path::rect(Point2::new(x0, y0), Point2::new(x0 + size, y0 + size))
}

/// Four-arc circle approximation, counter-clockwise.
pub fn circle(cx: f64, cy: f64, r: f64) -> Path {
    let k = 0.552_284_749_8 * r;
    let mut path = Path::new(Point2::new(cx + r, cy));
    path.cubic_to(
        Point2::new(cx + r, cy + k),
        Point2::new(cx + k, cy + r),
        Point2::new(cx, cy + r),
    )
    .cubic_to(
        Point2::new(cx - k, cy + r),
        Point2::new(cx - r, cy + k),
        Point2::new(cx - r, cy),
    )
    .cubic_to(
        Point2::new(cx - r, cy - k),
        Point2::new(cx - k, cy - r),
        Point2::new(cx, cy - r),
    )
    .cubic_to(
        Point2::new(cx + k, cy - r),
        Point2::new(cx + r, cy - k),
        Point2::new(cx + r, cy),
    );
    path.closed = true;
    path
}
