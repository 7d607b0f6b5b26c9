//! Connected-component splitting of path collections.
//!
//! Paths whose filled regions touch or overlap end up in the same component.
//! Components share no geometry, so each can be combined on its own; that is
//! what [`process_components`] does on an explicitly sized worker pool.
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::config::KernelConfig;
use crate::error::{OperationError, Result};
use crate::geometry::{is_path_empty, Path, PathVector};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::winding_number_2d;
use crate::math::Point2;
use crate::operations::boolean::{simplify_execute, FillRule, Operand};

/// Disjoint-set forest over `0..n` with path halving and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Returns the representative of `x`'s set.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`. Returns `false` if they were already one.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    /// Returns every set, members ascending, sets ordered by smallest member.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root = vec![usize::MAX; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for x in 0..self.parent.len() {
            let root = self.find(x);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot_of_root[root]].push(x);
        }
        groups
    }
}

/// Partitions `0..n` into groups connected by the `adjacent` predicate.
///
/// The predicate is only asked about pairs `i < j` not already known to be
/// connected.
pub fn connected_components<F>(n: usize, mut adjacent: F) -> Vec<Vec<usize>>
where
    F: FnMut(usize, usize) -> bool,
{
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if uf.find(i) != uf.find(j) && adjacent(i, j) {
                uf.union(i, j);
            }
        }
    }
    uf.groups()
}

/// A path flattened for overlap tests: closed polygon plus bounds.
struct Outline {
    points: Vec<Point2>,
    min: Point2,
    max: Point2,
}

impl Outline {
    fn new(path: &Path, tolerance: f64) -> Option<Self> {
        let (min, max) = path.bounding_box()?;
        let mut points = path.to_points(tolerance);
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Some(Self { points, min, max })
    }

    fn boxes_touch(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    fn contains(&self, p: &Point2) -> bool {
        winding_number_2d(&self.points, p) != 0
    }
}

/// Whether the regions of two flattened paths touch or overlap.
fn outlines_overlap(a: &Outline, b: &Outline) -> bool {
    if !a.boxes_touch(b) {
        return false;
    }
    let crossing = a.edges().any(|(a0, a1)| {
        b.edges()
            .any(|(b0, b1)| segment_segment_intersect_2d(&a0, &a1, &b0, &b1).is_some())
    });
    crossing
        || a.points.first().is_some_and(|p| b.contains(p))
        || b.points.first().is_some_and(|p| a.contains(p))
}

/// Whether the filled regions of two paths touch or overlap.
///
/// Open paths are read as closed by a straight line.
#[must_use]
pub fn paths_overlap(a: &Path, b: &Path, tolerance: f64) -> bool {
    match (Outline::new(a, tolerance), Outline::new(b, tolerance)) {
        (Some(a), Some(b)) => outlines_overlap(&a, &b),
        _ => false,
    }
}

/// Groups path indices into overlap components.
///
/// With `remove_empty`, paths of near-zero area are left out of every group;
/// otherwise the groups partition `0..paths.len()`.
#[must_use]
pub fn path_components(paths: &[Path], remove_empty: bool, tolerance: f64) -> Vec<Vec<usize>> {
    let kept: Vec<usize> = (0..paths.len())
        .filter(|&i| !(remove_empty && is_path_empty(&paths[i])))
        .collect();
    let outlines: Vec<Option<Outline>> = kept
        .iter()
        .map(|&i| Outline::new(&paths[i], tolerance))
        .collect();
    connected_components(kept.len(), |i, j| match (&outlines[i], &outlines[j]) {
        (Some(a), Some(b)) => outlines_overlap(a, b),
        _ => false,
    })
    .into_iter()
    .map(|group| group.into_iter().map(|k| kept[k]).collect())
    .collect()
}

/// Splits a path collection into groups that do not interact.
#[must_use]
pub fn split_non_intersecting_paths(
    paths: &[Path],
    remove_empty: bool,
    config: &KernelConfig,
) -> Vec<PathVector> {
    let groups = path_components(paths, remove_empty, config.flatten_tolerance);
    debug!(paths = paths.len(), components = groups.len(), "split paths");
    groups
        .into_iter()
        .map(|group| group.into_iter().map(|i| paths[i].clone()).collect())
        .collect()
}

/// Runs `task` on every component in a pool of `config.worker_threads`.
///
/// Results come back in component order. A failing component does not stop
/// its siblings; the returned vector holds each outcome.
///
/// # Errors
///
/// Returns an error only if the worker pool cannot be created.
pub fn process_components<T, F>(
    components: &[PathVector],
    config: &KernelConfig,
    task: F,
) -> Result<Vec<Result<T>>>
where
    T: Send,
    F: Fn(&[Path], &KernelConfig) -> Result<T> + Sync,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.worker_threads.max(1))
        .build()
        .map_err(|e| OperationError::Failed(format!("worker pool: {e}")))?;
    Ok(pool.install(|| {
        components
            .par_iter()
            .map(|component| {
                config.check_cancelled()?;
                task(component, config)
            })
            .collect()
    }))
}

/// Unions a path collection component by component.
///
/// # Errors
///
/// Returns the first component failure, or a pool creation error.
pub fn union_all(paths: &[Path], fill: FillRule, config: &KernelConfig) -> Result<PathVector> {
    let components = split_non_intersecting_paths(paths, false, config);
    let outcomes = process_components(&components, config, |component, config| {
        simplify_execute(Operand::new(component).with_fill(fill), config)
    })?;
    let mut result = PathVector::new();
    for outcome in outcomes {
        result.extend(outcome?);
    }
    debug!(
        components = components.len(),
        contours = result.len(),
        "union of components finished"
    );
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::PathgraphError;
    use crate::geometry::total_signed_area;

    fn square(x0: f64, y0: f64, size: f64) -> Path {
        Path::rect(Point2::new(x0, y0), Point2::new(x0 + size, y0 + size))
    }

    #[test]
    fn union_find_groups_in_order() {
        let mut uf = UnionFind::new(5);
        assert!(uf.union(3, 1));
        assert!(uf.union(4, 0));
        assert!(!uf.union(1, 3));
        assert_eq!(uf.groups(), vec![vec![0, 4], vec![1, 3], vec![2]]);
    }

    #[test]
    fn chained_predicate_joins_transitively() {
        let groups = connected_components(4, |i, j| j == i + 1 && i < 2);
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn disjoint_and_overlapping_squares() {
        let paths = vec![
            square(0.0, 0.0, 1.0),
            square(5.0, 5.0, 1.0),
            square(0.5, 0.5, 1.0),
        ];
        let groups = path_components(&paths, false, 0.01);
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn nested_square_shares_component() {
        let paths = vec![square(0.0, 0.0, 10.0), square(4.0, 4.0, 1.0)];
        assert!(paths_overlap(&paths[0], &paths[1], 0.01));
        assert_eq!(path_components(&paths, false, 0.01).len(), 1);
    }

    #[test]
    fn components_partition_input() {
        let paths: Vec<Path> = (0..12)
            .map(|i| square(f64::from(i % 4) * 1.5, f64::from(i / 4) * 0.8, 1.0))
            .collect();
        let groups = path_components(&paths, false, 0.01);
        let mut seen: Vec<usize> = groups.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn empty_paths_can_be_removed() {
        let sliver = Path::from_points(
            &[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1e-6)],
            true,
        );
        let paths = vec![square(0.0, 0.0, 1.0), sliver];
        let split = split_non_intersecting_paths(&paths, true, &KernelConfig::default());
        assert_eq!(split.len(), 1);
        assert_eq!(split[0].len(), 1);
    }

    #[test]
    fn failing_component_does_not_stop_siblings() {
        let components = vec![vec![square(0.0, 0.0, 1.0)], vec![square(5.0, 0.0, 2.0)]];
        let config = KernelConfig::default().with_worker_threads(2);
        let outcomes = process_components(&components, &config, |paths, _| {
            let area = total_signed_area(paths);
            if area > 2.0 {
                Err(OperationError::Failed("too big".to_owned()).into())
            } else {
                Ok(area)
            }
        })
        .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!((outcomes[0].as_ref().unwrap() - 1.0).abs() < 1e-12);
        assert!(matches!(
            outcomes[1],
            Err(PathgraphError::Operation(OperationError::Failed(_)))
        ));
    }

    #[test]
    fn union_all_merges_each_component() {
        let paths = vec![
            square(0.0, 0.0, 1.0),
            square(0.5, 0.5, 1.0),
            square(10.0, 0.0, 1.0),
            square(10.5, 0.5, 1.0),
        ];
        let config = KernelConfig::default().with_worker_threads(2);
        let out = union_all(&paths, FillRule::NonZero, &config).unwrap();
        assert_eq!(out.len(), 2);
        assert!((total_signed_area(&out) - 3.5).abs() < 1e-9);
    }
}
