use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::queue::{EventId, SweepEventQueue};
use super::status::SweepStatus;
use crate::config::KernelConfig;
use crate::error::{Result, SweepError};
use crate::math::distance_2d::point_to_segment_dist;
use crate::math::intersect_2d::{collinear_overlap_2d, segment_segment_intersect_2d};
use crate::math::{cross, snap_point, sweep_cmp, Point2};

/// A point where a segment must be split, with its parameter on the segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPoint {
    pub t: f64,
    pub point: Point2,
}

/// Result of one sweep over a set of segments.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Distinct split points per input segment, in discovery order.
    pub splits: Vec<Vec<SplitPoint>>,
    /// Number of distinct sweep points visited.
    pub stops: usize,
    /// Number of intersection events taken from the queue.
    pub crossings: usize,
}

impl SweepReport {
    /// Returns whether any segment needs splitting.
    #[must_use]
    pub fn has_splits(&self) -> bool {
        self.splits.iter().any(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
struct Oriented {
    lo: Point2,
    hi: Point2,
}

#[derive(Debug, Clone, Copy)]
enum PairHit {
    Disjoint,
    Ahead(Point2),
}

/// One Bentley–Ottmann sweep over grid-snapped segments.
///
/// All segment endpoints are expected to lie on the snapping grid of spacing
/// `epsilon`, so that sweep points compare exactly. The pass reports every
/// point where a segment is crossed, touched or overlapped by another one.
///
/// Segments are split as the sweep goes: once a segment is split at a sweep
/// point, only its remainder from that point on takes part in later tests,
/// so the crossings of the snapped pieces are found in the same pass. The
/// input slice itself is not modified.
pub struct SweepPass<'a> {
    segments: &'a [(Point2, Point2)],
    epsilon: f64,
    config: &'a KernelConfig,
}

impl<'a> SweepPass<'a> {
    #[must_use]
    pub fn new(segments: &'a [(Point2, Point2)], epsilon: f64, config: &'a KernelConfig) -> Self {
        Self {
            segments,
            epsilon,
            config,
        }
    }

    /// Executes the sweep.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::CapacityExhausted`] if the event queue filled up
    /// and [`SweepError::Cancelled`] if the operation was cancelled.
    pub fn execute(&self) -> Result<SweepReport> {
        let edges: Vec<Oriented> = self
            .segments
            .iter()
            .map(|(a, b)| {
                if sweep_cmp(a, b) == Ordering::Greater {
                    Oriented { lo: *b, hi: *a }
                } else {
                    Oriented { lo: *a, hi: *b }
                }
            })
            .collect();
        let mut sweep = Sweep {
            input: &edges,
            current: edges.clone(),
            version: vec![0; edges.len()],
            segments: self.segments,
            eps: self.epsilon,
            queue: SweepEventQueue::with_capacity(self.config.capacity_for(edges.len())),
            status: SweepStatus::new(),
            pending: HashMap::new(),
            tested: HashMap::new(),
            report: SweepReport {
                splits: vec![Vec::new(); edges.len()],
                ..SweepReport::default()
            },
        };
        sweep.run(self.config)?;
        trace!(
            segments = edges.len(),
            stops = sweep.report.stops,
            crossings = sweep.report.crossings,
            "sweep pass finished"
        );
        Ok(sweep.report)
    }
}

/// Edges and versions of a tested pair; a version changes whenever the
/// remainder of its edge is cut at a new sweep point.
type PairKey = (usize, u32, usize, u32);

struct Sweep<'s> {
    input: &'s [Oriented],
    /// The part of each edge not yet passed by the sweep.
    current: Vec<Oriented>,
    version: Vec<u32>,
    segments: &'s [(Point2, Point2)],
    eps: f64,
    queue: SweepEventQueue,
    status: SweepStatus,
    /// Queued crossing event per adjacent pair.
    pending: HashMap<(usize, usize), EventId>,
    tested: HashMap<PairKey, PairHit>,
    report: SweepReport,
}

/// Edges handled at one sweep point.
#[derive(Default)]
struct Stop {
    /// Edges passing through the point and continuing past it.
    through: HashSet<usize>,
    /// Edges whose remainder was cut at the point.
    cut: HashSet<usize>,
}

impl Sweep<'_> {
    fn run(&mut self, config: &KernelConfig) -> Result<()> {
        let mut starts: Vec<usize> = (0..self.input.len())
            .filter(|&i| self.input[i].lo != self.input[i].hi)
            .collect();
        starts.sort_by(|&a, &b| sweep_cmp(&self.input[a].lo, &self.input[b].lo));
        let mut stops: Vec<Point2> = starts
            .iter()
            .flat_map(|&i| [self.input[i].lo, self.input[i].hi])
            .collect();
        stops.sort_by(sweep_cmp);
        stops.dedup();

        let mut next_start = 0;
        let mut next_stop = 0;
        loop {
            config.check_cancelled()?;
            let p = match (stops.get(next_stop), self.queue.peek()) {
                (None, None) => break,
                (Some(s), None) => *s,
                (None, Some(e)) => e.point,
                (Some(s), Some(e)) => {
                    if sweep_cmp(&e.point, s) == Ordering::Less {
                        e.point
                    } else {
                        *s
                    }
                }
            };
            while stops.get(next_stop) == Some(&p) {
                next_stop += 1;
            }
            self.report.stops += 1;
            let mut crossing = Vec::new();
            for event in self.queue.extract_at(&p) {
                self.pending.remove(&(event.left, event.right));
                crossing.extend([event.left, event.right]);
                self.report.crossings += 1;
            }

            let mut stop = self.pass_through(&p, &crossing);
            while let Some(&e) = starts.get(next_start) {
                if self.current[e].lo != p {
                    break;
                }
                self.insert_at(e, &p, &stop);
                stop.through.insert(e);
                next_start += 1;
            }

            self.refresh_events(&p, &stop.cut);
            if self.queue.overflowed() {
                return Err(SweepError::CapacityExhausted {
                    capacity: self.queue.capacity(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Splits every active edge passing through `p` there, drops the ones
    /// ending at `p` and sorts the rest by direction.
    ///
    /// The edges within `eps` of `p` and those between them in the status
    /// form one contiguous block; the edges of a crossing event taken at `p`
    /// always belong to it.
    fn pass_through(&mut self, p: &Point2, crossing: &[usize]) -> Stop {
        let mut stop = Stop::default();
        let hits: Vec<usize> = self
            .status
            .iter()
            .enumerate()
            .filter(|&(_, e)| {
                crossing.contains(&e)
                    || point_to_segment_dist(p, &self.current[e].lo, &self.current[e].hi) <= self.eps
            })
            .map(|(i, _)| i)
            .collect();
        let (Some(&first), Some(&last)) = (hits.first(), hits.last()) else {
            return stop;
        };
        let block: Vec<usize> = (first..=last).filter_map(|i| self.status.get(i)).collect();
        for e in block {
            self.record(e, *p);
            if self.current[e].hi == *p {
                self.status.remove(e);
                continue;
            }
            if self.current[e].lo != *p {
                self.current[e].lo = *p;
                self.version[e] += 1;
                stop.cut.insert(e);
            }
            stop.through.insert(e);
        }
        let current = &self.current;
        self.status
            .reorder(first..first + stop.through.len(), |a, b| by_direction(current, a, b));
        stop
    }

    /// Inserts edge `e`, which starts at `p`, into the status.
    fn insert_at(&mut self, e: usize, p: &Point2, stop: &Stop) {
        let current = &self.current;
        self.status.insert_by(e, |other, new| {
            if stop.through.contains(&other) {
                by_direction(current, other, new)
            } else if passes_left_of(&current[other], p) {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });
    }

    /// Drops events of pairs that are no longer adjacent, moves the events of
    /// pairs whose edges were cut and schedules the crossings of newly
    /// adjacent pairs.
    fn refresh_events(&mut self, p: &Point2, cut: &HashSet<usize>) {
        let adjacent: Vec<(usize, usize)> = self.status.pairs().collect();
        let current: HashSet<(usize, usize)> = adjacent.iter().copied().collect();
        let queue = &mut self.queue;
        self.pending.retain(|pair, id| {
            if current.contains(pair) {
                true
            } else {
                queue.remove(*id);
                false
            }
        });

        for (a, b) in adjacent {
            let queued = self.pending.get(&(a, b)).copied();
            if queued.is_some() && !cut.contains(&a) && !cut.contains(&b) {
                continue;
            }
            let ahead = match self.test_pair(a, b, p) {
                PairHit::Ahead(q) if sweep_cmp(&q, p) == Ordering::Greater => Some(q),
                _ => None,
            };
            match (queued, ahead) {
                (Some(id), Some(q)) => {
                    let (ta, tb) = (self.param(a, &q), self.param(b, &q));
                    self.queue.relocate(id, q, ta, tb);
                }
                (Some(id), None) => {
                    self.queue.remove(id);
                    self.pending.remove(&(a, b));
                }
                (None, Some(q)) => {
                    let (ta, tb) = (self.param(a, &q), self.param(b, &q));
                    if let Some(id) = self.queue.add(a, b, q, ta, tb) {
                        self.pending.insert((a, b), id);
                    }
                }
                (None, None) => {}
            }
        }
    }

    fn test_pair(&mut self, a: usize, b: usize, p: &Point2) -> PairHit {
        let (a, b) = (a.min(b), a.max(b));
        let key = (a, self.version[a], b, self.version[b]);
        if let Some(hit) = self.tested.get(&key) {
            return *hit;
        }
        let hit = self.intersect(a, b, p);
        self.tested.insert(key, hit);
        hit
    }

    fn intersect(&mut self, a: usize, b: usize, p: &Point2) -> PairHit {
        let (ea, eb) = (self.current[a], self.current[b]);
        if let Some(inside) = collinear_overlap_2d(&ea.lo, &ea.hi, &eb.lo, &eb.hi, self.eps) {
            for (_, q) in inside {
                self.record(a, q);
            }
            for (_, q) in collinear_overlap_2d(&eb.lo, &eb.hi, &ea.lo, &ea.hi, self.eps)
                .unwrap_or_default()
            {
                self.record(b, q);
            }
            return PairHit::Disjoint;
        }

        let Some((q, _, _)) = segment_segment_intersect_2d(&ea.lo, &ea.hi, &eb.lo, &eb.hi) else {
            return PairHit::Disjoint;
        };
        let q = snap_point(&q, self.eps);
        let inner_a = q != ea.lo && q != ea.hi;
        let inner_b = q != eb.lo && q != eb.hi;
        let ahead = sweep_cmp(&q, p) == Ordering::Greater;
        match (inner_a && inner_b, ahead) {
            (true, true) => PairHit::Ahead(q),
            // Endpoint touches ahead are handled when the sweep stops there.
            (false, true) => PairHit::Disjoint,
            (_, false) => {
                if inner_a {
                    self.record(a, q);
                }
                if inner_b {
                    self.record(b, q);
                }
                PairHit::Disjoint
            }
        }
    }

    /// Parameter of `q` projected onto segment `e` in its input direction.
    fn param(&self, e: usize, q: &Point2) -> f64 {
        let (a, b) = self.segments[e];
        let d = b - a;
        let len_sq = d.norm_squared();
        if len_sq == 0.0 {
            return 0.0;
        }
        ((q - a).dot(&d) / len_sq).clamp(0.0, 1.0)
    }

    fn record(&mut self, e: usize, q: Point2) {
        let edge = self.input[e];
        if q == edge.lo || q == edge.hi || self.report.splits[e].iter().any(|s| s.point == q) {
            return;
        }
        let t = self.param(e, &q);
        self.report.splits[e].push(SplitPoint { t, point: q });
    }
}

/// Returns whether `edge` lies left of the point `p` on the sweep line,
/// i.e. `p` is on the right of the edge walked upwards.
fn passes_left_of(edge: &Oriented, p: &Point2) -> bool {
    cross(&(edge.hi - edge.lo), &(p - edge.lo)) < 0.0
}

/// Left-to-right order of two edges leaving the same sweep point: by inverse
/// slope `dx/dy`, with horizontal edges last.
fn by_direction(edges: &[Oriented], a: usize, b: usize) -> Ordering {
    let inverse_slope = |edge: &Oriented| {
        let dy = edge.hi.y - edge.lo.y;
        if dy == 0.0 {
            f64::INFINITY
        } else {
            (edge.hi.x - edge.lo.x) / dy
        }
    };
    inverse_slope(&edges[a])
        .total_cmp(&inverse_slope(&edges[b]))
        .then(a.cmp(&b))
}
