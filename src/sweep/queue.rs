use std::cmp::Ordering;

use crate::math::{sweep_cmp, Point2};

/// Stable handle of an event stored in a [`SweepEventQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(usize);

/// An intersection candidate between two active edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepEvent {
    pub point: Point2,
    pub left: usize,
    pub right: usize,
    /// Parameter of `point` on the left edge.
    pub t_left: f64,
    /// Parameter of `point` on the right edge.
    pub t_right: f64,
}

const VACANT: usize = usize::MAX;

/// Fixed-capacity indexed binary min-heap of sweep events.
///
/// Events live in a slot table addressed by [`EventId`]; the heap stores slot
/// numbers and `position` maps each slot back to its heap index, so that
/// arbitrary events can be removed or re-keyed in logarithmic time.
///
/// Events are ordered by their point in sweep order (`y`, then `x`). Events
/// at the same point compare equal.
#[derive(Debug)]
pub struct SweepEventQueue {
    slots: Vec<Option<SweepEvent>>,
    heap: Vec<usize>,
    position: Vec<usize>,
    free: Vec<usize>,
    capacity: usize,
    overflowed: bool,
}

impl SweepEventQueue {
    /// Creates an empty queue able to hold `capacity` events at once.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            heap: Vec::with_capacity(capacity),
            position: Vec::with_capacity(capacity),
            free: Vec::new(),
            capacity,
            overflowed: false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns whether an [`add`](Self::add) was dropped because the queue was full.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Inserts a new event.
    ///
    /// When the queue is full the event is dropped, `None` is returned and
    /// the overflow flag is raised.
    pub fn add(
        &mut self,
        left: usize,
        right: usize,
        point: Point2,
        t_left: f64,
        t_right: f64,
    ) -> Option<EventId> {
        if self.heap.len() >= self.capacity {
            self.overflowed = true;
            return None;
        }
        let event = SweepEvent {
            point,
            left,
            right,
            t_left,
            t_right,
        };
        let slot = if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(event);
            slot
        } else {
            self.slots.push(Some(event));
            self.position.push(VACANT);
            self.slots.len() - 1
        };
        let index = self.heap.len();
        self.heap.push(slot);
        self.position[slot] = index;
        self.sift_up(index);
        Some(EventId(slot))
    }

    /// Returns the lowest event without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&SweepEvent> {
        let slot = *self.heap.first()?;
        self.slots[slot].as_ref()
    }

    /// Returns the event stored under `id`, if it is still queued.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&SweepEvent> {
        self.slots.get(id.0)?.as_ref()
    }

    /// Removes and returns the lowest event.
    pub fn extract(&mut self) -> Option<SweepEvent> {
        let slot = *self.heap.first()?;
        self.remove(EventId(slot))
    }

    /// Removes an arbitrary event, returning it if it was still queued.
    pub fn remove(&mut self, id: EventId) -> Option<SweepEvent> {
        let slot = id.0;
        let event = self.slots.get_mut(slot)?.take()?;
        let index = self.position[slot];
        let last = self.heap.len() - 1;
        self.swap_heap(index, last);
        self.heap.pop();
        self.position[slot] = VACANT;
        self.free.push(slot);
        if index < self.heap.len() {
            self.sift_down(index);
            self.sift_up(index);
        }
        Some(event)
    }

    /// Moves an event to a new point and restores heap order.
    ///
    /// Returns `false` if the event is no longer queued.
    pub fn relocate(&mut self, id: EventId, point: Point2, t_left: f64, t_right: f64) -> bool {
        let Some(Some(event)) = self.slots.get_mut(id.0) else {
            return false;
        };
        event.point = point;
        event.t_left = t_left;
        event.t_right = t_right;
        let index = self.position[id.0];
        self.sift_down(index);
        self.sift_up(index);
        true
    }

    /// Removes every queued event whose point equals `point`.
    pub fn extract_at(&mut self, point: &Point2) -> Vec<SweepEvent> {
        let mut out = Vec::new();
        while self
            .peek()
            .is_some_and(|e| sweep_cmp(&e.point, point) == Ordering::Equal)
        {
            if let Some(e) = self.extract() {
                out.push(e);
            }
        }
        out
    }

    fn key(&self, index: usize) -> Option<&Point2> {
        self.slots[self.heap[index]].as_ref().map(|e| &e.point)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        match (self.key(a), self.key(b)) {
            (Some(pa), Some(pb)) => sweep_cmp(pa, pb) == Ordering::Less,
            _ => false,
        }
    }

    fn swap_heap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = a;
        self.position[self.heap[b]] = b;
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if !self.less(index, parent) {
                break;
            }
            self.swap_heap(index, parent);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            let right = left + 1;
            let mut smallest = index;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == index {
                break;
            }
            self.swap_heap(index, smallest);
            index = smallest;
        }
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        let order = (1..self.heap.len()).all(|i| !self.less(i, (i - 1) / 2));
        let index = self
            .heap
            .iter()
            .enumerate()
            .all(|(i, &slot)| self.position[slot] == i && self.slots[slot].is_some());
        order && index
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn extracts_in_sweep_order() {
        let mut q = SweepEventQueue::with_capacity(8);
        q.add(0, 1, p(0.0, 3.0), 0.0, 0.0);
        q.add(0, 1, p(5.0, 1.0), 0.0, 0.0);
        q.add(0, 1, p(2.0, 1.0), 0.0, 0.0);
        q.add(0, 1, p(-1.0, 2.0), 0.0, 0.0);
        assert!(q.is_consistent());
        let order: Vec<_> = std::iter::from_fn(|| q.extract()).map(|e| e.point).collect();
        assert_eq!(order, vec![p(2.0, 1.0), p(5.0, 1.0), p(-1.0, 2.0), p(0.0, 3.0)]);
    }

    #[test]
    fn add_at_capacity_is_dropped() {
        let mut q = SweepEventQueue::with_capacity(1);
        assert!(q.add(0, 1, p(0.0, 0.0), 0.0, 0.0).is_some());
        assert!(!q.overflowed());
        assert!(q.add(1, 2, p(1.0, 0.0), 0.0, 0.0).is_none());
        assert!(q.overflowed());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn remove_arbitrary_keeps_heap_valid() {
        let mut q = SweepEventQueue::with_capacity(16);
        let ys = [0.0, 7.0, 4.0, 1.0, 8.0, 5.0, 2.0, 9.0, 6.0, 3.0];
        let ids: Vec<_> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| q.add(i, i + 1, p(0.0, y), 0.0, 0.0).unwrap())
            .collect();
        let removed = q.remove(ids[3]).unwrap();
        assert_eq!(removed.left, 3);
        assert!(q.remove(ids[3]).is_none());
        assert!(q.get(ids[3]).is_none());
        assert!(q.is_consistent());
        assert_eq!(q.len(), 9);
        let mut prev = f64::NEG_INFINITY;
        while let Some(e) = q.extract() {
            assert!(e.point.y >= prev);
            prev = e.point.y;
        }
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut q = SweepEventQueue::with_capacity(2);
        let a = q.add(0, 1, p(0.0, 0.0), 0.0, 0.0).unwrap();
        q.remove(a);
        let b = q.add(2, 3, p(1.0, 1.0), 0.0, 0.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(q.get(b).unwrap().left, 2);
    }

    #[test]
    fn relocate_reorders() {
        let mut q = SweepEventQueue::with_capacity(4);
        q.add(0, 1, p(0.0, 1.0), 0.0, 0.0);
        let late = q.add(2, 3, p(0.0, 5.0), 0.0, 0.0).unwrap();
        assert!(q.relocate(late, p(0.0, 0.5), 0.25, 0.75));
        assert!(q.is_consistent());
        let first = q.peek().unwrap();
        assert_eq!(first.left, 2);
        assert!((first.t_left - 0.25).abs() < 1e-12);
    }

    #[test]
    fn coincident_events_extract_together() {
        let mut q = SweepEventQueue::with_capacity(4);
        q.add(0, 1, p(1.0, 1.0), 0.0, 0.0);
        q.add(2, 3, p(1.0, 1.0), 0.0, 0.0);
        q.add(4, 5, p(2.0, 1.0), 0.0, 0.0);
        let at = q.extract_at(&p(1.0, 1.0));
        assert_eq!(at.len(), 2);
        assert_eq!(q.len(), 1);
    }
}
