use std::cmp::Ordering;
use std::ops::Range;

/// Ordered set of the edges currently crossing the sweep line, left to right.
///
/// The ordering itself is supplied by the caller at each event, since edge
/// positions are only comparable relative to the current sweep point.
#[derive(Debug, Default)]
pub struct SweepStatus {
    entries: Vec<usize>,
}

impl SweepStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `edge`, if active.
    #[must_use]
    pub fn position(&self, edge: usize) -> Option<usize> {
        self.entries.iter().position(|&e| e == edge)
    }

    /// Edge at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.entries.get(position).copied()
    }

    /// Inserts `edge` before the first entry that orders after it.
    pub fn insert_by<F>(&mut self, edge: usize, mut cmp: F) -> usize
    where
        F: FnMut(usize, usize) -> Ordering,
    {
        let position = self
            .entries
            .partition_point(|&other| cmp(other, edge) != Ordering::Greater);
        self.entries.insert(position, edge);
        position
    }

    /// Removes `edge`, returning its former position.
    pub fn remove(&mut self, edge: usize) -> Option<usize> {
        let position = self.position(edge)?;
        self.entries.remove(position);
        Some(position)
    }

    /// Swaps the entry at `position` with its right neighbor.
    pub fn swap_with_right(&mut self, position: usize) -> bool {
        if position + 1 >= self.entries.len() {
            return false;
        }
        self.entries.swap(position, position + 1);
        true
    }

    /// Sorts the entries in `range` by adjacent swaps, leaving the rest of
    /// the structure untouched.
    ///
    /// Returns the number of swaps performed; each swap marks a crossing of
    /// the two edges involved.
    pub fn reorder<F>(&mut self, range: Range<usize>, mut cmp: F) -> usize
    where
        F: FnMut(usize, usize) -> Ordering,
    {
        let end = range.end.min(self.entries.len());
        let mut swaps = 0;
        for i in range.start + 1..end {
            let mut j = i;
            while j > range.start && cmp(self.entries[j - 1], self.entries[j]) == Ordering::Greater {
                self.swap_with_right(j - 1);
                swaps += 1;
                j -= 1;
            }
        }
        swaps
    }

    /// Adjacent `(left, right)` pairs from left to right.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.windows(2).map(|w| (w[0], w[1]))
    }

    /// Active edges from left to right.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }
}
