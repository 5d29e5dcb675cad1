use std::collections::{BTreeMap, BTreeSet};

use crate::grid::ChunkCoord;

/// What one [`ChunkWindow::update`] changed.
#[derive(Debug)]
pub struct WindowDiff<C> {
    pub loaded: Vec<ChunkCoord>,
    /// Chunks that left the window, handed back for disposal.
    pub evicted: Vec<(ChunkCoord, C)>,
    /// Chunks inside the window still waiting for load budget.
    pub pending: usize,
}

impl<C> WindowDiff<C> {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.evicted.is_empty()
    }
}

/// Sparse map of live chunks around a moving center.
///
/// Each update recomputes the desired set (every coordinate within the
/// Chebyshev radius of the center), evicts every existing key outside it,
/// and builds missing chunks nearest-first up to the load budget.
#[derive(Debug)]
pub struct ChunkWindow<C> {
    radius: i32,
    load_budget: usize,
    center: Option<ChunkCoord>,
    chunks: BTreeMap<ChunkCoord, C>,
}

impl<C> ChunkWindow<C> {
    pub fn new(radius: i32, load_budget: usize) -> Self {
        assert!(radius >= 0, "window radius must not be negative");
        assert!(load_budget > 0, "load budget must be positive");
        Self {
            radius,
            load_budget,
            center: None,
            chunks: BTreeMap::new(),
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    pub fn update(
        &mut self,
        center: ChunkCoord,
        mut build: impl FnMut(ChunkCoord) -> C,
    ) -> WindowDiff<C> {
        let _span = tracing::info_span!("chunk_window_update").entered();
        self.center = Some(center);
        let desired: BTreeSet<ChunkCoord> = center.square(self.radius).collect();

        let stale: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|c| !desired.contains(c))
            .copied()
            .collect();
        let mut evicted = Vec::with_capacity(stale.len());
        for coord in stale {
            if let Some(chunk) = self.chunks.remove(&coord) {
                tracing::debug!(x = coord.x, z = coord.z, "evicting chunk");
                evicted.push((coord, chunk));
            }
        }

        let mut missing: Vec<ChunkCoord> = desired
            .into_iter()
            .filter(|c| !self.chunks.contains_key(c))
            .collect();
        missing.sort_by_key(|c| (c.chebyshev(center), *c));

        let take = missing.len().min(self.load_budget);
        let mut loaded = Vec::with_capacity(take);
        for coord in missing.iter().take(take) {
            tracing::debug!(x = coord.x, z = coord.z, "loading chunk");
            self.chunks.insert(*coord, build(*coord));
            loaded.push(*coord);
        }

        tracing::trace!(
            loaded = loaded.len(),
            evicted = evicted.len(),
            live = self.chunks.len(),
            "chunk window updated"
        );
        WindowDiff {
            loaded,
            evicted,
            pending: missing.len() - take,
        }
    }

    /// Drop every chunk, returning them for disposal.
    pub fn clear(&mut self) -> Vec<(ChunkCoord, C)> {
        self.center = None;
        std::mem::take(&mut self.chunks).into_iter().collect()
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&C> {
        self.chunks.get(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &C)> {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_square_around_center() {
        let mut w: ChunkWindow<u32> = ChunkWindow::new(2, 100);
        let diff = w.update(ChunkCoord::new(0, 0), |_| 0);
        assert_eq!(diff.loaded.len(), 25);
        assert!(diff.evicted.is_empty());
        assert_eq!(w.len(), 25);
    }

    #[test]
    fn stable_center_is_a_no_op() {
        let mut w: ChunkWindow<u32> = ChunkWindow::new(1, 100);
        w.update(ChunkCoord::new(0, 0), |_| 0);
        let mut builds = 0;
        let diff = w.update(ChunkCoord::new(0, 0), |_| {
            builds += 1;
            0
        });
        assert!(diff.is_empty());
        assert_eq!(builds, 0);
    }

    #[test]
    fn moving_center_evicts_trailing_row() {
        let mut w: ChunkWindow<ChunkCoord> = ChunkWindow::new(1, 100);
        w.update(ChunkCoord::new(0, 0), |c| c);
        let diff = w.update(ChunkCoord::new(0, -1), |c| c);
        assert_eq!(diff.loaded.len(), 3);
        assert_eq!(diff.evicted.len(), 3);
        assert!(diff.evicted.iter().all(|(c, chunk)| c.z == 1 && c == chunk));
        assert!(
            w.iter()
                .all(|(c, _)| c.chebyshev(ChunkCoord::new(0, -1)) <= 1)
        );
    }

    #[test]
    fn budget_defers_far_chunks() {
        let mut w: ChunkWindow<()> = ChunkWindow::new(2, 9);
        let center = ChunkCoord::new(5, 5);
        let diff = w.update(center, |_| ());
        assert_eq!(diff.loaded.len(), 9);
        assert_eq!(diff.pending, 16);
        // Nearest ring first.
        assert!(diff.loaded.iter().all(|c| c.chebyshev(center) <= 1));

        let diff = w.update(center, |_| ());
        assert_eq!(diff.loaded.len(), 9);
        let diff = w.update(center, |_| ());
        assert_eq!(diff.loaded.len(), 7);
        assert_eq!(diff.pending, 0);
        assert_eq!(w.len(), 25);
    }

    #[test]
    fn evicted_chunks_rebuild_identically() {
        let build = |c: ChunkCoord| crate::hash01(c.x, c.z, 3);
        let mut w = ChunkWindow::new(0, 1);
        w.update(ChunkCoord::new(0, 0), build);
        let first = *w.get(ChunkCoord::new(0, 0)).unwrap();
        w.update(ChunkCoord::new(10, 0), build);
        assert!(!w.contains(ChunkCoord::new(0, 0)));
        w.update(ChunkCoord::new(0, 0), build);
        assert_eq!(w.get(ChunkCoord::new(0, 0)), Some(&first));
    }

    #[test]
    fn clear_returns_everything() {
        let mut w: ChunkWindow<()> = ChunkWindow::new(1, 100);
        w.update(ChunkCoord::new(0, 0), |_| ());
        assert_eq!(w.clear().len(), 9);
        assert!(w.is_empty());
        assert_eq!(w.center(), None);
    }
}
