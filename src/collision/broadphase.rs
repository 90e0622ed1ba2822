use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::arena::Handle;
use crate::geometry::Rect;

/// Which broad phase a [`super::CollisionWorld`] builds from config.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadPhaseKind {
    BruteForce,
    #[default]
    SpatialHash,
}

/// A collider's bounds as seen by the broad phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Proxy {
    pub handle: Handle,
    pub bounds: Rect,
}

/// Cheaply narrows all collider pairs down to those whose bounds overlap.
pub trait BroadPhase {
    /// Pairs `(lo, hi)` with `lo < hi` and overlapping bounds, sorted and
    /// free of duplicates.
    fn candidate_pairs(&mut self, proxies: &[Proxy]) -> Vec<(Handle, Handle)>;
}

fn ordered(a: Handle, b: Handle) -> (Handle, Handle) {
    if a < b { (a, b) } else { (b, a) }
}

// ── BruteForce ──────────────────────────────────────────────────────────────

/// Tests every pair. Reference implementation for small scenes and tests.
#[derive(Debug, Default)]
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn candidate_pairs(&mut self, proxies: &[Proxy]) -> Vec<(Handle, Handle)> {
        let mut pairs = Vec::new();
        for (i, a) in proxies.iter().enumerate() {
            for b in &proxies[i + 1..] {
                if a.bounds.intersects(&b.bounds) {
                    pairs.push(ordered(a.handle, b.handle));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

// ── SpatialHash ─────────────────────────────────────────────────────────────

/// Proxies spanning more cells than this skip the grid and are tested
/// against every other proxy instead.
const MAX_CELLS_PER_PROXY: i64 = 64;

/// Uniform grid keyed by cell coordinate. Only proxies sharing a cell are
/// tested against each other.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    oversized: Vec<usize>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            log::warn!("spatial hash: invalid cell size {cell_size}; using 64");
            64.0
        };
        Self { cell_size, cells: HashMap::new(), oversized: Vec::new() }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_range(&self, r: &Rect) -> (i32, i32, i32, i32) {
        let cs = self.cell_size;
        (
            (r.x / cs).floor() as i32,
            (r.y / cs).floor() as i32,
            (r.right() / cs).floor() as i32,
            (r.bottom() / cs).floor() as i32,
        )
    }
}

impl BroadPhase for SpatialHash {
    fn candidate_pairs(&mut self, proxies: &[Proxy]) -> Vec<(Handle, Handle)> {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.oversized.clear();

        for (i, p) in proxies.iter().enumerate() {
            let (x0, y0, x1, y1) = self.cell_range(&p.bounds);
            let covered = (i64::from(x1) - i64::from(x0) + 1) * (i64::from(y1) - i64::from(y0) + 1);
            if covered > MAX_CELLS_PER_PROXY {
                self.oversized.push(i);
                continue;
            }
            for cy in y0..=y1 {
                for cx in x0..=x1 {
                    self.cells.entry((cx, cy)).or_default().push(i);
                }
            }
        }

        let mut pairs = Vec::new();
        for bucket in self.cells.values() {
            for (n, &i) in bucket.iter().enumerate() {
                for &j in &bucket[n + 1..] {
                    if proxies[i].bounds.intersects(&proxies[j].bounds) {
                        pairs.push(ordered(proxies[i].handle, proxies[j].handle));
                    }
                }
            }
        }
        for &i in &self.oversized {
            for (j, other) in proxies.iter().enumerate() {
                if j != i && proxies[i].bounds.intersects(&other.bounds) {
                    pairs.push(ordered(proxies[i].handle, other.handle));
                }
            }
        }
        // Proxies land in several cells, and oversized pairs are seen twice.
        // Drop the repeats.
        pairs.sort_unstable();
        pairs.dedup();

        // Forget buckets that went empty so the map does not grow forever.
        self.cells.retain(|_, bucket| !bucket.is_empty());
        pairs
    }
}

pub fn from_kind(kind: BroadPhaseKind, cell_size: f32) -> Box<dyn BroadPhase> {
    match kind {
        BroadPhaseKind::BruteForce => Box::new(BruteForce),
        BroadPhaseKind::SpatialHash => Box::new(SpatialHash::new(cell_size)),
    }
}
