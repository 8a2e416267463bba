//! Rings of grid cells at a fixed distance from a center cell.
//!
//! Ring `r` contains exactly the integer offsets `(dx, dy)` with
//! `r² ≤ dx² + dy² < (r+1)²`. Rings for consecutive radii partition the
//! plane, so visiting them in order visits cells in non-decreasing distance
//! (up to one cell of slack inside a ring). A nearest-obstacle search can
//! stop at the first ring that contains an occupied cell.
//!
//! ```text
//!  r = 0      r = 1        r = 2
//!              . # .      . # # # .
//!    #         # . #      # . . . #
//!              . # .      # . . . #
//!                         # . . . #
//!                         . # # # .
//! ```

use std::borrow::Cow;

use super::{GridCoord, OccupancyGrid};

/// Radius up to which rings are precomputed by default.
const DEFAULT_CACHED_RADIUS: u32 = 32;

/// Enumerates the discrete ring of cells at a given distance.
///
/// Rings up to `cached_radius` are computed once at construction; larger
/// rings are generated on demand.
#[derive(Debug, Clone)]
pub struct GridCircleFringeGenerator {
    rings: Vec<Vec<GridCoord>>,
}

impl Default for GridCircleFringeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl GridCircleFringeGenerator {
    /// Create a generator with the default ring cache.
    pub fn new() -> Self {
        Self::with_cached_radius(DEFAULT_CACHED_RADIUS)
    }

    /// Create a generator that precomputes rings `0..=cached_radius`.
    pub fn with_cached_radius(cached_radius: u32) -> Self {
        Self {
            rings: (0..=cached_radius).map(ring_offsets).collect(),
        }
    }

    /// Largest radius served from the cache.
    pub fn cached_radius(&self) -> u32 {
        self.rings.len().saturating_sub(1) as u32
    }

    /// Offsets of the ring at `radius`.
    pub fn fringe(&self, radius: u32) -> Vec<GridCoord> {
        self.ring(radius).into_owned()
    }

    /// Offsets of the ring at `radius`, borrowed from the cache when possible.
    pub fn ring(&self, radius: u32) -> Cow<'_, [GridCoord]> {
        match self.rings.get(radius as usize) {
            Some(ring) => Cow::Borrowed(ring.as_slice()),
            None => Cow::Owned(ring_offsets(radius)),
        }
    }

    /// Absolute cells of the ring at `radius` around `center`, restricted to
    /// cells the map covers.
    ///
    /// `center` must lie on the map. An empty result then means the ring
    /// lies entirely outside the grid.
    pub fn fringe_in_map<'a>(
        &'a self,
        center: GridCoord,
        radius: u32,
        map: &'a OccupancyGrid,
    ) -> impl Iterator<Item = GridCoord> + 'a {
        let ring = self.ring(radius);
        (0..ring.len())
            .map(move |i| center + ring[i])
            .filter(move |&cell| map.covers_cell(cell))
    }

    /// Largest ring radius around `center` that can still contain map cells.
    pub fn max_radius(center: GridCoord, map: &OccupancyGrid) -> u32 {
        let (w, h) = map.size_in_cells();
        let dx = (center.x as i64).abs().max((w as i64 - 1 - center.x as i64).abs());
        let dy = (center.y as i64).abs().max((h as i64 - 1 - center.y as i64).abs());
        let dist_sq = (dx * dx + dy * dy) as u64;
        isqrt(dist_sq) as u32
    }
}

/// Compute the ring offsets for one radius.
///
/// For each column `dx` with `|dx| ≤ r`, the valid `|dy|` lie between the
/// inner circle (`dy² ≥ r² − dx²`) and the outer circle
/// (`dy² < (r+1)² − dx²`); the lower half is the mirror across `y = 0`.
fn ring_offsets(radius: u32) -> Vec<GridCoord> {
    let r = radius as i64;
    let inner_sq = r * r;
    let outer_sq = (r + 1) * (r + 1);
    let mut offsets = Vec::with_capacity((8 * r + 4) as usize);

    for dx in -r..=r {
        let dx_sq = dx * dx;
        let y_min = ceil_sqrt((inner_sq - dx_sq).max(0) as u64) as i64;
        let y_max = isqrt((outer_sq - dx_sq - 1) as u64) as i64;

        for dy in y_min..=y_max {
            offsets.push(GridCoord::new(dx as i32, dy as i32));
            if dy != 0 {
                offsets.push(GridCoord::new(dx as i32, -dy as i32));
            }
        }
    }

    offsets
}

/// Floor of the integer square root.
fn isqrt(n: u64) -> u64 {
    let mut x = (n as f64).sqrt() as u64;
    while x * x > n {
        x -= 1;
    }
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}

/// Ceiling of the integer square root.
fn ceil_sqrt(n: u64) -> u64 {
    let x = isqrt(n);
    if x * x == n { x } else { x + 1 }
}
