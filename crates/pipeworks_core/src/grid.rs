//! # Occupancy Grid
//!
//! Dense 3D claim map for the growth simulation.
//!
//! ## Layout
//!
//! ```text
//! index = z * (X * Y) + y * X + x
//!
//! occupied:  [word 0][word 1] ... one bit per voxel, 1 = claimed
//! free:      [word 0][word 1] ... negation of `occupied`, padding bits = 0
//! ```
//!
//! The free bitmap answers "is any voxel in these 64 free?" with a single
//! compare, which keeps random free-slot selection at O(words).
//!
//! Claims are permanent. Nothing is ever released.

use bytemuck::{Pod, Zeroable};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{SimError, SimResult};

/// Bits per bitmap word.
const WORD_BITS: usize = 64;

/// Largest grid volume accepted. Both bitmaps together stay at 256 MiB.
pub const MAX_VOXELS: u64 = 1 << 30;

/// Integer voxel coordinate inside the grid.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Voxel {
    /// X component
    pub x: u32,
    /// Y component
    pub y: u32,
    /// Z component
    pub z: u32,
}

impl Voxel {
    /// Creates a new voxel coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Voxel center in world units (one unit per voxel).
    #[inline]
    #[must_use]
    pub fn center(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

/// Extent of the grid along each axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridBounds {
    x: u32,
    y: u32,
    z: u32,
}

impl GridBounds {
    /// Creates bounds, rejecting zero axes and volumes above [`MAX_VOXELS`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBounds`] for a zero axis or an oversized volume.
    pub fn new(x: u32, y: u32, z: u32) -> SimResult<Self> {
        let invalid = SimError::InvalidBounds { x, y, z };
        if x == 0 || y == 0 || z == 0 {
            return Err(invalid);
        }
        let volume = u64::from(x)
            .checked_mul(u64::from(y))
            .and_then(|xy| xy.checked_mul(u64::from(z)))
            .filter(|&volume| volume <= MAX_VOXELS)
            .ok_or_else(|| invalid.clone())?;
        usize::try_from(volume).map_err(|_| invalid)?;
        Ok(Self { x, y, z })
    }

    /// Extent along X.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Extent along Y.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Extent along Z.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Total voxel count.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Returns true if the signed coordinate lies inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        (0..i64::from(self.x)).contains(&x)
            && (0..i64::from(self.y)).contains(&y)
            && (0..i64::from(self.z)).contains(&z)
    }
}

/// Voxel claim map with a free-bit index for randomized selection.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    bounds: GridBounds,
    /// One bit per voxel, set = claimed.
    occupied: Vec<u64>,
    /// One bit per voxel, set = free. Padding bits are always clear.
    free: Vec<u64>,
    /// Number of claimed voxels.
    used: usize,
}

impl OccupancyGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        let total = bounds.total();
        let words = total.div_ceil(WORD_BITS);

        let mut free = vec![u64::MAX; words];
        let leftover = words * WORD_BITS - total;
        if leftover > 0 {
            if let Some(last) = free.last_mut() {
                let keep_bits = WORD_BITS - leftover;
                *last &= (1u64 << keep_bits) - 1;
            }
        }

        Self {
            bounds,
            occupied: vec![0; words],
            free,
            used: 0,
        }
    }

    /// Grid bounds.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Number of claimed voxels.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Total voxel count.
    #[inline]
    #[must_use]
    pub const fn total_voxels(&self) -> usize {
        self.bounds.total()
    }

    /// Number of unclaimed voxels.
    #[inline]
    #[must_use]
    pub const fn free_voxels(&self) -> usize {
        self.total_voxels() - self.used
    }

    /// Fraction of voxels claimed, in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        self.used as f64 / self.total_voxels() as f64
    }

    /// Returns true once every voxel is claimed.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.used == self.total_voxels()
    }

    /// Linear index of an in-bounds voxel.
    #[inline]
    #[must_use]
    pub fn index_of(&self, voxel: Voxel) -> usize {
        let x = self.bounds.x as usize;
        let y = self.bounds.y as usize;
        voxel.z as usize * (x * y) + voxel.y as usize * x + voxel.x as usize
    }

    /// Voxel at a linear index.
    #[inline]
    #[must_use]
    pub fn voxel_at(&self, index: usize) -> Voxel {
        let x = self.bounds.x as usize;
        let plane = x * self.bounds.y as usize;
        let z = index / plane;
        let rem = index % plane;
        // Each component is bounded by its axis extent, which is a u32.
        Voxel::new((rem % x) as u32, (rem / x) as u32, z as u32)
    }

    /// Returns true if the signed coordinate lies inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        self.bounds.contains(x, y, z)
    }

    /// Steps one voxel in `dir`, or `None` if that leaves the grid.
    #[must_use]
    pub fn step(&self, voxel: Voxel, dir: Direction) -> Option<Voxel> {
        let [dx, dy, dz] = dir.offset();
        let x = i64::from(voxel.x) + dx;
        let y = i64::from(voxel.y) + dy;
        let z = i64::from(voxel.z) + dz;
        if !self.contains(x, y, z) {
            return None;
        }
        // In-bounds coordinates are non-negative and below a u32 extent.
        Some(Voxel::new(x as u32, y as u32, z as u32))
    }

    /// Returns true if the voxel has been claimed.
    ///
    /// The caller guarantees `voxel` is in bounds.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, voxel: Voxel) -> bool {
        debug_assert!(
            self.contains(i64::from(voxel.x), i64::from(voxel.y), i64::from(voxel.z)),
            "voxel {voxel:?} out of bounds"
        );
        let index = self.index_of(voxel);
        self.occupied[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Claims a voxel.
    ///
    /// Claiming the same voxel twice violates the grid's bookkeeping; the caller must
    /// check [`is_occupied`](Self::is_occupied) first.
    pub fn claim(&mut self, voxel: Voxel) {
        let index = self.index_of(voxel);
        self.claim_index(index);
    }

    fn claim_index(&mut self, index: usize) {
        let word = index / WORD_BITS;
        let bit = 1u64 << (index % WORD_BITS);
        debug_assert!(self.occupied[word] & bit == 0, "voxel index {index} claimed twice");

        self.occupied[word] |= bit;
        self.free[word] &= !bit;
        self.used += 1;
    }

    /// Picks a free voxel at random and claims it.
    ///
    /// Two-stage search: the free-bitmap words are visited in shuffled order, and in
    /// the first non-empty word the 64 bit positions are visited in shuffled order.
    /// Every word is equally likely regardless of how many free voxels it holds, so
    /// the result is not uniform per voxel.
    ///
    /// Returns `None` only when the grid is full.
    pub fn take_random_free<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Voxel> {
        let mut word_order: Vec<usize> = (0..self.free.len()).collect();
        word_order.shuffle(rng);
        let word_index = word_order.into_iter().find(|&w| self.free[w] != 0)?;
        let word = self.free[word_index];

        let mut bit_order: [u32; WORD_BITS] = std::array::from_fn(|i| i as u32);
        bit_order.shuffle(rng);
        let bit = bit_order.into_iter().find(|&b| word & (1u64 << b) != 0)?;

        let index = word_index * WORD_BITS + bit as usize;
        self.claim_index(index);
        Some(self.voxel_at(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn grid(x: u32, y: u32, z: u32) -> OccupancyGrid {
        OccupancyGrid::new(GridBounds::new(x, y, z).unwrap())
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(GridBounds::new(0, 4, 4).is_err());
        assert!(GridBounds::new(4, 0, 4).is_err());
        assert!(GridBounds::new(4, 4, 0).is_err());
        assert!(GridBounds::new(u32::MAX, u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn test_oversized_volume_rejected() {
        assert_eq!(
            GridBounds::new(1 << 20, 1 << 20, 1),
            Err(SimError::InvalidBounds {
                x: 1 << 20,
                y: 1 << 20,
                z: 1,
            })
        );
        assert!(GridBounds::new(1 << 10, 1 << 10, 1 << 10).is_ok());
        assert!(GridBounds::new(1 << 10, 1 << 10, (1 << 10) + 1).is_err());
    }

    #[test]
    fn test_index_round_trip() {
        let g = grid(3, 4, 5);
        for i in 0..g.total_voxels() {
            let v = g.voxel_at(i);
            assert!(v.x < 3 && v.y < 4 && v.z < 5);
            assert_eq!(g.index_of(v), i);
        }
    }

    #[test]
    fn test_padding_bits_cleared() {
        let g = grid(5, 5, 5); // 125 voxels, 2 words, 3 padding bits
        assert_eq!(g.free.len(), 2);
        assert_eq!(g.free[1].count_ones(), 125 - 64);
        let total_free: u32 = g.free.iter().map(|w| w.count_ones()).sum();
        assert_eq!(total_free as usize, g.total_voxels());
    }

    #[test]
    fn test_exact_word_has_no_padding() {
        let g = grid(4, 4, 4);
        assert_eq!(g.free, vec![u64::MAX]);
    }

    #[test]
    fn test_claim_updates_both_maps() {
        let mut g = grid(4, 4, 4);
        let v = Voxel::new(1, 2, 3);
        assert!(!g.is_occupied(v));

        g.claim(v);

        assert!(g.is_occupied(v));
        assert_eq!(g.used(), 1);
        let index = g.index_of(v);
        assert_eq!(g.free[index / 64] & (1 << (index % 64)), 0);
    }

    #[test]
    fn test_disjoint_claims_count_and_are_never_returned() {
        let mut g = grid(6, 6, 6);
        let mut claimed = HashSet::new();
        for i in 0..50u32 {
            let v = Voxel::new(i % 6, (i / 6) % 6, i / 36);
            g.claim(v);
            claimed.insert(v);
        }
        assert_eq!(g.used(), 50);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        while let Some(v) = g.take_random_free(&mut rng) {
            assert!(!claimed.contains(&v), "returned claimed voxel {v:?}");
        }
        assert!(g.is_full());
    }

    #[test]
    fn test_two_by_two_by_two_exhaustion() {
        let mut g = grid(2, 2, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let mut seen = HashSet::new();

        for _ in 0..8 {
            let v = g.take_random_free(&mut rng).expect("grid not yet full");
            assert!(v.x < 2 && v.y < 2 && v.z < 2);
            assert!(seen.insert(v), "duplicate voxel {v:?}");
        }

        assert_eq!(seen.len(), 8);
        assert_eq!(g.take_random_free(&mut rng), None);
        assert_eq!(g.used(), 8);
    }

    #[test]
    fn test_step_respects_bounds() {
        let g = grid(2, 2, 2);
        let origin = Voxel::new(0, 0, 0);
        assert_eq!(g.step(origin, Direction::West), None);
        assert_eq!(g.step(origin, Direction::Down), None);
        assert_eq!(g.step(origin, Direction::North), None);
        assert_eq!(g.step(origin, Direction::East), Some(Voxel::new(1, 0, 0)));
        assert_eq!(g.step(origin, Direction::Up), Some(Voxel::new(0, 1, 0)));
        assert_eq!(g.step(origin, Direction::South), Some(Voxel::new(0, 0, 1)));
    }

    #[test]
    fn test_fill_ratio() {
        let mut g = grid(2, 2, 1);
        assert!(g.fill_ratio().abs() < f64::EPSILON);
        g.claim(Voxel::new(0, 0, 0));
        assert!((g.fill_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
