//! Axis-aligned growth directions.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Coordinate axis of a [`Direction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis (east/west).
    X,
    /// Y axis (up/down).
    Y,
    /// Z axis (north/south).
    Z,
}

/// One of the six unit steps a pipe can take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// -Z
    North = 0,
    /// +Z
    South = 1,
    /// +X
    East = 2,
    /// -X
    West = 3,
    /// +Y
    Up = 4,
    /// -Y
    Down = 5,
}

impl Direction {
    /// All six directions.
    pub const ALL: [Self; 6] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::Up,
        Self::Down,
    ];

    /// Draws a direction uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Returns the axis this direction moves along.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::Z,
            Self::East | Self::West => Axis::X,
            Self::Up | Self::Down => Axis::Y,
        }
    }

    /// Integer step `(dx, dy, dz)`.
    #[must_use]
    pub const fn offset(self) -> [i64; 3] {
        match self {
            Self::North => [0, 0, -1],
            Self::South => [0, 0, 1],
            Self::East => [1, 0, 0],
            Self::West => [-1, 0, 0],
            Self::Up => [0, 1, 0],
            Self::Down => [0, -1, 0],
        }
    }

    /// Unit vector for rendering.
    #[must_use]
    pub fn unit_vector(self) -> [f32; 3] {
        let [x, y, z] = self.offset();
        [x as f32, y as f32, z as f32]
    }
}
