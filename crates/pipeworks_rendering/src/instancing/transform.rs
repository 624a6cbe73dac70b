//! Per-instance placement matrices.

use bytemuck::{Pod, Zeroable};
use pipeworks_core::{Axis, Direction};

/// Native length of the segment mesh along +Y.
pub const PIPE_SCALE: f32 = 0.15;

/// Native diameter of the ball mesh.
pub const BALL_SCALE: f32 = 0.3;

/// Ball radius; segments stop this far from a joint center.
pub const BALL_RADIUS: f32 = BALL_SCALE / 2.0;

/// Column-major 4x4 transform for one drawn instance.
///
/// Uploaded verbatim as four `vec4` vertex attributes (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// Matrix columns.
    pub columns: [[f32; 4]; 4],
}

impl InstanceTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Identity transform.
    pub const IDENTITY: Self = Self {
        columns: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Translation by `t`.
    #[must_use]
    pub const fn translation(t: [f32; 3]) -> Self {
        let mut m = Self::IDENTITY;
        m.columns[3] = [t[0], t[1], t[2], 1.0];
        m
    }

    /// Non-uniform scale.
    #[must_use]
    pub const fn scale(s: [f32; 3]) -> Self {
        let mut m = Self::IDENTITY;
        m.columns[0][0] = s[0];
        m.columns[1][1] = s[1];
        m.columns[2][2] = s[2];
        m
    }

    /// Quarter turn about +X (maps +Y onto +Z).
    #[must_use]
    pub const fn quarter_turn_x() -> Self {
        Self {
            columns: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Quarter turn about +Z (maps +Y onto -X).
    #[must_use]
    pub const fn quarter_turn_z() -> Self {
        Self {
            columns: [
                [0.0, 1.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Rotation that lays the +Y-aligned segment mesh along `dir`'s axis.
    #[must_use]
    pub const fn orient_along(dir: Direction) -> Self {
        match dir.axis() {
            Axis::Z => Self::quarter_turn_x(),
            Axis::X => Self::quarter_turn_z(),
            Axis::Y => Self::IDENTITY,
        }
    }

    /// Matrix product `self * rhs`.
    #[must_use]
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0f32; 4]; 4];
        for (col, out_col) in out.iter_mut().enumerate() {
            for (row, cell) in out_col.iter_mut().enumerate() {
                *cell = (0..4)
                    .map(|k| self.columns[k][row] * rhs.columns[col][k])
                    .sum();
            }
        }
        Self { columns: out }
    }

    /// Applies the transform to a point.
    #[must_use]
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let v = [p[0], p[1], p[2], 1.0];
        let mut out = [0.0f32; 3];
        for (row, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| self.columns[k][row] * v[k]).sum();
        }
        out
    }

    /// Ball joint centered at `center`.
    #[must_use]
    pub const fn ball(center: [f32; 3]) -> Self {
        Self::translation(center)
    }

    /// Straight segment from `start` to `end` (both on `dir`'s axis).
    #[must_use]
    pub fn segment(start: [f32; 3], end: [f32; 3], dir: Direction) -> Self {
        let center = [
            (start[0] + end[0]) / 2.0,
            (start[1] + end[1]) / 2.0,
            (start[2] + end[2]) / 2.0,
        ];
        let length = distance(start, end);
        Self::translation(center)
            .mul(&Self::orient_along(dir))
            .mul(&Self::scale([1.0, length / PIPE_SCALE, 1.0]))
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
}
