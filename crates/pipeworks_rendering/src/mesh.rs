//! Static mesh data for the two instanced shapes.
//!
//! Both meshes are built in code, so a headless run needs no asset files:
//!
//! - **Ball**: UV sphere of diameter [`BALL_SCALE`], centered at the origin.
//! - **Segment**: open cylinder of length [`PIPE_SCALE`] along +Y, centered at the
//!   origin. Instance transforms stretch it to the real segment length.

use std::f32::consts::{PI, TAU};

use crate::error::MeshError;
use crate::instancing::{BALL_SCALE, PIPE_SCALE};

/// Cylinder radius of the segment mesh.
pub const SEGMENT_RADIUS: f32 = 0.05;

/// Which of the two meshes a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Joint between segments and pipe end caps.
    Ball,
    /// Straight run between joints.
    Segment,
}

impl MeshKind {
    /// Short name for logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ball => "ball",
            Self::Segment => "segment",
        }
    }
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// One normal per position.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list.
    pub indices: Vec<u16>,
}

impl MeshData {
    /// Triangle count.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks the mesh is drawable as an indexed triangle list.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshError`] found.
    pub fn validate(&self, mesh: &'static str) -> Result<(), MeshError> {
        let vertices = self.positions.len();
        if vertices == 0 || self.indices.is_empty() {
            return Err(MeshError::Empty { mesh });
        }
        if vertices > usize::from(u16::MAX) + 1 {
            return Err(MeshError::TooManyVertices { mesh, vertices });
        }
        if self.normals.len() != vertices {
            return Err(MeshError::NormalCountMismatch {
                mesh,
                positions: vertices,
                normals: self.normals.len(),
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle {
                mesh,
                indices: self.indices.len(),
            });
        }
        if let Some(&index) = self.indices.iter().find(|&&i| usize::from(i) >= vertices) {
            return Err(MeshError::IndexOutOfRange {
                mesh,
                index,
                vertices,
            });
        }
        Ok(())
    }

    /// UV sphere. `rings` latitude bands, `sectors` longitude bands.
    #[must_use]
    pub fn uv_sphere(radius: f32, rings: u16, sectors: u16) -> Self {
        let mut mesh = Self::default();

        for ring in 0..=rings {
            let phi = PI * f32::from(ring) / f32::from(rings);
            let (sin_phi, cos_phi) = phi.sin_cos();
            for sector in 0..=sectors {
                let theta = TAU * f32::from(sector) / f32::from(sectors);
                let (sin_theta, cos_theta) = theta.sin_cos();
                let n = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
                mesh.positions.push([n[0] * radius, n[1] * radius, n[2] * radius]);
                mesh.normals.push(n);
            }
        }

        let stride = sectors + 1;
        for ring in 0..rings {
            for sector in 0..sectors {
                let a = ring * stride + sector;
                let b = a + stride;
                mesh.indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        mesh
    }

    /// Open cylinder along +Y, centered at the origin.
    #[must_use]
    pub fn cylinder(radius: f32, length: f32, sectors: u16) -> Self {
        let mut mesh = Self::default();
        let half = length / 2.0;

        for sector in 0..=sectors {
            let theta = TAU * f32::from(sector) / f32::from(sectors);
            let (sin_theta, cos_theta) = theta.sin_cos();
            let n = [cos_theta, 0.0, sin_theta];
            for y in [-half, half] {
                mesh.positions.push([n[0] * radius, y, n[2] * radius]);
                mesh.normals.push(n);
            }
        }

        for sector in 0..sectors {
            let a = sector * 2;
            mesh.indices
                .extend_from_slice(&[a, a + 1, a + 2, a + 2, a + 1, a + 3]);
        }
        mesh
    }
}

/// The validated ball and segment meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLibrary {
    ball: MeshData,
    segment: MeshData,
}

impl MeshLibrary {
    /// Validates and stores both meshes.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError`] if either mesh is malformed.
    pub fn new(ball: MeshData, segment: MeshData) -> Result<Self, MeshError> {
        ball.validate(MeshKind::Ball.name())?;
        segment.validate(MeshKind::Segment.name())?;
        Ok(Self { ball, segment })
    }

    /// Meshes generated in code.
    ///
    /// # Errors
    ///
    /// Only if the generators themselves are broken.
    pub fn procedural() -> Result<Self, MeshError> {
        Self::new(
            MeshData::uv_sphere(BALL_SCALE / 2.0, 12, 16),
            MeshData::cylinder(SEGMENT_RADIUS, PIPE_SCALE, 16),
        )
    }

    /// Mesh for a draw.
    #[must_use]
    pub const fn get(&self, kind: MeshKind) -> &MeshData {
        match kind {
            MeshKind::Ball => &self.ball,
            MeshKind::Segment => &self.segment,
        }
    }
}
