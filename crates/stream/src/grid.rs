use glam::Vec3;

/// Integer chunk coordinate on the ground plane (Y is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev (king-move) distance between two chunks.
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// Every coordinate within `radius` of `self`, row by row.
    pub fn square(self, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        let r = radius.max(0);
        (-r..=r).flat_map(move |dz| {
            (-r..=r).map(move |dx| ChunkCoord::new(self.x + dx, self.z + dz))
        })
    }
}

/// Fixed-size square tiling of the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkGrid {
    chunk_size: f32,
}

impl ChunkGrid {
    pub fn new(chunk_size: f32) -> Self {
        assert!(chunk_size > 0.0, "chunk_size must be positive");
        Self { chunk_size }
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn position_to_chunk(&self, pos: Vec3) -> ChunkCoord {
        ChunkCoord {
            x: (pos.x / self.chunk_size).floor() as i32,
            z: (pos.z / self.chunk_size).floor() as i32,
        }
    }

    /// World-space corner with the smallest x and z of a chunk.
    pub fn chunk_origin(&self, coord: ChunkCoord) -> Vec3 {
        Vec3::new(
            coord.x as f32 * self.chunk_size,
            0.0,
            coord.z as f32 * self.chunk_size,
        )
    }

    pub fn chunk_center(&self, coord: ChunkCoord) -> Vec3 {
        self.chunk_origin(coord) + Vec3::new(self.chunk_size * 0.5, 0.0, self.chunk_size * 0.5)
    }
}
