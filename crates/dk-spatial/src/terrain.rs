//! Terrain grid.
//!
//! Cells are stored row-major: the terrain of `CPos { x, y }` lives at
//! `tiles[y * width + x]`.  Everything outside `0..width × 0..height` is
//! off-map and never enterable.

use dk_core::CPos;

use crate::{SpatialError, SpatialResult};

/// Terrain class of a single cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainType {
    #[default]
    Clear,
    Road,
    Rough,
    Water,
    Rock,
}

impl TerrainType {
    /// Dense index used by per-terrain lookup tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            TerrainType::Clear => 0,
            TerrainType::Road  => 1,
            TerrainType::Rough => 2,
            TerrainType::Water => 3,
            TerrainType::Rock  => 4,
        }
    }

    pub const COUNT: usize = 5;
}

/// Rectangular terrain grid.
#[derive(Clone, Debug)]
pub struct TerrainMap {
    width:  i32,
    height: i32,
    tiles:  Vec<TerrainType>,
}

impl TerrainMap {
    /// A map filled with [`TerrainType::Clear`].
    pub fn open(width: i32, height: i32) -> Self {
        let len = (width.max(0) as usize) * (height.max(0) as usize);
        Self { width, height, tiles: vec![TerrainType::Clear; len] }
    }

    /// Build from an explicit row-major tile list.
    pub fn from_tiles(width: i32, height: i32, tiles: Vec<TerrainType>) -> SpatialResult<Self> {
        let expected = (width.max(0) as usize) * (height.max(0) as usize);
        if tiles.len() != expected {
            return Err(SpatialError::BadDimensions { width, height, expected, got: tiles.len() });
        }
        Ok(Self { width, height, tiles })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, cell: CPos) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    #[inline]
    fn slot(&self, cell: CPos) -> Option<usize> {
        self.contains(cell)
            .then(|| cell.y as usize * self.width as usize + cell.x as usize)
    }

    /// Terrain at `cell`, or `None` off-map.
    #[inline]
    pub fn terrain(&self, cell: CPos) -> Option<TerrainType> {
        self.slot(cell).map(|i| self.tiles[i])
    }

    pub fn set_terrain(&mut self, cell: CPos, terrain: TerrainType) -> SpatialResult<()> {
        let i = self.slot(cell).ok_or(SpatialError::OutOfBounds(cell))?;
        self.tiles[i] = terrain;
        Ok(())
    }
}
