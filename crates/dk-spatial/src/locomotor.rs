//! Terrain-dependent movement cost lookup.

use dk_core::CPos;

use crate::{TerrainMap, TerrainType};

/// Movement profile of an actor class.
///
/// Speed is in world units per tick.  The effective speed on a cell is
/// `base_speed * terrain_percent / 100`; a result of `0` means the cell is
/// impassable for this class.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locomotor {
    pub name:       String,
    pub base_speed: i32,
    /// Speed modifier per terrain type, indexed by [`TerrainType::index`].
    pub terrain_percent: [i32; TerrainType::COUNT],
}

impl Locomotor {
    /// Wheeled vehicles: fast on roads, slow on rough ground, blocked by
    /// water and rock.
    pub fn wheeled(base_speed: i32) -> Self {
        Self {
            name: "wheeled".into(),
            base_speed,
            terrain_percent: [100, 125, 50, 0, 0],
        }
    }

    /// Movement speed on `cell`, or `0` when the cell is off-map or
    /// impassable.
    pub fn movement_speed_for_cell(&self, map: &TerrainMap, cell: CPos) -> i32 {
        match map.terrain(cell) {
            None => 0,
            Some(t) => self.base_speed * self.terrain_percent[t.index()] / 100,
        }
    }

    #[inline]
    pub fn can_traverse(&self, map: &TerrainMap, cell: CPos) -> bool {
        self.movement_speed_for_cell(map, cell) > 0
    }
}
