//! Fluent builder for constructing a [`Sim`].

use dk_core::SimConfig;
use dk_spatial::TerrainMap;
use dk_world::World;

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Optional inputs
///
/// | Method       | Default                                   |
/// |--------------|-------------------------------------------|
/// | `.map(m)`    | Open clear map of the configured size     |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config).map(map).build()?;
/// let truck = sim.world.spawn_carrier("truck", CPos::new(3, 3), WAngle::ZERO, Locomotor::wheeled(64))?;
/// sim.world.spawn_sub_actor("crate", CPos::new(3, 3), WAngle::ZERO, Some(truck))?;
/// sim.unload(truck, CPos::new(4, 3))?;
/// sim.run_until_idle(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
    map:    Option<TerrainMap>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, map: None }
    }

    /// Supply the terrain.  Its size must match the configured map size.
    pub fn map(mut self, map: TerrainMap) -> Self {
        self.map = Some(map);
        self
    }

    /// Validate the configuration and build an empty world.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;

        let world_config = self.config.world.clone();
        let map = match self.map {
            Some(m) => {
                if m.width() != world_config.width || m.height() != world_config.height {
                    return Err(SimError::MapSizeMismatch {
                        width:      world_config.width,
                        height:     world_config.height,
                        got_width:  m.width(),
                        got_height: m.height(),
                    });
                }
                m
            }
            None => TerrainMap::open(world_config.width, world_config.height),
        };

        let world = World::with_map(world_config, map)?;
        log::info!(
            "built {}x{} world, seed {}",
            self.config.world.width,
            self.config.world.height,
            self.config.world.seed
        );
        Ok(Sim { config: self.config, world })
    }
}
