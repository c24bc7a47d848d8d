//! Simulation and docking configuration.
//!
//! The docking constants are part of the behavioural contract: changing them
//! changes where crates end up and how many ticks an unload takes, so
//! replays recorded under one configuration only reproduce under the same
//! one.  [`DockConfig::default`] holds the reference values.

use crate::{DkError, DkResult};

// ── DockConfig ────────────────────────────────────────────────────────────────

/// Tunables for the crate unload sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DockConfig {
    /// World units from the staging cell center to the dock point when the
    /// target lies straight north/south/east/west of the staging cell.
    pub orthogonal_dock_distance: i32,

    /// World units from the staging cell center to the dock point when the
    /// target lies diagonally from the staging cell.
    pub diagonal_dock_distance: i32,

    /// Percentage of the locomotor's cell speed used while dragging into the
    /// dock point.
    pub dock_speed_percent: i32,

    /// Length of the cosmetic drag back to the carrier's cell center once the
    /// unload is over.
    pub settle_drag_ticks: u32,

    /// Ticks the transporter needs to release a crate after the unload
    /// location has been reserved.
    pub unload_delay_ticks: u32,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            orthogonal_dock_distance: 405,
            diagonal_dock_distance:   570,
            dock_speed_percent:       30,
            settle_drag_ticks:        20,
            unload_delay_ticks:       8,
        }
    }
}

impl DockConfig {
    pub fn validate(&self) -> DkResult<()> {
        if self.orthogonal_dock_distance <= 0 || self.diagonal_dock_distance <= 0 {
            return Err(DkError::Config("dock distances must be positive".into()));
        }
        if !(1..=100).contains(&self.dock_speed_percent) {
            return Err(DkError::Config(format!(
                "dock_speed_percent must be in 1..=100, got {}",
                self.dock_speed_percent
            )));
        }
        if self.settle_drag_ticks == 0 {
            return Err(DkError::Config("settle_drag_ticks must be > 0".into()));
        }
        Ok(())
    }
}

// ── WorldConfig ───────────────────────────────────────────────────────────────

/// Everything needed to construct a world.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// Seed of the world's shared random source.  The same seed always
    /// produces identical results.
    pub seed: u64,

    /// Map width in cells.
    pub width: i32,

    /// Map height in cells.
    pub height: i32,

    pub dock: DockConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self { seed: 0, width: 32, height: 32, dock: DockConfig::default() }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> DkResult<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(DkError::Config(format!(
                "map dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        self.dock.validate()
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the simulation builder.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    pub world: WorldConfig,

    /// Upper bound on ticks for `Sim::run`.
    pub total_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { world: WorldConfig::default(), total_ticks: 1_000 }
    }
}

impl SimConfig {
    pub fn validate(&self) -> DkResult<()> {
        if self.total_ticks == 0 {
            return Err(DkError::Config("total_ticks must be > 0".into()));
        }
        self.world.validate()
    }
}
