//! Dock point and docking time.
//!
//! The dock point is the staging cell's center pushed toward the target
//! cell.  Only the sign of each axis of `target - staging` is used, so the
//! push is one of the eight compass directions scaled by the configured
//! distance: [`DockConfig::diagonal_dock_distance`] per axis when both axes
//! move, [`DockConfig::orthogonal_dock_distance`] otherwise.

use dk_core::{CPos, CVec, DockConfig, WPos, WVec};

/// Per-axis offset distance for a push along `direction`.
pub fn dock_distance(config: &DockConfig, direction: CVec) -> i32 {
    if direction.is_diagonal() {
        config.diagonal_dock_distance
    } else {
        config.orthogonal_dock_distance
    }
}

/// Offset from the staging cell's center to the dock point.
pub fn dock_offset(config: &DockConfig, staging: CPos, target: CPos) -> WVec {
    let direction = (target - staging).signum();
    WVec::from(direction) * dock_distance(config, direction)
}

pub fn dock_position(config: &DockConfig, staging: CPos, target: CPos) -> WPos {
    staging.center() + dock_offset(config, staging, target)
}

/// Speed used while dragging into the dock point, from the locomotor speed
/// on the staging cell.
#[inline]
pub fn dock_speed(config: &DockConfig, cell_speed: i32) -> i32 {
    cell_speed * config.dock_speed_percent / 100
}

/// Whole ticks needed to cover `from → to` at `speed`, rounded down.
/// `None` when the speed is not positive.
pub fn ticks_to_dock(from: WPos, to: WPos, speed: i32) -> Option<u32> {
    if speed <= 0 {
        return None;
    }
    Some(((to - from).length() / speed) as u32)
}
