//! `SpatialIndex` — the world-wide cell occupancy index.
//!
//! # Two layers
//!
//! - **Influence**: `CPos → [ActorId]`.  An actor's influence is the
//!   footprint it claims for collision and blocking queries.  Every actor has
//!   at most one registration; [`SpatialIndex::registration`] returns it.
//! - **Maps**: `ActorId → WPos`.  Tracks the center position of every actor
//!   that is in the world, for box queries.  Adding an actor to the maps
//!   also registers its influence; removing it drops both.
//!
//! # Consistency
//!
//! Registering influence for an actor that is already registered replaces
//! the old registration, so an actor can never appear twice.  Footprint
//! changes go through [`SpatialIndex::update_influence`], which removes and
//! re-adds inside one `&mut self` call.  No other query can observe the
//! intermediate state.
//!
//! Occupants of a cell are kept in insertion order, so iteration is
//! deterministic regardless of hasher.

use rustc_hash::FxHashMap;

use dk_core::{ActorId, CPos, WPos};

#[derive(Default, Debug)]
pub struct SpatialIndex {
    cells:         FxHashMap<CPos, Vec<ActorId>>,
    registrations: FxHashMap<ActorId, Vec<CPos>>,
    positions:     FxHashMap<ActorId, WPos>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Influence ─────────────────────────────────────────────────────────

    /// Register `actor` as occupying `footprint`.  Any previous registration
    /// of `actor` is removed first.
    pub fn add_influence(&mut self, actor: ActorId, footprint: &[CPos]) {
        if self.registrations.contains_key(&actor) {
            log::debug!("{actor} re-registered without removal; replacing stale footprint");
            self.remove_influence(actor);
        }
        let mut cells = Vec::with_capacity(footprint.len());
        for &cell in footprint {
            if cells.contains(&cell) {
                continue;
            }
            self.cells.entry(cell).or_default().push(actor);
            cells.push(cell);
        }
        self.registrations.insert(actor, cells);
    }

    /// Drop `actor`'s registration.  Returns the footprint it had, or `None`
    /// if it was not registered.
    pub fn remove_influence(&mut self, actor: ActorId) -> Option<Vec<CPos>> {
        let cells = self.registrations.remove(&actor)?;
        for cell in &cells {
            if let Some(occupants) = self.cells.get_mut(cell) {
                occupants.retain(|&a| a != actor);
                if occupants.is_empty() {
                    self.cells.remove(cell);
                }
            }
        }
        Some(cells)
    }

    /// Replace `actor`'s registration with `footprint` in one step.
    pub fn update_influence(&mut self, actor: ActorId, footprint: &[CPos]) {
        self.remove_influence(actor);
        self.add_influence(actor, footprint);
    }

    // ── Maps ──────────────────────────────────────────────────────────────

    /// Track `actor` as present in the world at `center`, claiming
    /// `footprint`.  An influence registered beforehand is replaced.
    pub fn add_to_maps(&mut self, actor: ActorId, center: WPos, footprint: &[CPos]) {
        self.positions.insert(actor, center);
        self.update_influence(actor, footprint);
    }

    /// Forget `actor` entirely.
    pub fn remove_from_maps(&mut self, actor: ActorId) {
        self.positions.remove(&actor);
        self.remove_influence(actor);
    }

    /// Refresh a tracked actor's center and footprint.  No-op for actors that
    /// are not in the maps.
    pub fn update_maps(&mut self, actor: ActorId, center: WPos, footprint: &[CPos]) {
        let Some(pos) = self.positions.get_mut(&actor) else {
            return;
        };
        *pos = center;
        self.update_influence(actor, footprint);
    }

    /// Update only the tracked center of an actor already in the maps.
    pub fn update_position(&mut self, actor: ActorId, center: WPos) {
        if let Some(pos) = self.positions.get_mut(&actor) {
            *pos = center;
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Actors registered on `cell`, in registration order.
    pub fn occupants(&self, cell: CPos) -> &[ActorId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` if no actor other than those in `ignore` occupies `cell`.
    pub fn is_free(&self, cell: CPos, ignore: &[ActorId]) -> bool {
        self.occupants(cell).iter().all(|a| ignore.contains(a))
    }

    /// The footprint `actor` is currently registered with.
    pub fn registration(&self, actor: ActorId) -> Option<&[CPos]> {
        self.registrations.get(&actor).map(Vec::as_slice)
    }

    /// Number of cell entries naming `actor` across the whole index.
    pub fn occurrences(&self, actor: ActorId) -> usize {
        self.cells
            .values()
            .map(|occupants| occupants.iter().filter(|&&a| a == actor).count())
            .sum()
    }

    /// `true` if `actor` is tracked in the maps.
    pub fn in_maps(&self, actor: ActorId) -> bool {
        self.positions.contains_key(&actor)
    }

    /// Tracked actors whose center lies in the inclusive box `min..=max`,
    /// sorted by id.
    pub fn actors_in_box(&self, min: WPos, max: WPos) -> Vec<ActorId> {
        let mut found: Vec<ActorId> = self
            .positions
            .iter()
            .filter(|(_, p)| {
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            })
            .map(|(&a, _)| a)
            .collect();
        found.sort_unstable();
        found
    }
}
