//! Player position, stamina and carried packages.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{BASE_MOVE_COST, MAX_STAMINA, STARTING_STAMINA};
use crate::grid::{PackageId, Pos};

/// Packages in hand. Five is the largest package count of any tier.
pub type HeldPackages = SmallVec<[PackageId; 5]>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Pos,
    pub stamina: u32,
    pub max_stamina: u32,
    pub held: HeldPackages,
    pub selected: Option<PackageId>,
    pub steps_this_round: u32,
    pub double_cost_pending: bool,
}

impl PlayerState {
    #[must_use]
    pub fn new(position: Pos) -> Self {
        Self {
            position,
            stamina: STARTING_STAMINA,
            max_stamina: MAX_STAMINA,
            held: HeldPackages::new(),
            selected: None,
            steps_this_round: 0,
            double_cost_pending: false,
        }
    }

    #[must_use]
    pub fn is_holding(&self, id: PackageId) -> bool {
        self.held.contains(&id)
    }

    /// Base cost of the next step: one plus one per carried package.
    #[must_use]
    pub fn base_move_cost(&self) -> u32 {
        let load = u32::try_from(self.held.len()).unwrap_or(u32::MAX);
        BASE_MOVE_COST.saturating_add(load)
    }

    pub fn hold(&mut self, id: PackageId) {
        if !self.is_holding(id) {
            self.held.push(id);
        }
        if self.selected.is_none() {
            self.selected = Some(id);
        }
    }

    /// Let go of a package; the selection moves to another held package if any.
    pub fn release(&mut self, id: PackageId) {
        self.held.retain(|held| *held != id);
        if self.selected == Some(id) || self.selected.is_none() {
            self.selected = self.held.first().copied();
        }
    }

    /// Select a held package. Returns `false` when `id` is not in hand.
    pub fn select(&mut self, id: PackageId) -> bool {
        if self.is_holding(id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Add stamina, clamped to the maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let before = self.stamina;
        self.stamina = self.stamina.saturating_add(amount).min(self.max_stamina);
        self.stamina - before
    }

    /// Reset per-round fields and return to `start`.
    pub fn begin_round(&mut self, start: Pos) {
        self.position = start;
        self.held.clear();
        self.selected = None;
        self.steps_this_round = 0;
        self.double_cost_pending = false;
    }
}
