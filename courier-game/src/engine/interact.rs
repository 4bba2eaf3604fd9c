//! Package handling and round completion.
use crate::GameStorage;
use crate::clock::Clock;
use crate::constants::ROUND_STAMINA_BONUS;
use crate::grid::{Cell, PackageId};
use crate::scoring::score_round;

use super::{GameOverCause, GameplayEngine, Refusal, TickEvent, player_start};

impl<S, C> GameplayEngine<S, C>
where
    S: GameStorage,
    C: Clock,
{
    pub(super) fn pick_up(&mut self, events: &mut Vec<TickEvent>) {
        let pos = self.world.player.position;
        let Some(id) = self.world.map.waiting_package_at(pos) else {
            self.refuse(Refusal::NothingToPickUp, events);
            return;
        };
        self.world.map.take_package(id);
        self.world.player.hold(id);
        self.push_message(format!("Picked up package {}", display_label(id)));
        events.push(TickEvent::PickedUp(id));
    }

    pub(super) fn drop_selected(&mut self, events: &mut Vec<TickEvent>) {
        let Some(id) = self.world.player.selected else {
            self.refuse(Refusal::NothingSelected, events);
            return;
        };
        let pos = self.world.player.position;
        if pos == self.world.map.exit() {
            self.refuse(Refusal::DropAtExit, events);
            return;
        }
        match self.world.map.cell(pos) {
            Some(Cell::Floor) => {
                self.world.map.release_package(id, pos);
                self.world.player.release(id);
                self.push_message(format!("Dropped package {}", display_label(id)));
                events.push(TickEvent::Dropped { package: id, at: pos });
            }
            Some(Cell::Destination(target)) if target == id => {
                self.world.map.deliver_package(id);
                self.world.player.release(id);
                self.world.round.packages_delivered += 1;
                self.push_message(format!("Delivered package {}!", display_label(id)));
                events.push(TickEvent::Delivered(id));
            }
            _ => self.refuse(Refusal::CellOccupied, events),
        }
    }

    /// Select by 1-based label. Selecting the current selection again is a no-op.
    pub(super) fn select(&mut self, label: u8, events: &mut Vec<TickEvent>) {
        let known = usize::from(label) <= self.world.map.package_count();
        let Some(id) = label.checked_sub(1).filter(|_| known) else {
            self.refuse(Refusal::UnknownPackage(label), events);
            return;
        };
        if !self.world.player.select(id) {
            self.refuse(Refusal::NotHeld(label), events);
            return;
        }
        events.push(TickEvent::Selected(id));
    }

    pub(super) fn confirm(&mut self, events: &mut Vec<TickEvent>) {
        if self.world.player.position != self.world.map.exit() {
            self.refuse(Refusal::NotAtExit, events);
            return;
        }
        let total = self.world.map.package_count();
        let delivered = self.world.round.packages_delivered;
        if delivered < total {
            self.refuse(
                Refusal::Undelivered {
                    remaining: total - delivered,
                },
                events,
            );
            return;
        }
        self.complete_round(events);
    }

    fn complete_round(&mut self, events: &mut Vec<TickEvent>) {
        let now = self.clock.now();
        let finished = self.world.round.round_number;
        let elapsed_seconds = self.world.round.elapsed(now).as_secs();
        let steps = self.world.player.steps_this_round;
        let score = score_round(steps, elapsed_seconds);

        self.world.round.complete(score, now);
        let _ = self.world.player.restore(ROUND_STAMINA_BONUS);
        self.world
            .player
            .begin_round(player_start(self.profile.map_size));

        log::info!(
            "round {finished} complete: {steps} steps in {elapsed_seconds}s, scored {} (total {})",
            score.total(),
            self.world.round.total_score
        );
        self.push_message(format!(
            "Round {finished} complete! +{} points",
            score.total()
        ));
        events.push(TickEvent::RoundComplete {
            round: finished,
            score,
            elapsed_seconds,
        });

        match self.regenerate() {
            Ok(map) => self.world.map = map,
            Err(err) => {
                log::warn!("could not build the next map: {err}");
                self.end_game(GameOverCause::GenerationFailed, events);
            }
        }
    }
}

const fn display_label(id: PackageId) -> u8 {
    id.saturating_add(1)
}
