//! Movement, stamina cost and landing effects.
use crate::GameStorage;
use crate::clock::Clock;
use crate::constants::{MSG_DEADLOCK, MSG_DEPLETED, MSG_SPEED_BUMP};
use crate::grid::{Cell, Direction};

use super::{GameOverCause, GameplayEngine, Refusal, TickEvent, World};

impl<S, C> GameplayEngine<S, C>
where
    S: GameStorage,
    C: Clock,
{
    pub(super) fn step(&mut self, dir: Direction, events: &mut Vec<TickEvent>) {
        let player = &mut self.world.player;
        let base_cost = player.base_move_cost();
        let cost = if player.double_cost_pending {
            player.double_cost_pending = false;
            base_cost.saturating_mul(2)
        } else {
            base_cost
        };

        let from = player.position;
        let Some(to) = from
            .step(dir)
            .filter(|pos| self.world.map.is_interior(*pos))
        else {
            self.refuse(Refusal::OutOfBounds, events);
            return;
        };
        if self.world.map.cell(to) == Some(Cell::Obstacle) {
            self.refuse(Refusal::Obstacle, events);
            return;
        }

        let stamina = self.world.player.stamina;
        if stamina < cost {
            if stamina > 0 && stamina < base_cost && !self.unloading_frees_a_step(stamina) {
                self.push_message(MSG_DEADLOCK);
                self.end_game(GameOverCause::Deadlock, events);
            } else {
                self.refuse(Refusal::TooTired { stamina, cost }, events);
            }
            return;
        }

        let player = &mut self.world.player;
        player.stamina -= cost;
        player.position = to;
        player.steps_this_round = player.steps_this_round.saturating_add(1);
        events.push(TickEvent::Moved { from, to, cost });

        self.land(events);

        if self.world.player.stamina == 0 {
            self.push_message(MSG_DEPLETED);
            self.end_game(GameOverCause::StaminaDepleted, events);
        }
    }

    fn land(&mut self, events: &mut Vec<TickEvent>) {
        let pos = self.world.player.position;
        if let Some(station) = self.world.map.active_station_at(pos) {
            let bonus = self.profile.supply_bonus.sample(&mut self.rng);
            let gained = self.world.player.restore(bonus);
            self.world.map.consume_station(station);
            self.push_message(format!("Supplies! +{gained} stamina"));
            events.push(TickEvent::SupplyCollected { gained });
        }
        if self.world.map.is_speed_bump(pos) && !self.world.player.double_cost_pending {
            self.world.player.double_cost_pending = true;
            self.push_message(MSG_SPEED_BUMP);
            events.push(TickEvent::SpeedBump);
        }
    }

    /// Whether unloading on the current cell would make an undoubled step affordable.
    ///
    /// A floor cell takes one package. The player's own destination takes a
    /// delivery and then reverts to floor, so it can take a second drop.
    fn unloading_frees_a_step(&self, stamina: u32) -> bool {
        let World { map, player, .. } = &self.world;
        if player.position == map.exit() {
            return false;
        }
        let held = u32::try_from(player.held.len()).unwrap_or(u32::MAX);
        let shed = match map.cell(player.position) {
            Some(Cell::Floor) => held.min(1),
            Some(Cell::Destination(id)) if player.is_holding(id) => held.min(2),
            _ => 0,
        };
        shed > 0 && stamina >= player.base_move_cost().saturating_sub(shed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::staged_engine;
    use super::super::{EngineState, Signal};
    use crate::grid::{Pos, SupplyStation};
    use crate::input::Input;

    use super::*;

    #[test]
    fn move_costs_one_plus_load() {
        let (mut engine, _) = staged_engine();
        let outcome = engine.tick(Some(Input::Move(Direction::Right)));
        assert!(outcome.has(&TickEvent::Moved {
            from: Pos::new(5, 4),
            to: Pos::new(5, 5),
            cost: 1,
        }));
        assert_eq!(engine.world().player.stamina, 199);
        let _ = engine.tick(Some(Input::Pickup));
        let outcome = engine.tick(Some(Input::Move(Direction::Right)));
        assert!(outcome.has(&TickEvent::Moved {
            from: Pos::new(5, 5),
            to: Pos::new(5, 6),
            cost: 2,
        }));
        assert_eq!(engine.world().player.stamina, 197);
        assert_eq!(engine.world().player.steps_this_round, 2);
    }

    #[test]
    fn walls_and_obstacles_block_without_cost() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| world.player.position = Pos::new(1, 3));
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert_eq!(outcome.refusal(), Some(Refusal::OutOfBounds));

        engine.with_world_mut(|world| world.player.position = Pos::new(4, 3));
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert_eq!(outcome.refusal(), Some(Refusal::Obstacle));
        assert_eq!(engine.world().player.position, Pos::new(4, 3));
        assert_eq!(engine.world().player.stamina, 200);
        assert_eq!(engine.world().player.steps_this_round, 0);
    }

    #[test]
    fn speed_bump_doubles_only_the_next_step() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| world.map.add_speed_bump(Pos::new(6, 4)));
        let outcome = engine.tick(Some(Input::Move(Direction::Down)));
        assert!(outcome.has(&TickEvent::SpeedBump));
        assert!(engine.world().player.double_cost_pending);

        let _ = engine.tick(Some(Input::Move(Direction::Down)));
        assert_eq!(engine.world().player.stamina, 200 - 1 - 2);
        let _ = engine.tick(Some(Input::Move(Direction::Down)));
        assert_eq!(engine.world().player.stamina, 200 - 1 - 2 - 1);
    }

    #[test]
    fn blocked_move_still_clears_pending_double_cost() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            world.player.position = Pos::new(1, 3);
            world.player.double_cost_pending = true;
        });
        let _ = engine.tick(Some(Input::Move(Direction::Up)));
        assert!(!engine.world().player.double_cost_pending);
        let _ = engine.tick(Some(Input::Move(Direction::Down)));
        assert_eq!(engine.world().player.stamina, 199);
    }

    #[test]
    fn supply_station_pays_out_once() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            world.map.add_station(Pos::new(7, 3));
            world.player.position = Pos::new(6, 4);
            world.player.stamina = 100;
        });
        let outcome = engine.tick(Some(Input::Move(Direction::Down)));
        let gained = outcome
            .events
            .iter()
            .find_map(|event| match event {
                TickEvent::SupplyCollected { gained } => Some(*gained),
                _ => None,
            })
            .expect("station collected");
        assert!((30..=50).contains(&gained));
        assert_eq!(engine.world().player.stamina, 99 + gained);
        assert_eq!(
            engine.world().map.stations(),
            &[SupplyStation {
                left: Pos::new(7, 3),
                active: false,
            }]
        );
        assert_eq!(engine.world().map.cell(Pos::new(7, 4)), Some(Cell::Floor));
    }

    #[test]
    fn supply_bonus_never_exceeds_max() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            world.map.add_station(Pos::new(7, 3));
            world.player.position = Pos::new(6, 4);
        });
        let _ = engine.tick(Some(Input::Move(Direction::Down)));
        assert_eq!(engine.world().player.stamina, 200);
    }

    #[test]
    fn too_tired_with_a_drop_spot_is_only_refused() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            world.player.hold(0);
            world.map.take_package(0);
            world.player.stamina = 1;
        });
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert_eq!(
            outcome.refusal(),
            Some(Refusal::TooTired {
                stamina: 1,
                cost: 2
            })
        );
        assert_eq!(engine.state(), EngineState::AwaitingInput);
    }

    #[test]
    fn too_tired_with_nowhere_to_unload_is_deadlock() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            world.map.add_speed_bump(Pos::new(5, 4));
            world.player.hold(0);
            world.map.take_package(0);
            world.player.stamina = 1;
        });
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert_eq!(outcome.signal, Signal::GameOver(GameOverCause::Deadlock));
    }

    #[test]
    fn floor_that_fits_one_package_cannot_rescue_two_held() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            let second = world.map.add_package(Pos::new(8, 8), Pos::new(10, 10));
            world.player.hold(0);
            world.player.hold(second);
            world.map.take_package(0);
            world.map.take_package(second);
            world.player.stamina = 1;
        });
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert_eq!(outcome.signal, Signal::GameOver(GameOverCause::Deadlock));
        assert!(outcome.refusal().is_none());
    }

    #[test]
    fn own_destination_takes_delivery_and_a_drop() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            let second = world.map.add_package(Pos::new(8, 8), Pos::new(10, 10));
            world.player.hold(0);
            world.player.hold(second);
            world.map.take_package(0);
            world.map.take_package(second);
            world.player.position = Pos::new(5, 9);
            world.player.stamina = 1;
        });
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert!(matches!(outcome.refusal(), Some(Refusal::TooTired { .. })));
        assert_eq!(engine.state(), EngineState::AwaitingInput);
    }

    #[test]
    fn doubled_cost_alone_never_deadlocks() {
        let (mut engine, _) = staged_engine();
        engine.with_world_mut(|world| {
            world.map.add_speed_bump(Pos::new(5, 4));
            world.player.stamina = 1;
            world.player.double_cost_pending = true;
        });
        let outcome = engine.tick(Some(Input::Move(Direction::Up)));
        assert!(matches!(outcome.refusal(), Some(Refusal::TooTired { .. })));
        assert_eq!(engine.state(), EngineState::AwaitingInput);
    }
}
