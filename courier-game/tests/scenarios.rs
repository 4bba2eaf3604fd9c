use courier_game::{
    Cell, Difficulty, Direction, EngineState, GameOverCause, GameplayEngine, Input, ManualClock,
    MapGrid, MemoryStorage, Pos, Refusal, Signal, TickEvent, exit_position, player_start,
};

type Engine = GameplayEngine<MemoryStorage, ManualClock>;

fn fresh(difficulty: Difficulty, seed: u64) -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let engine =
        GameplayEngine::with_seed(difficulty, seed, MemoryStorage::default(), clock.clone())
            .unwrap();
    (engine, clock)
}

/// Easy engine on an open 15x15 map with two packages:
/// package 1 at (6, 3) bound for (6, 10), package 2 at (9, 3) bound for (9, 10).
fn open_map_engine() -> (Engine, ManualClock) {
    let (mut engine, clock) = fresh(Difficulty::Easy, 11);
    engine.with_world_mut(|world| {
        let mut map = MapGrid::bordered(15, exit_position(15));
        let _ = map.add_package(Pos::new(6, 3), Pos::new(6, 10));
        let _ = map.add_package(Pos::new(9, 3), Pos::new(9, 10));
        world.map = map;
        world.player.position = Pos::new(6, 2);
    });
    (engine, clock)
}

fn walk(engine: &mut Engine, dir: Direction, steps: usize) {
    for _ in 0..steps {
        let outcome = engine.tick(Some(Input::Move(dir)));
        assert!(
            outcome.refusal().is_none(),
            "unexpected refusal walking {}: {outcome:?}",
            dir.label()
        );
    }
}

#[test]
fn fresh_easy_game_starts_full_and_refuses_early_exit() {
    let (mut engine, _) = fresh(Difficulty::Easy, 2024);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.world.player.stamina, 200);
    assert_eq!(snapshot.world.player.max_stamina, 200);
    assert_eq!(snapshot.world.round.round_number, 1);
    assert_eq!(snapshot.world.map.package_count(), 3);
    assert_eq!(snapshot.world.player.position, player_start(15));

    engine.with_world_mut(|world| world.player.position = world.map.exit());
    let outcome = engine.tick(Some(Input::Confirm));
    assert_eq!(
        outcome.refusal(),
        Some(Refusal::Undelivered { remaining: 3 })
    );
    assert_eq!(engine.world().round.round_number, 1);
}

#[test]
fn exhausted_courier_with_a_drop_spot_is_not_softlocked() {
    let (mut engine, _) = open_map_engine();
    let _ = engine.tick(Some(Input::Move(Direction::Right)));
    let _ = engine.tick(Some(Input::Pickup));
    engine.with_world_mut(|world| world.player.stamina = 1);

    let outcome = engine.tick(Some(Input::Move(Direction::Right)));
    assert_eq!(
        outcome.refusal(),
        Some(Refusal::TooTired {
            stamina: 1,
            cost: 2
        })
    );
    assert_eq!(outcome.signal, Signal::Continue);

    let outcome = engine.tick(Some(Input::Drop));
    assert!(outcome.has(&TickEvent::Dropped {
        package: 0,
        at: Pos::new(6, 3),
    }));
    let outcome = engine.tick(Some(Input::Move(Direction::Up)));
    assert!(outcome.has(&TickEvent::Moved {
        from: Pos::new(6, 3),
        to: Pos::new(5, 3),
        cost: 1,
    }));
}

#[test]
fn last_stamina_point_ends_the_game_only_after_the_move() {
    let (mut engine, _) = open_map_engine();
    engine.with_world_mut(|world| {
        world.map.set_cell(Pos::new(5, 2), Cell::Obstacle);
        world.player.stamina = 1;
    });

    let outcome = engine.tick(Some(Input::Move(Direction::Up)));
    assert_eq!(outcome.refusal(), Some(Refusal::Obstacle));
    assert_eq!(engine.state(), EngineState::AwaitingInput);
    assert_eq!(engine.world().player.stamina, 1);

    let outcome = engine.tick(Some(Input::Move(Direction::Down)));
    assert!(outcome.has(&TickEvent::Moved {
        from: Pos::new(6, 2),
        to: Pos::new(7, 2),
        cost: 1,
    }));
    assert_eq!(
        outcome.signal,
        Signal::GameOver(GameOverCause::StaminaDepleted)
    );
    assert_eq!(engine.world().player.position, Pos::new(7, 2));
    assert_eq!(engine.world().player.stamina, 0);
}

#[test]
fn speed_bump_doubles_next_cost_and_clears_even_when_blocked() {
    let (mut engine, _) = open_map_engine();
    engine.with_world_mut(|world| {
        world.map.add_speed_bump(Pos::new(7, 2));
        world.map.set_cell(Pos::new(7, 1), Cell::Obstacle);
        world.player.hold(1);
        world.map.take_package(1);
    });

    let _ = engine.tick(Some(Input::Move(Direction::Down)));
    assert!(engine.world().player.double_cost_pending);
    assert_eq!(engine.world().player.stamina, 198);

    let outcome = engine.tick(Some(Input::Move(Direction::Left)));
    assert_eq!(outcome.refusal(), Some(Refusal::Obstacle));
    assert!(!engine.world().player.double_cost_pending);
    assert_eq!(engine.world().player.stamina, 198);

    let outcome = engine.tick(Some(Input::Move(Direction::Down)));
    assert!(outcome.has(&TickEvent::Moved {
        from: Pos::new(7, 2),
        to: Pos::new(8, 2),
        cost: 2,
    }));

    // Back onto the bump, then a successful doubled step.
    let _ = engine.tick(Some(Input::Move(Direction::Up)));
    assert!(engine.world().player.double_cost_pending);
    let outcome = engine.tick(Some(Input::Move(Direction::Right)));
    assert!(outcome.has(&TickEvent::Moved {
        from: Pos::new(7, 2),
        to: Pos::new(7, 3),
        cost: 4,
    }));
    assert!(!engine.world().player.double_cost_pending);
}

#[test]
fn supply_station_bonus_is_in_range_and_single_use() {
    let (mut engine, _) = open_map_engine();
    engine.with_world_mut(|world| {
        world.map.add_station(Pos::new(5, 1));
        world.player.stamina = 60;
    });

    let outcome = engine.tick(Some(Input::Move(Direction::Up)));
    let gained = outcome
        .events
        .iter()
        .find_map(|event| match event {
            TickEvent::SupplyCollected { gained } => Some(*gained),
            _ => None,
        })
        .expect("active station pays out");
    let bonus = engine.profile().supply_bonus;
    assert!(bonus.contains(gained));
    assert_eq!(engine.world().player.stamina, 59 + gained);

    walk(&mut engine, Direction::Right, 1);
    let outcome = engine.tick(Some(Input::Move(Direction::Left)));
    assert!(
        !outcome
            .events
            .iter()
            .any(|event| matches!(event, TickEvent::SupplyCollected { .. }))
    );
    assert_eq!(engine.world().player.stamina, 59 + gained - 2);
}

#[test]
fn supply_bonus_is_clamped_to_max_stamina() {
    let (mut engine, _) = open_map_engine();
    engine.with_world_mut(|world| {
        world.map.add_station(Pos::new(5, 1));
        world.player.stamina = 190;
    });
    let _ = engine.tick(Some(Input::Move(Direction::Up)));
    assert_eq!(engine.world().player.stamina, 200);
}

#[test]
fn full_round_banks_score_and_starts_the_next() {
    let (mut engine, clock) = open_map_engine();

    walk(&mut engine, Direction::Right, 1);
    assert!(engine.tick(Some(Input::Pickup)).has(&TickEvent::PickedUp(0)));
    walk(&mut engine, Direction::Down, 3);
    assert!(engine.tick(Some(Input::Pickup)).has(&TickEvent::PickedUp(1)));
    assert_eq!(engine.world().player.selected, Some(0));

    // Package 2 rides along while package 1 goes first.
    walk(&mut engine, Direction::Up, 3);
    walk(&mut engine, Direction::Right, 7);
    assert!(engine.tick(Some(Input::Drop)).has(&TickEvent::Delivered(0)));
    assert_eq!(engine.world().player.selected, Some(1));
    walk(&mut engine, Direction::Down, 3);
    assert!(engine.tick(Some(Input::Drop)).has(&TickEvent::Delivered(1)));

    walk(&mut engine, Direction::Up, 8);
    walk(&mut engine, Direction::Right, 3);
    assert_eq!(engine.world().player.position, exit_position(15));
    let steps = engine.world().player.steps_this_round;
    assert_eq!(steps, 28);

    clock.advance_secs(42);
    let stamina_before = engine.world().player.stamina;
    let outcome = engine.tick(Some(Input::Confirm));
    assert_eq!(outcome.signal, Signal::Continue);

    let world = engine.world();
    assert_eq!(world.round.round_number, 2);
    assert_eq!(world.round.packages_delivered, 0);
    assert_eq!(world.round.last_round_step_score, 1_000 - 28 * 2);
    assert_eq!(world.round.last_round_time_score, 1_000 - 42 * 5);
    assert_eq!(world.round.total_score, (1_000 - 56) + (1_000 - 210));
    assert_eq!(world.player.stamina, (stamina_before + 50).min(200));
    assert_eq!(world.player.position, player_start(15));
    assert!(world.player.held.is_empty());
    assert_eq!(world.player.selected, None);
    assert!(!world.player.double_cost_pending);
    assert_eq!(world.map.package_count(), 3);
    assert_eq!(engine.elapsed().as_secs(), 0);
}

#[test]
fn slow_rounds_score_zero_not_negative() {
    let (mut engine, clock) = open_map_engine();
    engine.with_world_mut(|world| {
        for id in 0..2 {
            world.map.take_package(id);
            world.map.deliver_package(id);
        }
        world.round.packages_delivered = 2;
        world.player.steps_this_round = 900;
        world.player.position = world.map.exit();
    });
    clock.advance_secs(3_600);
    let _ = engine.tick(Some(Input::Confirm));
    let round = &engine.world().round;
    assert_eq!(round.last_round_step_score, 0);
    assert_eq!(round.last_round_time_score, 0);
    assert_eq!(round.total_score, 0);
    assert_eq!(round.round_number, 2);
}

#[test]
fn reselecting_the_selected_package_is_idempotent() {
    let (mut engine, _) = open_map_engine();
    engine.with_world_mut(|world| {
        for id in 0..2 {
            world.map.take_package(id);
            world.player.hold(id);
        }
    });
    let _ = engine.tick(Some(Input::Select(2)));
    let before = engine.world().player.clone();
    let _ = engine.tick(Some(Input::Select(2)));
    assert_eq!(engine.world().player, before);
    assert_eq!(engine.world().player.selected, Some(1));
}
