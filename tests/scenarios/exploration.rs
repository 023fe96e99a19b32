use sweeper::{
    mind::{Action, Coordinate, CoverageStrategy, DirtCategory, GridBounds, Orientation, Phase},
    world::GridWorld,
};

use super::{RIGHT, action_of, explorer, phase_rank, place};

const STRATEGIES: [CoverageStrategy; 2] = [
    CoverageStrategy::NearestUnobserved,
    CoverageStrategy::Boustrophedon,
];

#[test]
fn given_lone_explorer_on_empty_grid_when_running_then_follows_the_boundary_walk() {
    for strategy in STRATEGIES {
        let mut world = GridWorld::new(5, 3).expect("world");
        place(&mut world, "white", 0, 0, Orientation::North, explorer(strategy));

        let expected = [
            (RIGHT, Phase::FindWidth),
            (Action::Move, Phase::FindWidth),
            (Action::Move, Phase::FindWidth),
            (Action::Move, Phase::FindWidth),
            (Action::Move, Phase::FindWidth),
            (RIGHT, Phase::FindHeight),
            (Action::Move, Phase::FindHeight),
            (Action::Move, Phase::FindHeight),
            (RIGHT, Phase::Coverage),
            (Action::Move, Phase::Coverage),
            (Action::Move, Phase::Coverage),
            (Action::Move, Phase::Coverage),
            (Action::Broadcast(Vec::new()), Phase::Cleaning),
            (Action::Idle, Phase::Done),
        ];

        for (index, (action, phase)) in expected.into_iter().enumerate() {
            let report = world.tick();
            let mind = world.mind("white").expect("explorer");
            assert_eq!(
                action_of(&report, "white"),
                action,
                "{strategy:?} tick {}",
                index + 1
            );
            assert_eq!(mind.phase(), phase, "{strategy:?} tick {}", index + 1);
        }

        let mind = world.mind("white").expect("explorer");
        assert_eq!(
            mind.state().grid_bounds,
            Some(GridBounds {
                width: 5,
                height: 3
            })
        );
        assert!(mind.state().coverage_complete());
        assert!(world.all_done());
    }
}

#[test]
fn given_any_small_grid_when_exploring_then_broadcast_within_cell_count_of_bounds() {
    let orientations = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    for strategy in STRATEGIES {
        for width in 1..=6 {
            for height in 1..=5 {
                for x in 0..width {
                    for y in 0..height {
                        for orientation in orientations {
                            let case = format!(
                                "{strategy:?} {width}x{height} from ({x},{y}) facing {orientation}"
                            );
                            let mut world = GridWorld::new(width, height).expect("world");
                            place(&mut world, "white", x, y, orientation, explorer(strategy));

                            let limit = (4 * width * height + 2 * (width + height) + 20) as u64;
                            let mut bounds_tick = None;
                            let mut broadcast_tick = None;
                            while !world.all_done() && world.tick_count() < limit {
                                let report = world.tick();
                                let mind = world.mind("white").expect("explorer");
                                if bounds_tick.is_none() && mind.state().grid_bounds.is_some() {
                                    bounds_tick = Some(report.tick);
                                }
                                if matches!(action_of(&report, "white"), Action::Broadcast(_)) {
                                    broadcast_tick = Some(report.tick);
                                }
                            }

                            assert!(world.all_done(), "{case} did not finish");
                            let bounds_tick = bounds_tick.expect("bounds should be learned");
                            let broadcast_tick = broadcast_tick.expect("map should be broadcast");
                            assert!(
                                broadcast_tick - bounds_tick <= (width * height) as u64,
                                "{case} took {} ticks to cover",
                                broadcast_tick - bounds_tick
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn given_explorer_run_when_observing_belief_then_it_only_grows_and_phases_advance() {
    let mut world = GridWorld::new(6, 4).expect("world");
    world
        .add_dirt(Coordinate::new(3, 2), DirtCategory::Green)
        .expect("dirt");
    place(
        &mut world,
        "white",
        2,
        1,
        Orientation::West,
        explorer(CoverageStrategy::Boustrophedon),
    );

    let mut previous = world.mind("white").expect("explorer").state().clone();
    while !world.all_done() && world.tick_count() < 120 {
        world.tick();
        let current = world.mind("white").expect("explorer").state().clone();

        previous
            .check_growth(&current)
            .expect("belief should only grow");
        current
            .check_invariants()
            .expect("belief should stay consistent");
        assert!(
            phase_rank(previous.phase) <= phase_rank(current.phase),
            "phase went back from {:?} to {:?}",
            previous.phase,
            current.phase
        );
        previous = current;
    }

    assert!(world.all_done());
    assert!(world.dirt().is_empty());
}
