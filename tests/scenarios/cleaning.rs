use sweeper::{
    mind::{Action, Coordinate, DirtCategory, Orientation, Phase, Pose},
    world::GridWorld,
};

use super::{LEFT, RIGHT, action_of, cleaner, map_from_white, place};

#[test]
fn given_cleaner_with_map_when_running_then_walks_to_task_and_cleans_it() {
    let mut world = GridWorld::new(5, 3).expect("world");
    world
        .add_dirt(Coordinate::new(2, 1), DirtCategory::Orange)
        .expect("dirt");
    place(&mut world, "orange", 0, 0, Orientation::North, cleaner(DirtCategory::Orange));
    world
        .inject_message("orange", map_from_white(&[(2, 1, "orange")]))
        .expect("message");

    let expected = [
        (RIGHT, Phase::Cleaning),
        (Action::Move, Phase::Cleaning),
        (Action::Move, Phase::Cleaning),
        (RIGHT, Phase::Cleaning),
        (Action::Move, Phase::Cleaning),
        (Action::Clean, Phase::Cleaning),
        (Action::Idle, Phase::Done),
        (Action::Idle, Phase::Done),
    ];
    for (index, (action, phase)) in expected.into_iter().enumerate() {
        let report = world.tick();
        assert_eq!(action_of(&report, "orange"), action, "tick {}", index + 1);
        assert_eq!(
            world.mind("orange").expect("cleaner").phase(),
            phase,
            "tick {}",
            index + 1
        );
    }

    assert!(world.dirt().is_empty());
    assert_eq!(
        world.pose_of("orange").expect("pose"),
        Pose::new(Coordinate::new(2, 1), Orientation::South)
    );
}

#[test]
fn given_two_cleaners_face_to_face_when_running_then_both_sidestep_and_finish() {
    let mut world = GridWorld::new(4, 3).expect("world");
    world
        .add_dirt(Coordinate::new(3, 1), DirtCategory::Orange)
        .expect("dirt");
    world
        .add_dirt(Coordinate::new(0, 1), DirtCategory::Green)
        .expect("dirt");
    place(&mut world, "orange", 1, 1, Orientation::East, cleaner(DirtCategory::Orange));
    place(&mut world, "green", 2, 1, Orientation::West, cleaner(DirtCategory::Green));
    let map = map_from_white(&[(3, 1, "orange"), (0, 1, "green")]);
    world.inject_message("orange", map.clone()).expect("message");
    world.inject_message("green", map).expect("message");

    let expected = [
        LEFT,
        Action::Move,
        RIGHT,
        Action::Move,
        Action::Move,
        RIGHT,
        Action::Move,
        Action::Clean,
        Action::Idle,
    ];
    for (index, action) in expected.into_iter().enumerate() {
        let report = world.tick();
        for id in ["orange", "green"] {
            assert_eq!(action_of(&report, id), action, "{id} at tick {}", index + 1);
            assert!(report.actions.iter().all(|applied| applied.applied));
        }
    }

    assert!(world.all_done());
    assert!(world.dirt().is_empty());
    assert_eq!(
        world.pose_of("orange").expect("pose").position,
        Coordinate::new(3, 1)
    );
    assert_eq!(
        world.pose_of("green").expect("pose").position,
        Coordinate::new(0, 1)
    );
}

#[test]
fn given_cleaner_when_map_lists_foreign_dirt_only_then_done_without_moving() {
    let mut world = GridWorld::new(3, 3).expect("world");
    world
        .add_dirt(Coordinate::new(2, 2), DirtCategory::Orange)
        .expect("dirt");
    place(&mut world, "green", 1, 1, Orientation::North, cleaner(DirtCategory::Green));
    world
        .inject_message("green", map_from_white(&[(2, 2, "orange")]))
        .expect("message");

    let report = world.tick();

    assert_eq!(action_of(&report, "green"), Action::Idle);
    assert!(world.all_done());
    assert_eq!(world.dirt().len(), 1);
}

#[test]
fn given_sensors_offline_when_ticking_then_agent_idles_with_belief_untouched() {
    let mut world = GridWorld::new(5, 3).expect("world");
    place(
        &mut world,
        "white",
        0,
        0,
        Orientation::North,
        super::explorer(Default::default()),
    );
    world.set_sensors_online("white", false).expect("agent");
    let before = world.mind("white").expect("explorer").state().clone();

    let report = world.tick();

    assert_eq!(action_of(&report, "white"), Action::Idle);
    assert_eq!(world.mind("white").expect("explorer").state(), &before);

    world.set_sensors_online("white", true).expect("agent");
    let report = world.tick();
    assert_eq!(action_of(&report, "white"), RIGHT);
}

#[test]
fn given_finished_cleaners_parked_across_the_route_when_running_then_detours_around_them() {
    let mut world = GridWorld::new(5, 5).expect("world");
    world
        .add_dirt(Coordinate::new(1, 1), DirtCategory::Orange)
        .expect("dirt");
    place(&mut world, "orange", 0, 4, Orientation::North, cleaner(DirtCategory::Orange));
    place(&mut world, "green", 0, 3, Orientation::North, cleaner(DirtCategory::Green));
    place(&mut world, "green-2", 1, 3, Orientation::North, cleaner(DirtCategory::Green));
    for id in ["orange", "green", "green-2"] {
        world
            .inject_message(id, map_from_white(&[(1, 1, "orange")]))
            .expect("message");
    }

    // Two rounds of sidestepping between (0,4) and (1,4), then the way round through column 2.
    let expected = [
        RIGHT,
        Action::Move,
        LEFT,
        LEFT,
        Action::Move,
        RIGHT,
        RIGHT,
        Action::Move,
        LEFT,
        RIGHT,
        Action::Move,
        LEFT,
        Action::Move,
        Action::Move,
        Action::Move,
        LEFT,
        Action::Move,
        Action::Clean,
        Action::Idle,
    ];
    for (index, action) in expected.into_iter().enumerate() {
        let report = world.tick();
        assert_eq!(action_of(&report, "orange"), action, "tick {}", index + 1);
        for id in ["green", "green-2"] {
            assert_eq!(action_of(&report, id), Action::Idle, "{id} at tick {}", index + 1);
        }
    }

    assert!(world.all_done());
    assert!(world.dirt().is_empty());
    assert_eq!(
        world.pose_of("orange").expect("pose"),
        Pose::new(Coordinate::new(1, 1), Orientation::West)
    );
}
