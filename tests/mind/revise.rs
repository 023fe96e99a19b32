use sweeper::mind::{
    AgentRole, BeliefState, Coordinate, DirtCategory, GridBounds, Orientation, Phase, Pose,
    error::MindErrorKind, revise,
};

use super::{actor_at, dirt_at, open_snapshot};

#[test]
fn given_explorer_facing_east_at_edge_when_revise_then_width_is_inferred() {
    let mut state = BeliefState::new(AgentRole::Explorer);
    let pose = Pose::new(Coordinate::new(4, 0), Orientation::East);

    let outcome = revise::apply(&mut state, pose, &open_snapshot(pose, 5, 3), &[], "white")
        .expect("revise should succeed");

    assert_eq!(state.known_width, Some(5));
    assert_eq!(state.phase, Phase::FindHeight);
    assert_eq!(outcome.bounds, None);
    assert_eq!(state.tick, 1);
    assert!(state.visited.contains(&Coordinate::new(4, 0)));
    assert!(state.observed.contains(&Coordinate::new(4, 1)));
    assert_eq!(state.observed.len(), 2);
}

#[test]
fn given_width_known_when_south_edge_reached_then_bounds_are_set() {
    let mut state = BeliefState::new(AgentRole::Explorer);
    state.phase = Phase::FindHeight;
    state.known_width = Some(5);
    let pose = Pose::new(Coordinate::new(4, 2), Orientation::South);

    let outcome = revise::apply(&mut state, pose, &open_snapshot(pose, 5, 3), &[], "white")
        .expect("revise should succeed");

    let bounds = GridBounds {
        width: 5,
        height: 3,
    };
    assert_eq!(outcome.bounds, Some(bounds));
    assert_eq!(state.grid_bounds, Some(bounds));
    assert_eq!(state.phase, Phase::Coverage);
}

#[test]
fn given_find_width_facing_north_when_edge_ahead_then_nothing_is_inferred() {
    let mut state = BeliefState::new(AgentRole::Explorer);
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::North);

    revise::apply(&mut state, pose, &open_snapshot(pose, 5, 3), &[], "white")
        .expect("revise should succeed");

    assert_eq!(state.known_width, None);
    assert_eq!(state.phase, Phase::FindWidth);
}

#[test]
fn given_height_phase_without_width_when_edge_ahead_then_invariant_violation() {
    let mut state = BeliefState::new(AgentRole::Explorer);
    state.phase = Phase::FindHeight;
    let pose = Pose::new(Coordinate::new(0, 2), Orientation::South);

    let err = revise::apply(&mut state, pose, &open_snapshot(pose, 5, 3), &[], "white")
        .expect_err("height without width must fail");
    assert_eq!(err.kind, MindErrorKind::InvariantViolation);
}

#[test]
fn given_known_task_when_seen_with_other_category_then_first_sighting_wins() {
    let mut state = BeliefState::new(AgentRole::Explorer);
    state.record_task(Coordinate::new(1, 0), DirtCategory::Green);
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::East);
    let mut snapshot = open_snapshot(pose, 5, 3);
    snapshot.forward = dirt_at(1, 0, DirtCategory::Orange);

    let outcome =
        revise::apply(&mut state, pose, &snapshot, &[], "white").expect("revise should succeed");

    assert_eq!(outcome.new_tasks, 0);
    assert_eq!(
        state.task_map.get(&Coordinate::new(1, 0)),
        Some(&DirtCategory::Green)
    );
}

#[test]
fn given_known_task_when_observed_clean_then_it_is_marked_cleaned() {
    let mut state = BeliefState::new(AgentRole::Explorer);
    state.record_task(Coordinate::new(1, 0), DirtCategory::Orange);
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::East);

    let outcome = revise::apply(&mut state, pose, &open_snapshot(pose, 5, 3), &[], "white")
        .expect("revise should succeed");

    assert_eq!(outcome.newly_cleaned, 1);
    assert!(state.cleaned.contains(&Coordinate::new(1, 0)));
    // Clean cells that never held a task are not cleaning records.
    assert!(!state.cleaned.contains(&Coordinate::new(0, 1)));
    assert_eq!(state.remaining_tasks().count(), 0);
}

#[test]
fn given_cleaner_when_foreign_dirt_sighted_then_recorded_but_not_pursued() {
    let mut state = BeliefState::new(AgentRole::Cleaner {
        category: DirtCategory::Orange,
    });
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::East);
    let mut snapshot = open_snapshot(pose, 5, 3);
    snapshot.forward = dirt_at(1, 0, DirtCategory::Green);

    let outcome =
        revise::apply(&mut state, pose, &snapshot, &[], "orange").expect("revise should succeed");

    assert_eq!(outcome.new_tasks, 1);
    assert!(state.task_map.contains_key(&Coordinate::new(1, 0)));
    assert!(!state.is_remaining_task(Coordinate::new(1, 0)));
    assert_eq!(state.phase, Phase::AwaitingMap);
}

#[test]
fn given_actor_seen_then_gone_when_revising_then_obstruction_is_remembered_then_forgotten() {
    let mut state = BeliefState::new(AgentRole::Cleaner {
        category: DirtCategory::Green,
    });
    let pose = Pose::new(Coordinate::new(1, 1), Orientation::East);
    let mut snapshot = open_snapshot(pose, 4, 3);
    snapshot.forward = actor_at(2, 1);

    revise::apply(&mut state, pose, &snapshot, &[], "green").expect("revise should succeed");
    assert!(state.obstructions.contains(&Coordinate::new(2, 1)));

    revise::apply(&mut state, pose, &open_snapshot(pose, 4, 3), &[], "green")
        .expect("revise should succeed");
    assert!(state.obstructions.is_empty());
}

#[test]
fn given_sidesteps_taken_when_revisiting_recent_cell_then_count_kept_until_new_cell() {
    let mut state = BeliefState::new(AgentRole::Cleaner {
        category: DirtCategory::Green,
    });
    let first = Pose::new(Coordinate::new(0, 1), Orientation::East);
    let second = Pose::new(Coordinate::new(1, 1), Orientation::East);
    let fresh = Pose::new(Coordinate::new(2, 1), Orientation::East);

    for pose in [first, second] {
        revise::apply(&mut state, pose, &open_snapshot(pose, 4, 3), &[], "green")
            .expect("revise should succeed");
    }
    state.detour.sidesteps = 2;

    revise::apply(&mut state, first, &open_snapshot(first, 4, 3), &[], "green")
        .expect("revise should succeed");
    assert_eq!(state.detour.sidesteps, 2);

    revise::apply(&mut state, fresh, &open_snapshot(fresh, 4, 3), &[], "green")
        .expect("revise should succeed");
    assert_eq!(state.detour.sidesteps, 0);
    assert_eq!(
        state.detour.recent.iter().copied().collect::<Vec<_>>(),
        vec![
            Coordinate::new(0, 1),
            Coordinate::new(1, 1),
            Coordinate::new(0, 1),
            Coordinate::new(2, 1)
        ]
    );
}
