use crate::mind::{
    perception::PerceptionSnapshot,
    policy::{Surroundings, minimal_turn},
    state::{BeliefState, SweepState},
    types::{Action, Avoidance, Coordinate, CoverageStrategy, Orientation, Pose, RowDirection},
};

/// Boundary discovery: walk in `facing` until the grid edge shows up ahead. The edge itself
/// is recognised by the revise step; this only produces the walk.
///
/// Anything obstructing the walk before the edge is stepped around sideways, since the
/// width and height can be read on any row or column.
pub fn find_boundary(
    state: &mut BeliefState,
    pose: Pose,
    snapshot: &PerceptionSnapshot,
    facing: Orientation,
) -> Action {
    let surroundings = Surroundings::assess(state, pose, snapshot);

    match state.avoidance {
        Avoidance::PendingReversion { turned } => {
            if !surroundings.forward_blocked() {
                state.avoidance = Avoidance::Clear;
                return Action::Move;
            }
            state.avoidance = Avoidance::Reverted;
            return Action::Turn(turned.opposite());
        }
        Avoidance::Reverted => {
            state.avoidance = Avoidance::Clear;
            if surroundings.forward_blocked() && pose.orientation == facing {
                // Give the other actor a tick to move off before sidestepping again.
                return Action::Idle;
            }
        }
        Avoidance::Clear => {}
    }

    if pose.orientation != facing {
        return minimal_turn(
            pose.orientation,
            facing,
            surroundings.forward_blocked(),
            surroundings.left_free,
            surroundings.right_free,
        );
    }

    if snapshot.boundary_ahead() {
        return Action::Idle;
    }

    if surroundings.forward_blocked() {
        return match surroundings.free_side() {
            Some(side) => {
                state.avoidance = Avoidance::PendingReversion { turned: side };
                tracing::debug!(
                    target: "mind.decide",
                    position = %pose.position,
                    side = ?side,
                    "boundary_walk_sidestep"
                );
                Action::Turn(side)
            }
            None => Action::Idle,
        };
    }

    Action::Move
}

/// Next coverage target, or `None` when nothing is left to observe.
pub fn coverage_target(
    state: &mut BeliefState,
    pose: Pose,
    strategy: CoverageStrategy,
) -> Option<Coordinate> {
    match strategy {
        CoverageStrategy::NearestUnobserved => nearest_unobserved(state, pose),
        CoverageStrategy::Boustrophedon => {
            sweep_target(state, pose).or_else(|| nearest_unobserved(state, pose))
        }
    }
}

pub fn nearest_unobserved(state: &BeliefState, pose: Pose) -> Option<Coordinate> {
    nearest(pose.position, state.unobserved_cells())
}

/// Nearest task this agent still has to clean.
pub fn cleaning_target(state: &BeliefState, pose: Pose) -> Option<Coordinate> {
    nearest(
        pose.position,
        state.remaining_tasks().map(|task| task.coordinate),
    )
}

/// Minimum Manhattan distance, ties broken row-major.
fn nearest(from: Coordinate, cells: impl IntoIterator<Item = Coordinate>) -> Option<Coordinate> {
    cells
        .into_iter()
        .min_by_key(|cell| (from.manhattan(*cell), *cell))
}

/// Row sweep starting on the bottom row heading west. Rows already fully observed are
/// skipped; reaching a row end moves the sweep up and reverses it. Off the sweep row the
/// target is the row cell straight above, so the climb happens before the traverse.
fn sweep_target(state: &mut BeliefState, pose: Pose) -> Option<Coordinate> {
    let bounds = state.grid_bounds?;
    let mut sweep = state.sweep.unwrap_or(SweepState {
        row: bounds.height - 1,
        direction: RowDirection::West,
    });

    loop {
        if sweep.row < 0 {
            state.sweep = Some(sweep);
            return None;
        }
        let row_observed =
            (0..bounds.width).all(|x| state.observed.contains(&Coordinate::new(x, sweep.row)));
        if row_observed {
            sweep.row -= 1;
            continue;
        }
        let row_end = match sweep.direction {
            RowDirection::West => Coordinate::new(0, sweep.row),
            RowDirection::East => Coordinate::new(bounds.width - 1, sweep.row),
        };
        if pose.position == row_end {
            sweep = SweepState {
                row: sweep.row - 1,
                direction: sweep.direction.reversed(),
            };
            tracing::debug!(
                target: "mind.decide",
                row = sweep.row,
                direction = ?sweep.direction,
                "sweep_row_advanced"
            );
            continue;
        }

        state.sweep = Some(sweep);
        if pose.position.y != sweep.row {
            return Some(Coordinate::new(pose.position.x, sweep.row));
        }
        return Some(row_end);
    }
}
