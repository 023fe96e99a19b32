use std::collections::{BTreeMap, VecDeque};

use crate::mind::{
    perception::PerceptionSnapshot,
    policy::{
        DecisionContext, DecisionPolicy, Situation, Surroundings, desired_orientation,
        enforce_safety,
    },
    state::BeliefState,
    types::{
        Action, Avoidance, BlockedOrigin, Coordinate, GridBounds, Orientation, Phase, Pose,
        TurnDirection,
    },
};

/// Sidesteps among recently held cells tolerated before routing around obstructions.
pub const MAX_FRUITLESS_SIDESTEPS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationGoal {
    pub target: Option<Coordinate>,
    /// Clean a remaining task underfoot before moving on.
    pub may_clean: bool,
    pub origin: BlockedOrigin,
}

impl NavigationGoal {
    pub fn explore(target: Option<Coordinate>) -> Self {
        Self {
            target,
            may_clean: false,
            origin: BlockedOrigin::Coverage,
        }
    }

    pub fn clean(target: Option<Coordinate>) -> Self {
        Self {
            target,
            may_clean: true,
            origin: BlockedOrigin::Cleaning,
        }
    }
}

/// Target pursuit with actor avoidance and blocked-state escape. Identical for coverage and
/// cleaning; only the goal differs.
pub struct NavigationPlanner<'p> {
    policy: &'p dyn DecisionPolicy,
}

impl<'p> NavigationPlanner<'p> {
    pub fn new(policy: &'p dyn DecisionPolicy) -> Self {
        Self { policy }
    }

    pub fn next_action(
        &self,
        state: &mut BeliefState,
        pose: Pose,
        snapshot: &PerceptionSnapshot,
        goal: NavigationGoal,
    ) -> Action {
        if goal.may_clean
            && snapshot.dirt_here().is_some()
            && state.is_remaining_task(pose.position)
        {
            state.mark_cleaned(pose.position);
            state.avoidance = Avoidance::Clear;
            state.detour.reset();
            tracing::info!(target: "mind.navigation", position = %pose.position, "clean");
            return Action::Clean;
        }

        let Some(target) = goal.target else {
            return Action::Idle;
        };
        if target == pose.position {
            return Action::Idle;
        }
        let surroundings = Surroundings::assess(state, pose, snapshot);
        let mut desired = desired_orientation(pose.position, target, pose.orientation);
        if state.detour.engaged
            && let Some(heading) = detour_orientation(state, pose, target)
        {
            desired = heading;
        }

        if let Phase::Blocked { origin } = state.phase {
            if !surroundings.forward_blocked() {
                state.phase = origin.phase();
                state.avoidance = Avoidance::Clear;
                tracing::info!(
                    target: "mind.navigation",
                    position = %pose.position,
                    resumed = ?state.phase,
                    "blocked_cleared"
                );
                return Action::Move;
            }
            return self.consult(
                state,
                pose,
                snapshot,
                target,
                desired,
                surroundings,
                Situation::Escape,
            );
        }

        match state.avoidance {
            Avoidance::PendingReversion { turned } => {
                if !surroundings.forward_blocked() {
                    state.avoidance = Avoidance::Clear;
                    return Action::Move;
                }
                state.avoidance = Avoidance::Reverted;
                tracing::debug!(
                    target: "mind.navigation",
                    position = %pose.position,
                    "avoidance_turn_reverted"
                );
                return Action::Turn(turned.opposite());
            }
            Avoidance::Reverted => {
                state.avoidance = Avoidance::Clear;
                if surroundings.actor_ahead {
                    return self.enter_blocked(
                        state,
                        pose,
                        snapshot,
                        target,
                        desired,
                        surroundings,
                        goal.origin,
                    );
                }
            }
            Avoidance::Clear => {}
        }

        if surroundings.actor_ahead
            && !state.detour.engaged
            && state.detour.sidesteps >= MAX_FRUITLESS_SIDESTEPS
        {
            state.detour.engaged = true;
            let heading = detour_orientation(state, pose, target);
            tracing::info!(
                target: "mind.navigation",
                position = %pose.position,
                goal = %target,
                heading = ?heading,
                "detour_engaged"
            );
            if let Some(heading) = heading
                && heading != pose.orientation
            {
                return self.consult(
                    state,
                    pose,
                    snapshot,
                    target,
                    heading,
                    surroundings,
                    Situation::Pursue,
                );
            }
        }

        if surroundings.actor_ahead {
            return match surroundings.free_side() {
                Some(side) => {
                    state.avoidance = Avoidance::PendingReversion { turned: side };
                    state.detour.sidesteps = state.detour.sidesteps.saturating_add(1);
                    tracing::debug!(
                        target: "mind.navigation",
                        position = %pose.position,
                        side = ?side,
                        "actor_ahead_avoidance_turn"
                    );
                    Action::Turn(side)
                }
                None => self.enter_blocked(
                    state,
                    pose,
                    snapshot,
                    target,
                    desired,
                    surroundings,
                    goal.origin,
                ),
            };
        }

        self.consult(
            state,
            pose,
            snapshot,
            target,
            desired,
            surroundings,
            Situation::Pursue,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn enter_blocked(
        &self,
        state: &mut BeliefState,
        pose: Pose,
        snapshot: &PerceptionSnapshot,
        target: Coordinate,
        desired: Orientation,
        surroundings: Surroundings,
        origin: BlockedOrigin,
    ) -> Action {
        state.phase = Phase::Blocked { origin };
        tracing::info!(
            target: "mind.navigation",
            position = %pose.position,
            origin = ?origin,
            "blocked_entered"
        );
        self.consult(state, pose, snapshot, target, desired, surroundings, Situation::Escape)
    }

    #[allow(clippy::too_many_arguments)]
    fn consult(
        &self,
        state: &BeliefState,
        pose: Pose,
        snapshot: &PerceptionSnapshot,
        target: Coordinate,
        desired: Orientation,
        surroundings: Surroundings,
        situation: Situation,
    ) -> Action {
        let ctx = DecisionContext {
            pose,
            snapshot,
            target,
            desired,
            surroundings,
            situation,
            phase: state.phase,
            grid_bounds: state.grid_bounds,
        };
        let proposed = self.policy.propose_action(&ctx);
        tracing::trace!(
            target: "mind.navigation",
            policy = self.policy.name(),
            situation = ?situation,
            proposed = ?proposed,
            "policy_proposal"
        );
        enforce_safety(proposed, &ctx)
    }
}

/// First step of a shortest path to `target` that avoids remembered obstructions, preferring
/// the current heading and then clockwise. The search stays inside the grid bounds or, when
/// those were never measured, inside the rectangle spanned by cells already seen.
pub fn detour_orientation(
    state: &BeliefState,
    pose: Pose,
    target: Coordinate,
) -> Option<Orientation> {
    let extent = search_extent(state, pose.position, target);
    let passable = |cell: Coordinate| {
        extent.contains(cell) && (cell == target || !state.obstructions.contains(&cell))
    };

    let mut distance = BTreeMap::from([(target, 0u32)]);
    let mut frontier = VecDeque::from([target]);
    while let Some(cell) = frontier.pop_front() {
        let next = distance.get(&cell).copied().unwrap_or_default() + 1;
        for orientation in Orientation::ALL {
            let neighbour = cell.step(orientation);
            if passable(neighbour) && !distance.contains_key(&neighbour) {
                distance.insert(neighbour, next);
                frontier.push_back(neighbour);
            }
        }
    }

    let here = distance.get(&pose.position).copied()?;
    let mut heading = pose.orientation;
    for _ in 0..Orientation::ALL.len() {
        if here > 0 && distance.get(&pose.position.step(heading)) == Some(&(here - 1)) {
            return Some(heading);
        }
        heading = heading.turned(TurnDirection::Right);
    }
    None
}

fn search_extent(state: &BeliefState, position: Coordinate, target: Coordinate) -> GridBounds {
    if let Some(bounds) = state.grid_bounds {
        return bounds;
    }
    let seen = state
        .observed
        .iter()
        .chain(&state.visited)
        .copied()
        .chain([position, target]);
    let (max_x, max_y) = seen.fold((0, 0), |(x, y), cell| (x.max(cell.x), y.max(cell.y)));
    GridBounds {
        width: max_x + 1,
        height: max_y + 1,
    }
}
