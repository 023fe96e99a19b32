use crate::mind::{
    perception::{CellObservation, PerceptionSnapshot, side_coordinates},
    state::BeliefState,
    types::{Action, Coordinate, GridBounds, Orientation, Phase, Pose, TurnDirection},
};

/// What the cells around the agent allow this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surroundings {
    pub wall_ahead: bool,
    pub actor_ahead: bool,
    pub left_free: bool,
    pub right_free: bool,
    pub left_unvisited: bool,
    pub right_unvisited: bool,
}

impl Surroundings {
    pub fn assess(state: &BeliefState, pose: Pose, snapshot: &PerceptionSnapshot) -> Self {
        let (left_coordinate, right_coordinate) = side_coordinates(pose);
        let side_free = |cell: Option<CellObservation>, coordinate: Coordinate| match cell {
            Some(cell) => !cell.is_obstructed(),
            None => !state.known_out_of_bounds(coordinate),
        };

        Self {
            wall_ahead: snapshot.wall_ahead(),
            actor_ahead: snapshot.actor_ahead(),
            left_free: side_free(snapshot.left, left_coordinate),
            right_free: side_free(snapshot.right, right_coordinate),
            left_unvisited: !state.visited.contains(&left_coordinate),
            right_unvisited: !state.visited.contains(&right_coordinate),
        }
    }

    pub fn forward_blocked(&self) -> bool {
        self.wall_ahead || self.actor_ahead
    }

    /// A free side, left first.
    pub fn free_side(&self) -> Option<TurnDirection> {
        if self.left_free {
            Some(TurnDirection::Left)
        } else if self.right_free {
            Some(TurnDirection::Right)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    /// Ordinary progress toward the target.
    Pursue,
    /// Forward stayed obstructed; pick a side to escape through.
    Escape,
}

pub struct DecisionContext<'a> {
    pub pose: Pose,
    pub snapshot: &'a PerceptionSnapshot,
    pub target: Coordinate,
    pub desired: Orientation,
    pub surroundings: Surroundings,
    pub situation: Situation,
    pub phase: Phase,
    pub grid_bounds: Option<GridBounds>,
}

pub trait DecisionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn propose_action(&self, ctx: &DecisionContext<'_>) -> Action;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl DecisionPolicy for HeuristicPolicy {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn propose_action(&self, ctx: &DecisionContext<'_>) -> Action {
        match ctx.situation {
            Situation::Pursue => minimal_turn(
                ctx.pose.orientation,
                ctx.desired,
                ctx.surroundings.forward_blocked(),
                ctx.surroundings.left_free,
                ctx.surroundings.right_free,
            ),
            Situation::Escape => escape_turn(&ctx.surroundings),
        }
    }
}

/// Orientation that closes the larger axis gap first. Equal gaps favour the x axis; no gap
/// keeps the current orientation.
pub fn desired_orientation(from: Coordinate, to: Coordinate, current: Orientation) -> Orientation {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx != 0 && dx.abs() >= dy.abs() {
        if dx > 0 {
            Orientation::East
        } else {
            Orientation::West
        }
    } else if dy != 0 {
        if dy > 0 {
            Orientation::South
        } else {
            Orientation::North
        }
    } else {
        current
    }
}

/// Shortest rotation toward `desired`, or a move once aligned.
///
/// A 180° turn goes to a free side, left first; with both sides blocked it turns right. The
/// right-hand default is an arbitrary fixed choice.
pub fn minimal_turn(
    current: Orientation,
    desired: Orientation,
    forward_blocked: bool,
    left_free: bool,
    right_free: bool,
) -> Action {
    match current.quarter_turns_to(desired) {
        0 if !forward_blocked => Action::Move,
        0 if left_free => Action::Turn(TurnDirection::Left),
        0 if right_free => Action::Turn(TurnDirection::Right),
        0 => Action::Idle,
        1 => Action::Turn(TurnDirection::Right),
        2 if left_free => Action::Turn(TurnDirection::Left),
        2 => Action::Turn(TurnDirection::Right),
        _ => Action::Turn(TurnDirection::Left),
    }
}

/// Blocked-state side choice: free and unvisited first, then any free side, left before
/// right; idle when boxed in.
pub fn escape_turn(surroundings: &Surroundings) -> Action {
    let left_fresh = surroundings.left_free && surroundings.left_unvisited;
    let right_fresh = surroundings.right_free && surroundings.right_unvisited;
    if left_fresh {
        Action::Turn(TurnDirection::Left)
    } else if right_fresh {
        Action::Turn(TurnDirection::Right)
    } else {
        match surroundings.free_side() {
            Some(side) => Action::Turn(side),
            None => Action::Idle,
        }
    }
}

/// Rejects a forward move into an obstructed cell, whichever policy proposed it.
pub fn enforce_safety(proposed: Action, ctx: &DecisionContext<'_>) -> Action {
    if !proposed.is_move() || !ctx.surroundings.forward_blocked() {
        return proposed;
    }
    let replacement = minimal_turn(
        ctx.pose.orientation,
        ctx.desired,
        true,
        ctx.surroundings.left_free,
        ctx.surroundings.right_free,
    );
    tracing::warn!(
        target: "mind.decide",
        position = %ctx.pose.position,
        orientation = %ctx.pose.orientation,
        replacement = ?replacement,
        "unsafe_move_overridden"
    );
    replacement
}
