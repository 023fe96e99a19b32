use crate::mind::{
    broadcast::{self, MergeReport},
    error::{MindError, invariant_violation},
    perception::PerceptionSnapshot,
    state::BeliefState,
    types::{BroadcastMessage, GridBounds, Orientation, Phase, Pose},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviseOutcome {
    pub newly_observed: usize,
    pub new_tasks: usize,
    pub newly_cleaned: usize,
    pub merged: Option<MergeReport>,
    pub bounds: Option<GridBounds>,
}

/// Folds one tick of perception and mail into `state`. Produces no action.
pub fn apply(
    state: &mut BeliefState,
    pose: Pose,
    snapshot: &PerceptionSnapshot,
    messages: &[BroadcastMessage],
    self_id: &str,
) -> Result<ReviseOutcome, MindError> {
    let mut outcome = ReviseOutcome::default();
    state.tick = state.tick.saturating_add(1);

    for cell in snapshot.cells() {
        if state.observed.insert(cell.coordinate) {
            outcome.newly_observed += 1;
        }
        if let Some(category) = cell.dirt
            && state.record_task(cell.coordinate, category)
        {
            outcome.new_tasks += 1;
            tracing::debug!(
                target: "mind.revise",
                coordinate = %cell.coordinate,
                category = %category,
                "dirt_sighted"
            );
        }
    }
    state.observed.insert(pose.position);
    state.visited.insert(pose.position);
    remember_obstructions(state, pose, snapshot);
    state.detour.record_position(pose.position);

    outcome.merged = broadcast::receive(state, messages, self_id);

    for cell in snapshot.cells() {
        if cell.dirt.is_none() && state.mark_cleaned(cell.coordinate) {
            outcome.newly_cleaned += 1;
        }
    }

    outcome.bounds = infer_bounds(state, pose, snapshot)?;
    Ok(outcome)
}

fn remember_obstructions(state: &mut BeliefState, pose: Pose, snapshot: &PerceptionSnapshot) {
    for cell in snapshot.cells() {
        if cell.is_obstructed() && cell.coordinate != pose.position {
            state.obstructions.insert(cell.coordinate);
        } else {
            state.obstructions.remove(&cell.coordinate);
        }
    }
    state.obstructions.remove(&pose.position);
}

fn infer_bounds(
    state: &mut BeliefState,
    pose: Pose,
    snapshot: &PerceptionSnapshot,
) -> Result<Option<GridBounds>, MindError> {
    if !snapshot.boundary_ahead() {
        return Ok(None);
    }

    match (state.phase, pose.orientation) {
        (Phase::FindWidth, Orientation::East) => {
            let width = pose.position.x + 1;
            state.known_width = Some(width);
            state.phase = Phase::FindHeight;
            tracing::info!(target: "mind.revise", width, "grid_width_inferred");
            Ok(None)
        }
        (Phase::FindHeight, Orientation::South) => {
            let Some(width) = state.known_width else {
                return Err(invariant_violation("height found before width"));
            };
            let bounds = GridBounds {
                width,
                height: pose.position.y + 1,
            };
            state.set_grid_bounds(bounds)?;
            state.phase = Phase::Coverage;
            tracing::info!(
                target: "mind.revise",
                width = bounds.width,
                height = bounds.height,
                "grid_height_inferred"
            );
            Ok(Some(bounds))
        }
        _ => Ok(None),
    }
}
