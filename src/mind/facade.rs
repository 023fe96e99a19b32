use crate::mind::{
    broadcast,
    error::MindError,
    exploration,
    navigation::{NavigationGoal, NavigationPlanner},
    perception::PerceptionSnapshot,
    policy::{DecisionPolicy, HeuristicPolicy, Surroundings, minimal_turn},
    ports::EnginePort,
    revise::{self, ReviseOutcome},
    state::BeliefState,
    types::{
        Action, AgentRole, Avoidance, BlockedOrigin, CoverageStrategy, Orientation, Phase, Pose,
    },
};

/// Phase changes resolved within one decide call before an action must come out.
const MAX_PHASE_HOPS: usize = 4;

/// One agent's controller. The hosting engine calls [`AgentMind::revise`] and then
/// [`AgentMind::decide`] once per tick.
pub struct AgentMind {
    state: BeliefState,
    policy: Box<dyn DecisionPolicy>,
    coverage: CoverageStrategy,
}

impl AgentMind {
    pub fn new(
        role: AgentRole,
        policy: Box<dyn DecisionPolicy>,
        coverage: CoverageStrategy,
    ) -> Self {
        Self {
            state: BeliefState::new(role),
            policy,
            coverage,
        }
    }

    pub fn with_defaults(role: AgentRole) -> Self {
        Self::new(
            role,
            Box::new(HeuristicPolicy),
            CoverageStrategy::default(),
        )
    }

    pub fn state(&self) -> &BeliefState {
        &self.state
    }

    pub fn role(&self) -> AgentRole {
        self.state.role
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state.phase, Phase::Done)
    }

    /// Folds this tick's perception and messages into the belief. A failed tick is logged and
    /// leaves the belief as it was; `None` is returned in that case.
    pub fn revise(&mut self, engine: &dyn EnginePort) -> Option<ReviseOutcome> {
        match self.try_revise(engine) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(
                    target: "mind.revise",
                    agent_id = %engine.self_id(),
                    kind = ?err.kind,
                    error = %err,
                    "revise_discarded"
                );
                None
            }
        }
    }

    /// Exactly one action for this tick. Failures degrade to `Idle` without touching the
    /// belief.
    pub fn decide(&mut self, engine: &dyn EnginePort) -> Vec<Action> {
        let action = match self.try_decide(engine) {
            Ok(action) => action,
            Err(err) => {
                tracing::warn!(
                    target: "mind.decide",
                    agent_id = %engine.self_id(),
                    kind = ?err.kind,
                    error = %err,
                    "decide_degraded_to_idle"
                );
                Action::Idle
            }
        };
        vec![action]
    }

    fn try_revise(&mut self, engine: &dyn EnginePort) -> Result<ReviseOutcome, MindError> {
        let pose = engine.pose()?;
        let snapshot = engine.perception()?;
        let messages = engine.received_messages();
        let self_id = engine.self_id();

        let mut next = self.state.clone();
        let outcome = revise::apply(&mut next, pose, &snapshot, &messages, &self_id)?;
        self.commit(next)?;

        tracing::debug!(
            target: "mind.revise",
            agent_id = %self_id,
            tick = self.state.tick,
            newly_observed = outcome.newly_observed,
            new_tasks = outcome.new_tasks,
            newly_cleaned = outcome.newly_cleaned,
            "belief_revised"
        );
        Ok(outcome)
    }

    fn try_decide(&mut self, engine: &dyn EnginePort) -> Result<Action, MindError> {
        let pose = engine.pose()?;
        let snapshot = engine.perception()?;

        let mut next = self.state.clone();
        let action = self.plan(&mut next, pose, &snapshot);
        let action = backstop(action, &mut next, pose, &snapshot);
        self.commit(next)?;

        tracing::debug!(
            target: "mind.decide",
            agent_id = %engine.self_id(),
            tick = self.state.tick,
            position = %pose.position,
            orientation = %pose.orientation,
            phase = ?self.state.phase,
            action = ?action,
            "action_decided"
        );
        Ok(action)
    }

    fn commit(&mut self, next: BeliefState) -> Result<(), MindError> {
        next.check_invariants()?;
        self.state.check_growth(&next)?;
        if self.state.phase != next.phase {
            tracing::info!(
                target: "mind.decide",
                from = ?self.state.phase,
                to = ?next.phase,
                tick = next.tick,
                "phase_transition"
            );
        }
        self.state = next;
        Ok(())
    }

    fn plan(&self, state: &mut BeliefState, pose: Pose, snapshot: &PerceptionSnapshot) -> Action {
        let planner = NavigationPlanner::new(self.policy.as_ref());

        for _ in 0..MAX_PHASE_HOPS {
            match state.phase {
                Phase::FindWidth => {
                    return exploration::find_boundary(state, pose, snapshot, Orientation::East);
                }
                Phase::FindHeight => {
                    return exploration::find_boundary(state, pose, snapshot, Orientation::South);
                }
                Phase::Coverage
                | Phase::Blocked {
                    origin: BlockedOrigin::Coverage,
                } => {
                    if state.coverage_complete() {
                        state.phase = Phase::Broadcasting;
                        state.avoidance = Avoidance::Clear;
                        state.detour.reset();
                        continue;
                    }
                    // A lane sweep cannot route around parked agents.
                    let strategy = if state.detour.engaged {
                        CoverageStrategy::NearestUnobserved
                    } else {
                        self.coverage
                    };
                    let target = exploration::coverage_target(state, pose, strategy);
                    return planner.next_action(
                        state,
                        pose,
                        snapshot,
                        NavigationGoal::explore(target),
                    );
                }
                Phase::Broadcasting => match broadcast::emit(state) {
                    Some(tasks) => return Action::Broadcast(tasks),
                    None => {
                        state.phase = Phase::Cleaning;
                        continue;
                    }
                },
                Phase::AwaitingMap => {
                    if !state.map_received {
                        return Action::Idle;
                    }
                    state.phase = Phase::Cleaning;
                }
                Phase::Cleaning
                | Phase::Blocked {
                    origin: BlockedOrigin::Cleaning,
                } => {
                    let Some(target) = exploration::cleaning_target(state, pose) else {
                        state.phase = Phase::Done;
                        state.avoidance = Avoidance::Clear;
                        state.detour.reset();
                        continue;
                    };
                    return planner.next_action(
                        state,
                        pose,
                        snapshot,
                        NavigationGoal::clean(Some(target)),
                    );
                }
                Phase::Done => return Action::Idle,
            }
        }

        Action::Idle
    }
}

/// Last line of defence: no decision path may move into an obstructed forward cell.
fn backstop(
    action: Action,
    state: &mut BeliefState,
    pose: Pose,
    snapshot: &PerceptionSnapshot,
) -> Action {
    if !action.is_move() || !snapshot.forward_blocked() {
        return action;
    }
    let surroundings = Surroundings::assess(state, pose, snapshot);
    let replacement = minimal_turn(
        pose.orientation,
        pose.orientation,
        true,
        surroundings.left_free,
        surroundings.right_free,
    );
    state.avoidance = Avoidance::Clear;
    tracing::warn!(
        target: "mind.decide",
        position = %pose.position,
        orientation = %pose.orientation,
        replacement = ?replacement,
        "unsafe_move_overridden"
    );
    replacement
}
