mod cleaning;
mod exploration;

use serde_json::json;
use sweeper::{
    mind::{
        Action, AgentMind, AgentRole, BroadcastMessage, Coordinate, CoverageStrategy,
        DirtCategory, HeuristicPolicy, Orientation, Phase, Pose, TurnDirection,
    },
    world::{GridWorld, TickReport},
};

pub const LEFT: Action = Action::Turn(TurnDirection::Left);
pub const RIGHT: Action = Action::Turn(TurnDirection::Right);

pub fn explorer(strategy: CoverageStrategy) -> AgentMind {
    AgentMind::new(AgentRole::Explorer, Box::new(HeuristicPolicy), strategy)
}

pub fn cleaner(category: DirtCategory) -> AgentMind {
    AgentMind::with_defaults(AgentRole::Cleaner { category })
}

pub fn place(
    world: &mut GridWorld,
    id: &str,
    x: i32,
    y: i32,
    orientation: Orientation,
    mind: AgentMind,
) {
    world
        .add_agent(id, Pose::new(Coordinate::new(x, y), orientation), mind)
        .expect("agent should be placed");
}

/// A task broadcast as an explorer called `white` would send it.
pub fn map_from_white(tasks: &[(i32, i32, &str)]) -> BroadcastMessage {
    let entries: Vec<_> = tasks
        .iter()
        .map(|(x, y, category)| json!({"x": x, "y": y, "category": category}))
        .collect();
    BroadcastMessage {
        sender: "white".to_string(),
        content: json!({ "tasks": entries }),
    }
}

pub fn action_of(report: &TickReport, id: &str) -> Action {
    report
        .actions
        .iter()
        .find(|applied| applied.agent_id == id)
        .map(|applied| applied.action.clone())
        .expect("agent should have acted")
}

/// Position of a phase along the expected lifecycle. Blocked excursions rank with their origin.
pub fn phase_rank(phase: Phase) -> u8 {
    match phase.resolved() {
        Phase::FindWidth => 0,
        Phase::FindHeight => 1,
        Phase::Coverage => 2,
        Phase::Broadcasting | Phase::AwaitingMap => 3,
        Phase::Cleaning => 4,
        Phase::Done => 5,
        Phase::Blocked { .. } => unreachable!("resolved phases are never blocked"),
    }
}
