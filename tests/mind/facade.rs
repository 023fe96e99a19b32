use serde_json::json;
use sweeper::mind::{
    Action, AgentMind, AgentRole, Coordinate, CoverageStrategy, DecisionContext, DecisionPolicy,
    DirtCategory, Orientation, Phase, Pose, TurnDirection,
};

use super::{FakeEngine, actor_at, open_snapshot, task_message};

/// Always proposes walking forward, obstacles or not.
struct RecklessPolicy;

impl DecisionPolicy for RecklessPolicy {
    fn name(&self) -> &'static str {
        "reckless"
    }

    fn propose_action(&self, _ctx: &DecisionContext<'_>) -> Action {
        Action::Move
    }
}

fn orange_cleaner(policy: Box<dyn DecisionPolicy>) -> AgentMind {
    AgentMind::new(
        AgentRole::Cleaner {
            category: DirtCategory::Orange,
        },
        policy,
        CoverageStrategy::default(),
    )
}

#[test]
fn given_explorer_facing_north_in_corner_when_deciding_then_turns_right_toward_east() {
    let mut mind = AgentMind::with_defaults(AgentRole::Explorer);
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::North);
    let engine = FakeEngine::new("white", pose, open_snapshot(pose, 5, 3));

    mind.revise(&engine).expect("revise should succeed");
    let actions = mind.decide(&engine);

    assert_eq!(actions, vec![Action::Turn(TurnDirection::Right)]);
    assert_eq!(mind.phase(), Phase::FindWidth);
}

#[test]
fn given_sensors_offline_when_revise_and_decide_then_idle_and_belief_untouched() {
    let mut mind = AgentMind::with_defaults(AgentRole::Explorer);
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::North);
    let mut engine = FakeEngine::new("white", pose, open_snapshot(pose, 5, 3));
    engine.sensors_online = false;
    let before = mind.state().clone();

    assert!(mind.revise(&engine).is_none());
    let actions = mind.decide(&engine);

    assert_eq!(actions, vec![Action::Idle]);
    assert_eq!(mind.state(), &before);
    assert_eq!(engine.perception_calls.get(), 2);
}

#[test]
fn given_revised_belief_when_sensors_drop_before_decide_then_belief_is_kept() {
    let mut mind = AgentMind::with_defaults(AgentRole::Explorer);
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::North);
    let mut engine = FakeEngine::new("white", pose, open_snapshot(pose, 5, 3));

    mind.revise(&engine).expect("revise should succeed");
    let revised = mind.state().clone();
    engine.sensors_online = false;

    assert_eq!(mind.decide(&engine), vec![Action::Idle]);
    assert_eq!(mind.state(), &revised);
}

#[test]
fn given_cleaner_without_map_when_deciding_then_waits_idle() {
    let mut mind = AgentMind::with_defaults(AgentRole::Cleaner {
        category: DirtCategory::Green,
    });
    let pose = Pose::new(Coordinate::new(1, 1), Orientation::South);
    let engine = FakeEngine::new("green", pose, open_snapshot(pose, 3, 3));

    mind.revise(&engine).expect("revise should succeed");

    assert_eq!(mind.decide(&engine), vec![Action::Idle]);
    assert_eq!(mind.phase(), Phase::AwaitingMap);
}

#[test]
fn given_map_without_own_tasks_when_deciding_then_cleaner_is_done() {
    let mut mind = AgentMind::with_defaults(AgentRole::Cleaner {
        category: DirtCategory::Green,
    });
    let pose = Pose::new(Coordinate::new(1, 1), Orientation::South);
    let mut engine = FakeEngine::new("green", pose, open_snapshot(pose, 3, 3));
    engine.messages.push(task_message(
        "white",
        json!({"tasks": [{"x": 0, "y": 0, "category": "orange"}]}),
    ));

    mind.revise(&engine).expect("revise should succeed");

    assert_eq!(mind.decide(&engine), vec![Action::Idle]);
    assert!(mind.is_done());
}

#[test]
fn given_reckless_policy_when_forward_is_obstructed_then_no_move_comes_out() {
    let orientations = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    for orientation in orientations {
        for actor_ahead in [false, true] {
            let mut mind = orange_cleaner(Box::new(RecklessPolicy));
            let pose = Pose::new(Coordinate::new(0, 0), orientation);
            let mut snapshot = open_snapshot(pose, 3, 3);
            if actor_ahead && let Some(cell) = snapshot.forward {
                snapshot.forward = actor_at(cell.coordinate.x, cell.coordinate.y);
            }
            let mut engine = FakeEngine::new("orange", pose, snapshot.clone());
            engine.messages.push(task_message(
                "white",
                json!({"tasks": [{"x": 2, "y": 2, "category": "orange"}]}),
            ));

            mind.revise(&engine).expect("revise should succeed");
            let actions = mind.decide(&engine);

            assert_eq!(actions.len(), 1);
            if snapshot.forward_blocked() {
                assert_ne!(
                    actions[0],
                    Action::Move,
                    "moved into an obstructed cell facing {orientation}"
                );
            }
        }
    }
}

#[test]
fn given_reckless_policy_facing_wall_when_pursuing_then_turns_toward_target() {
    let mut mind = orange_cleaner(Box::new(RecklessPolicy));
    let pose = Pose::new(Coordinate::new(0, 0), Orientation::North);
    let mut engine = FakeEngine::new("orange", pose, open_snapshot(pose, 3, 3));
    engine.messages.push(task_message(
        "white",
        json!({"tasks": [{"x": 2, "y": 0, "category": "orange"}]}),
    ));

    mind.revise(&engine).expect("revise should succeed");

    assert_eq!(
        mind.decide(&engine),
        vec![Action::Turn(TurnDirection::Right)]
    );
}
