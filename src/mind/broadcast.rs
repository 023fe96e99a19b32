use serde::Deserialize;
use serde_json::{Value, json};

use crate::mind::{
    error::{MindError, malformed_payload},
    state::BeliefState,
    types::{AgentRole, BroadcastMessage, Coordinate, DirtCategory, Phase, Task},
};

pub const TASKS_KEY: &str = "tasks";
const LEGACY_TASKS_KEY: &str = "dirt";

#[derive(Debug, Deserialize)]
struct WireTask {
    x: i32,
    y: i32,
    #[serde(alias = "colour")]
    category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub sender: String,
    pub accepted: usize,
    pub filtered_out: usize,
    pub malformed: usize,
}

/// JSON content for a task broadcast: `{"tasks": [{"x", "y", "category"}, ...]}`.
pub fn encode_payload(tasks: &[Task]) -> Value {
    let entries: Vec<Value> = tasks
        .iter()
        .map(|task| {
            json!({
                "x": task.coordinate.x,
                "y": task.coordinate.y,
                "category": task.category.as_str(),
            })
        })
        .collect();
    json!({ TASKS_KEY: entries })
}

/// The entry list of a task broadcast, or `None` when the content is some other message.
pub fn task_entries(content: &Value) -> Option<&Vec<Value>> {
    let object = content.as_object()?;
    object
        .get(TASKS_KEY)
        .or_else(|| object.get(LEGACY_TASKS_KEY))?
        .as_array()
}

pub fn decode_entry(entry: &Value) -> Result<Task, MindError> {
    let wire = WireTask::deserialize(entry)
        .map_err(|err| malformed_payload(format!("invalid task entry {entry}: {err}")))?;
    let category: DirtCategory = wire.category.parse()?;
    Ok(Task::new(Coordinate::new(wire.x, wire.y), category))
}

/// Merges the first task broadcast not sent by `self_id`. Later broadcasts are ignored once
/// a map has been received.
pub fn receive(
    state: &mut BeliefState,
    messages: &[BroadcastMessage],
    self_id: &str,
) -> Option<MergeReport> {
    let mut report = None;

    for message in messages {
        if message.sender == self_id {
            continue;
        }
        let Some(entries) = task_entries(&message.content) else {
            tracing::debug!(
                target: "mind.broadcast",
                sender = %message.sender,
                "non_task_message_ignored"
            );
            continue;
        };
        if state.map_received {
            tracing::debug!(
                target: "mind.broadcast",
                sender = %message.sender,
                "duplicate_task_broadcast_ignored"
            );
            continue;
        }

        let interest = state.interest();
        let mut merge = MergeReport {
            sender: message.sender.clone(),
            ..MergeReport::default()
        };
        for entry in entries {
            match decode_entry(entry) {
                Ok(task) if interest.accepts(task.category) => {
                    state.record_task(task.coordinate, task.category);
                    merge.accepted += 1;
                }
                Ok(_) => merge.filtered_out += 1,
                Err(err) => {
                    tracing::warn!(
                        target: "mind.broadcast",
                        sender = %message.sender,
                        error = %err,
                        "malformed_task_entry_skipped"
                    );
                    merge.malformed += 1;
                }
            }
        }
        state.map_received = true;
        tracing::info!(
            target: "mind.broadcast",
            sender = %merge.sender,
            accepted = merge.accepted,
            filtered_out = merge.filtered_out,
            malformed = merge.malformed,
            "task_map_merged"
        );
        report = Some(merge);
    }

    report
}

/// Produces the one-shot broadcast for an explorer and moves it on to cleaning. Returns
/// `None` for non-explorers or when the map already went out.
pub fn emit(state: &mut BeliefState) -> Option<Vec<Task>> {
    if state.map_broadcasted || !matches!(state.role, AgentRole::Explorer) {
        return None;
    }
    let tasks = state.task_list();
    state.map_broadcasted = true;
    state.phase = Phase::Cleaning;
    tracing::info!(
        target: "mind.broadcast",
        task_count = tasks.len(),
        "task_map_broadcast"
    );
    Some(tasks)
}
