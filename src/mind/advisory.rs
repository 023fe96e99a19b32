use std::{fmt::Write as _, sync::Arc, time::Duration};

use tokio::runtime::{Builder, Runtime};

use crate::mind::{
    error::{MindError, advisory_failure, internal_error},
    perception::CellObservation,
    policy::{DecisionContext, DecisionPolicy, Situation},
    ports::AdvisoryOracle,
    types::{Action, TurnDirection},
};

/// Decision policy that asks an [`AdvisoryOracle`] for the next action.
///
/// The oracle call is synchronous for the caller: the policy owns a current-thread runtime and
/// bounds every call by `timeout`. A timeout, an oracle error or an unrecognised reply all
/// yield `Idle`; the caller's safety override still applies to whatever comes back.
pub struct AdvisoryPolicy {
    oracle: Arc<dyn AdvisoryOracle>,
    timeout: Duration,
    runtime: Runtime,
}

impl AdvisoryPolicy {
    /// Must not be called from inside an async runtime: proposals block on the owned one.
    pub fn new(oracle: Arc<dyn AdvisoryOracle>, timeout: Duration) -> Result<Self, MindError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| internal_error(format!("failed to build advisory runtime: {err}")))?;
        Ok(Self {
            oracle,
            timeout,
            runtime,
        })
    }

    fn consult(&self, prompt: &str) -> Result<String, MindError> {
        // `timeout` registers its timer when created; that needs the owned runtime entered.
        let outcome = self.runtime.block_on(async {
            tokio::time::timeout(self.timeout, self.oracle.advise(prompt)).await
        });
        match outcome {
            Ok(reply) => reply,
            Err(_) => Err(advisory_failure(format!(
                "advisory oracle exceeded {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

impl DecisionPolicy for AdvisoryPolicy {
    fn name(&self) -> &'static str {
        "advisory"
    }

    fn propose_action(&self, ctx: &DecisionContext<'_>) -> Action {
        let prompt = build_prompt(ctx);
        match self.consult(&prompt) {
            Ok(reply) => {
                let action = parse_reply(&reply);
                tracing::debug!(
                    target: "mind.advisory",
                    position = %ctx.pose.position,
                    reply = %reply.trim(),
                    action = ?action,
                    "advisory_reply"
                );
                action
            }
            Err(err) => {
                tracing::warn!(
                    target: "mind.advisory",
                    position = %ctx.pose.position,
                    error = %err,
                    "advisory_failed_idle"
                );
                Action::Idle
            }
        }
    }
}

/// Maps the oracle's reply token to an action. Unknown replies are `Idle`.
pub fn parse_reply(reply: &str) -> Action {
    match reply.trim().to_ascii_uppercase().as_str() {
        "MOVE_FORWARD" => Action::Move,
        "TURN_LEFT" => Action::Turn(TurnDirection::Left),
        "TURN_RIGHT" => Action::Turn(TurnDirection::Right),
        _ => Action::Idle,
    }
}

pub fn build_prompt(ctx: &DecisionContext<'_>) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "You steer a cleaning agent on a grid.");
    let _ = writeln!(prompt, "Origin is the top-left corner, x grows east, y grows south.");
    let _ = writeln!(
        prompt,
        "Position: {} facing {}. Target: {}. Preferred orientation: {}.",
        ctx.pose.position, ctx.pose.orientation, ctx.target, ctx.desired
    );
    if let Some(bounds) = ctx.grid_bounds {
        let _ = writeln!(prompt, "Grid size: {}x{}.", bounds.width, bounds.height);
    }
    let _ = writeln!(prompt, "Phase: {:?}.", ctx.phase);
    let _ = writeln!(
        prompt,
        "Forward: {}. Left: {}. Right: {}.",
        describe_cell(ctx.snapshot.forward),
        describe_cell(ctx.snapshot.left),
        describe_cell(ctx.snapshot.right)
    );
    let guidance = match ctx.situation {
        Situation::Pursue => {
            "Turn toward the preferred orientation, then move while the way is clear."
        }
        Situation::Escape => {
            "The way forward is obstructed. \
             Turn toward a free side, preferring cells you have not visited."
        }
    };
    let _ = writeln!(prompt, "{guidance}");
    let _ = writeln!(prompt, "Never move forward into a wall or another agent.");
    let _ = write!(prompt, "Reply with exactly one of: MOVE_FORWARD, TURN_LEFT, TURN_RIGHT.");
    prompt
}

fn describe_cell(cell: Option<CellObservation>) -> &'static str {
    match cell {
        None => "wall",
        Some(cell) if cell.obstacle => "obstacle",
        Some(cell) if cell.actor => "agent",
        Some(cell) if cell.dirt.is_some() => "dirt",
        Some(_) => "free",
    }
}
