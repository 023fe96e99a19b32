use async_trait::async_trait;

use crate::mind::{
    error::MindError,
    perception::PerceptionSnapshot,
    types::{AgentId, BroadcastMessage, Pose},
};

/// What the hosting engine exposes to one agent's mind for the current tick.
pub trait EnginePort {
    fn pose(&self) -> Result<Pose, MindError>;

    fn perception(&self) -> Result<PerceptionSnapshot, MindError>;

    /// Messages delivered since the previous tick.
    fn received_messages(&self) -> Vec<BroadcastMessage>;

    fn self_id(&self) -> AgentId;
}

/// Free-text advisory backend consulted by the advisory decision policy.
#[async_trait]
pub trait AdvisoryOracle: Send + Sync {
    async fn advise(&self, prompt: &str) -> Result<String, MindError>;
}
