pub mod adapters;
pub mod advisory;
pub mod broadcast;
pub mod error;
pub mod exploration;
pub mod facade;
pub mod navigation;
pub mod perception;
pub mod policy;
pub mod ports;
pub mod revise;
pub mod state;
pub mod types;

pub use adapters::HttpAdvisoryOracle;
pub use advisory::AdvisoryPolicy;
pub use broadcast::MergeReport;
pub use error::{MindError, MindErrorKind};
pub use facade::AgentMind;
pub use navigation::{NavigationGoal, NavigationPlanner};
pub use perception::{CellObservation, PerceptionSnapshot};
pub use policy::{DecisionContext, DecisionPolicy, HeuristicPolicy, Situation, Surroundings};
pub use ports::{AdvisoryOracle, EnginePort};
pub use revise::ReviseOutcome;
pub use state::{BeliefState, DetourState, SweepState};
pub use types::{
    Action, AgentId, AgentRole, Avoidance, BlockedOrigin, BroadcastMessage, CategoryInterest,
    Coordinate, CoverageStrategy, DirtCategory, GridBounds, Orientation, Phase, Pose,
    RowDirection, Task, TickId, TurnDirection,
};
