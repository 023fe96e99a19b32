//! Reference grid engine that hosts agent minds and applies their actions.

use std::collections::BTreeMap;

use crate::mind::{
    broadcast,
    error::{MindError, sensor_unavailable},
    facade::AgentMind,
    perception::{CellObservation, PerceptionSnapshot},
    ports::EnginePort,
    types::{
        Action, AgentId, BroadcastMessage, Coordinate, DirtCategory, GridBounds, Pose,
        TurnDirection,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    InvalidBounds { width: i32, height: i32 },
    #[error("{0} lies outside the grid")]
    OutOfBounds(Coordinate),
    #[error("cell {0} is already occupied")]
    Occupied(Coordinate),
    #[error("agent id '{0}' is already registered")]
    DuplicateAgent(AgentId),
    #[error("no agent with id '{0}'")]
    UnknownAgent(AgentId),
}

#[derive(Debug, Clone)]
struct AgentBody {
    id: AgentId,
    pose: Pose,
    inbox: Vec<BroadcastMessage>,
    sensors_online: bool,
}

/// Everything an agent can sense, kept apart from the minds so views can borrow it while the
/// minds are mutated.
#[derive(Debug, Clone)]
struct Terrain {
    bounds: GridBounds,
    dirt: BTreeMap<Coordinate, DirtCategory>,
    bodies: Vec<AgentBody>,
}

impl Terrain {
    fn occupant(&self, coordinate: Coordinate) -> Option<usize> {
        self.bodies
            .iter()
            .position(|body| body.pose.position == coordinate)
    }

    fn observe(&self, coordinate: Coordinate, observer: usize) -> Option<CellObservation> {
        if !self.bounds.contains(coordinate) {
            return None;
        }
        let mut cell = CellObservation::empty(coordinate);
        if self
            .occupant(coordinate)
            .is_some_and(|index| index != observer)
        {
            cell = cell.with_actor();
        }
        if let Some(category) = self.dirt.get(&coordinate) {
            cell = cell.with_dirt(*category);
        }
        Some(cell)
    }

    fn snapshot(&self, observer: usize) -> PerceptionSnapshot {
        let pose = self.bodies[observer].pose;
        let forward = pose.position.step(pose.orientation);
        let left = pose.orientation.turned(TurnDirection::Left);
        let right = pose.orientation.turned(TurnDirection::Right);

        PerceptionSnapshot {
            center: self.observe(pose.position, observer),
            forward: self.observe(forward, observer),
            left: self.observe(pose.position.step(left), observer),
            right: self.observe(pose.position.step(right), observer),
            forward_left: self.observe(forward.step(left), observer),
            forward_right: self.observe(forward.step(right), observer),
        }
    }
}

/// The engine-side view handed to one agent's mind.
pub struct AgentView<'w> {
    terrain: &'w Terrain,
    index: usize,
}

impl EnginePort for AgentView<'_> {
    fn pose(&self) -> Result<Pose, MindError> {
        Ok(self.terrain.bodies[self.index].pose)
    }

    fn perception(&self) -> Result<PerceptionSnapshot, MindError> {
        let body = &self.terrain.bodies[self.index];
        if !body.sensors_online {
            return Err(sensor_unavailable(format!("sensors of '{}' are offline", body.id)));
        }
        Ok(self.terrain.snapshot(self.index))
    }

    fn received_messages(&self) -> Vec<BroadcastMessage> {
        self.terrain.bodies[self.index].inbox.clone()
    }

    fn self_id(&self) -> AgentId {
        self.terrain.bodies[self.index].id.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedAction {
    pub agent_id: AgentId,
    pub action: Action,
    /// False when the engine refused the action, e.g. a move into an occupied cell.
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub actions: Vec<AppliedAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub all_done: bool,
    pub dirt_remaining: usize,
}

pub struct GridWorld {
    terrain: Terrain,
    minds: Vec<AgentMind>,
    tick: u64,
}

impl GridWorld {
    pub fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        if width < 1 || height < 1 {
            return Err(WorldError::InvalidBounds { width, height });
        }
        Ok(Self {
            terrain: Terrain {
                bounds: GridBounds { width, height },
                dirt: BTreeMap::new(),
                bodies: Vec::new(),
            },
            minds: Vec::new(),
            tick: 0,
        })
    }

    pub fn bounds(&self) -> GridBounds {
        self.terrain.bounds
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn add_dirt(
        &mut self,
        coordinate: Coordinate,
        category: DirtCategory,
    ) -> Result<(), WorldError> {
        if !self.terrain.bounds.contains(coordinate) {
            return Err(WorldError::OutOfBounds(coordinate));
        }
        self.terrain.dirt.insert(coordinate, category);
        Ok(())
    }

    pub fn add_agent(
        &mut self,
        id: impl Into<AgentId>,
        pose: Pose,
        mind: AgentMind,
    ) -> Result<(), WorldError> {
        let id = id.into();
        if self.terrain.bodies.iter().any(|body| body.id == id) {
            return Err(WorldError::DuplicateAgent(id));
        }
        if !self.terrain.bounds.contains(pose.position) {
            return Err(WorldError::OutOfBounds(pose.position));
        }
        if self.terrain.occupant(pose.position).is_some() {
            return Err(WorldError::Occupied(pose.position));
        }
        self.terrain.bodies.push(AgentBody {
            id,
            pose,
            inbox: Vec::new(),
            sensors_online: true,
        });
        self.minds.push(mind);
        Ok(())
    }

    fn index_of(&self, id: &str) -> Result<usize, WorldError> {
        self.terrain
            .bodies
            .iter()
            .position(|body| body.id == id)
            .ok_or_else(|| WorldError::UnknownAgent(id.to_string()))
    }

    pub fn pose_of(&self, id: &str) -> Result<Pose, WorldError> {
        Ok(self.terrain.bodies[self.index_of(id)?].pose)
    }

    pub fn mind(&self, id: &str) -> Result<&AgentMind, WorldError> {
        Ok(&self.minds[self.index_of(id)?])
    }

    pub fn dirt(&self) -> &BTreeMap<Coordinate, DirtCategory> {
        &self.terrain.dirt
    }

    pub fn all_done(&self) -> bool {
        self.minds.iter().all(AgentMind::is_done)
    }

    /// Queues `message` for `id` to read on the next tick.
    pub fn inject_message(
        &mut self,
        id: &str,
        message: BroadcastMessage,
    ) -> Result<(), WorldError> {
        let index = self.index_of(id)?;
        self.terrain.bodies[index].inbox.push(message);
        Ok(())
    }

    /// Takes an agent's sensors offline (or back online); perception then fails for it.
    pub fn set_sensors_online(&mut self, id: &str, online: bool) -> Result<(), WorldError> {
        let index = self.index_of(id)?;
        self.terrain.bodies[index].sensors_online = online;
        Ok(())
    }

    /// Runs one tick: every mind revises, then every mind decides, then the actions are applied
    /// in registration order. Broadcasts land in the other inboxes for the next tick.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;

        for (index, mind) in self.minds.iter_mut().enumerate() {
            let view = AgentView {
                terrain: &self.terrain,
                index,
            };
            mind.revise(&view);
        }
        for body in &mut self.terrain.bodies {
            body.inbox.clear();
        }

        let mut decided = Vec::with_capacity(self.minds.len());
        for (index, mind) in self.minds.iter_mut().enumerate() {
            let view = AgentView {
                terrain: &self.terrain,
                index,
            };
            let action = mind.decide(&view).into_iter().next().unwrap_or(Action::Idle);
            decided.push(action);
        }

        let actions = decided
            .into_iter()
            .enumerate()
            .map(|(index, action)| {
                let applied = self.apply(index, &action);
                AppliedAction {
                    agent_id: self.terrain.bodies[index].id.clone(),
                    action,
                    applied,
                }
            })
            .collect();

        TickReport {
            tick: self.tick,
            actions,
        }
    }

    /// Ticks until every mind is done or `max_ticks` have run.
    pub fn run(&mut self, max_ticks: u64) -> RunSummary {
        while !self.all_done() && self.tick < max_ticks {
            self.tick();
        }
        RunSummary {
            ticks: self.tick,
            all_done: self.all_done(),
            dirt_remaining: self.terrain.dirt.len(),
        }
    }

    fn apply(&mut self, index: usize, action: &Action) -> bool {
        let pose = self.terrain.bodies[index].pose;
        let applied = match action {
            Action::Idle => true,
            Action::Turn(direction) => {
                self.terrain.bodies[index].pose.orientation = pose.orientation.turned(*direction);
                true
            }
            Action::Move => {
                let target = pose.position.step(pose.orientation);
                let free = self.terrain.bounds.contains(target)
                    && self.terrain.occupant(target).is_none();
                if free {
                    self.terrain.bodies[index].pose.position = target;
                }
                free
            }
            Action::Clean => {
                let interest = self.minds[index].role().interest();
                match self.terrain.dirt.get(&pose.position).copied() {
                    Some(category) if interest.accepts(category) => {
                        self.terrain.dirt.remove(&pose.position);
                        true
                    }
                    _ => false,
                }
            }
            Action::Broadcast(tasks) => {
                let message = BroadcastMessage {
                    sender: self.terrain.bodies[index].id.clone(),
                    content: broadcast::encode_payload(tasks),
                };
                for (other, body) in self.terrain.bodies.iter_mut().enumerate() {
                    if other != index {
                        body.inbox.push(message.clone());
                    }
                }
                true
            }
        };

        if !applied {
            tracing::warn!(
                target: "world",
                tick = self.tick,
                agent_id = %self.terrain.bodies[index].id,
                position = %pose.position,
                action = ?action,
                "action_refused"
            );
        }
        applied
    }
}
