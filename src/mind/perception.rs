use serde::{Deserialize, Serialize};

use crate::mind::types::{Coordinate, DirtCategory, Pose, TurnDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellObservation {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub obstacle: bool,
    #[serde(default)]
    pub actor: bool,
    #[serde(default)]
    pub dirt: Option<DirtCategory>,
}

impl CellObservation {
    pub fn empty(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            obstacle: false,
            actor: false,
            dirt: None,
        }
    }

    pub fn with_actor(mut self) -> Self {
        self.actor = true;
        self
    }

    pub fn with_obstacle(mut self) -> Self {
        self.obstacle = true;
        self
    }

    pub fn with_dirt(mut self, category: DirtCategory) -> Self {
        self.dirt = Some(category);
        self
    }

    pub fn is_obstructed(&self) -> bool {
        self.obstacle || self.actor
    }
}

/// The six cells visible from one pose. A `None` cell lies outside the grid or could not be
/// sensed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerceptionSnapshot {
    #[serde(default)]
    pub center: Option<CellObservation>,
    #[serde(default)]
    pub forward: Option<CellObservation>,
    #[serde(default)]
    pub left: Option<CellObservation>,
    #[serde(default)]
    pub right: Option<CellObservation>,
    #[serde(default)]
    pub forward_left: Option<CellObservation>,
    #[serde(default)]
    pub forward_right: Option<CellObservation>,
}

impl PerceptionSnapshot {
    pub fn cells(&self) -> impl Iterator<Item = &CellObservation> {
        [
            &self.center,
            &self.forward,
            &self.left,
            &self.right,
            &self.forward_left,
            &self.forward_right,
        ]
        .into_iter()
        .flatten()
    }

    /// The grid edge is directly ahead.
    pub fn boundary_ahead(&self) -> bool {
        self.forward.is_none()
    }

    pub fn wall_ahead(&self) -> bool {
        self.forward.is_none_or(|cell| cell.obstacle)
    }

    pub fn actor_ahead(&self) -> bool {
        self.forward.is_some_and(|cell| cell.actor && !cell.obstacle)
    }

    pub fn forward_blocked(&self) -> bool {
        self.wall_ahead() || self.actor_ahead()
    }

    pub fn dirt_here(&self) -> Option<DirtCategory> {
        self.center.and_then(|cell| cell.dirt)
    }
}

/// Coordinates of the side cells relative to a pose, independent of whether they were
/// observed.
pub fn side_coordinates(pose: Pose) -> (Coordinate, Coordinate) {
    let left = pose
        .position
        .step(pose.orientation.turned(TurnDirection::Left));
    let right = pose
        .position
        .step(pose.orientation.turned(TurnDirection::Right));
    (left, right)
}
