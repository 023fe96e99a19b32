use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::mind::error::{MindError, malformed_payload};

pub type AgentId = String;
pub type TickId = u64;

/// Grid cell address. Origin is the top-left corner, `x` grows east and `y` grows south.
///
/// Ordering is row-major (`y` first, then `x`), which is the tie-break used whenever two
/// cells are equally near.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn step(self, orientation: Orientation) -> Coordinate {
        let (dx, dy) = orientation.offset();
        Coordinate::new(self.x + dx, self.y + dy)
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// Clockwise from north.
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// Clockwise quarter turns needed to go from `self` to `desired`, in `0..=3`.
    pub fn quarter_turns_to(self, desired: Orientation) -> u8 {
        ((desired.index() + 4 - self.index()) % 4) as u8
    }

    pub fn turned(self, direction: TurnDirection) -> Orientation {
        let next = match direction {
            TurnDirection::Right => self.index() + 1,
            TurnDirection::Left => self.index() + 3,
        };
        Self::ALL[next % 4]
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    pub fn opposite(self) -> TurnDirection {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Coordinate,
    pub orientation: Orientation,
}

impl Pose {
    pub const fn new(position: Coordinate, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtCategory {
    Orange,
    Green,
}

impl DirtCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Orange => "orange",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for DirtCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DirtCategory {
    type Err = MindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "orange" => Ok(Self::Orange),
            "green" => Ok(Self::Green),
            other => Err(malformed_payload(format!("unknown dirt category '{other}'"))),
        }
    }
}

/// Which dirt categories an agent is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryInterest {
    Any,
    Only(DirtCategory),
}

impl CategoryInterest {
    pub fn accepts(self, category: DirtCategory) -> bool {
        match self {
            Self::Any => true,
            Self::Only(own) => own == category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum AgentRole {
    /// Maps the grid, broadcasts the task list once and then cleans everything.
    Explorer,
    Cleaner { category: DirtCategory },
}

impl AgentRole {
    pub fn interest(self) -> CategoryInterest {
        match self {
            Self::Explorer => CategoryInterest::Any,
            Self::Cleaner { category } => CategoryInterest::Only(category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub category: DirtCategory,
}

impl Task {
    pub const fn new(coordinate: Coordinate, category: DirtCategory) -> Self {
        Self {
            coordinate,
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    Move,
    Turn(TurnDirection),
    Clean,
    Idle,
    Broadcast(Vec<Task>),
}

impl Action {
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub fn contains(self, coordinate: Coordinate) -> bool {
        coordinate.x >= 0
            && coordinate.y >= 0
            && coordinate.x < self.width
            && coordinate.y < self.height
    }

    pub fn cell_count(self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// All cells in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Coordinate> {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Coordinate::new(x, y)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockedOrigin {
    Coverage,
    Cleaning,
}

impl BlockedOrigin {
    pub fn phase(self) -> Phase {
        match self {
            Self::Coverage => Phase::Coverage,
            Self::Cleaning => Phase::Cleaning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    FindWidth,
    FindHeight,
    Coverage,
    Broadcasting,
    AwaitingMap,
    Cleaning,
    Blocked { origin: BlockedOrigin },
    Done,
}

impl Phase {
    pub fn initial_for(role: AgentRole) -> Phase {
        match role {
            AgentRole::Explorer => Phase::FindWidth,
            AgentRole::Cleaner { .. } => Phase::AwaitingMap,
        }
    }

    /// Phase with any blocked excursion folded back into where it came from.
    pub fn resolved(self) -> Phase {
        match self {
            Self::Blocked { origin } => origin.phase(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowDirection {
    East,
    West,
}

impl RowDirection {
    pub fn reversed(self) -> RowDirection {
        match self {
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    pub fn dx(self) -> i32 {
        match self {
            Self::East => 1,
            Self::West => -1,
        }
    }
}

/// Turn-then-revert bookkeeping for stepping around another actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Avoidance {
    #[default]
    Clear,
    /// Turned away from an actor last tick; move if the new forward cell is clear.
    PendingReversion { turned: TurnDirection },
    /// The avoidance turn was undone; a still-obstructed forward cell escalates to blocked.
    Reverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStrategy {
    #[default]
    NearestUnobserved,
    Boustrophedon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub sender: AgentId,
    pub content: serde_json::Value,
}
