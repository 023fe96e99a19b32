use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::mind::{
    error::{MindError, invariant_violation},
    types::{
        AgentRole, Avoidance, CategoryInterest, Coordinate, DirtCategory, GridBounds, Phase,
        RowDirection, Task, TickId,
    },
};

/// Boustrophedon bookkeeping: the row being swept and the direction it is swept in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepState {
    pub row: i32,
    pub direction: RowDirection,
}

/// Distinct cells remembered when judging whether sidesteps are getting anywhere.
const RECENT_POSITIONS: usize = 4;

/// Progress bookkeeping for actor avoidance. Sidesteps that only shuffle the agent between
/// recently held cells eventually switch navigation to routing around known obstructions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetourState {
    /// Last distinct cells held, oldest first.
    pub recent: VecDeque<Coordinate>,
    /// Avoidance sidesteps since the agent last reached a cell outside `recent`.
    pub sidesteps: u8,
    pub engaged: bool,
}

impl DetourState {
    pub fn record_position(&mut self, position: Coordinate) {
        if self.recent.back() == Some(&position) {
            return;
        }
        if !self.recent.contains(&position) {
            self.sidesteps = 0;
        }
        self.recent.push_back(position);
        if self.recent.len() > RECENT_POSITIONS {
            self.recent.pop_front();
        }
    }

    pub fn reset(&mut self) {
        self.sidesteps = 0;
        self.engaged = false;
    }
}

/// Everything one agent believes about the world. Owned by that agent alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    pub role: AgentRole,
    pub tick: TickId,
    pub visited: BTreeSet<Coordinate>,
    pub observed: BTreeSet<Coordinate>,
    pub task_map: BTreeMap<Coordinate, DirtCategory>,
    pub cleaned: BTreeSet<Coordinate>,
    pub grid_bounds: Option<GridBounds>,
    /// Width learned during `FindWidth`, held until the height completes the bounds.
    pub known_width: Option<i32>,
    pub phase: Phase,
    pub map_received: bool,
    pub map_broadcasted: bool,
    pub sweep: Option<SweepState>,
    pub avoidance: Avoidance,
    /// Cells last seen holding another actor or an obstacle.
    pub obstructions: BTreeSet<Coordinate>,
    pub detour: DetourState,
}

impl BeliefState {
    pub fn new(role: AgentRole) -> Self {
        Self {
            role,
            tick: 0,
            visited: BTreeSet::new(),
            observed: BTreeSet::new(),
            task_map: BTreeMap::new(),
            cleaned: BTreeSet::new(),
            grid_bounds: None,
            known_width: None,
            phase: Phase::initial_for(role),
            map_received: false,
            map_broadcasted: false,
            sweep: None,
            avoidance: Avoidance::Clear,
            obstructions: BTreeSet::new(),
            detour: DetourState::default(),
        }
    }

    pub fn interest(&self) -> CategoryInterest {
        self.role.interest()
    }

    /// Records a task unless the coordinate is already known. Returns whether it was new.
    pub fn record_task(&mut self, coordinate: Coordinate, category: DirtCategory) -> bool {
        if self.task_map.contains_key(&coordinate) {
            return false;
        }
        self.task_map.insert(coordinate, category);
        true
    }

    pub fn mark_cleaned(&mut self, coordinate: Coordinate) -> bool {
        self.task_map.contains_key(&coordinate) && self.cleaned.insert(coordinate)
    }

    pub fn set_grid_bounds(&mut self, bounds: GridBounds) -> Result<(), MindError> {
        match self.grid_bounds {
            Some(existing) if existing != bounds => Err(invariant_violation(format!(
                "grid bounds already set to {}x{}, refusing {}x{}",
                existing.width, existing.height, bounds.width, bounds.height
            ))),
            _ => {
                self.grid_bounds = Some(bounds);
                Ok(())
            }
        }
    }

    /// Tasks this agent should still clean, in row-major order.
    pub fn remaining_tasks(&self) -> impl Iterator<Item = Task> + '_ {
        let interest = self.interest();
        self.task_map
            .iter()
            .filter(move |(coordinate, category)| {
                interest.accepts(**category) && !self.cleaned.contains(*coordinate)
            })
            .map(|(coordinate, category)| Task::new(*coordinate, *category))
    }

    pub fn is_remaining_task(&self, coordinate: Coordinate) -> bool {
        self.task_map
            .get(&coordinate)
            .is_some_and(|category| self.interest().accepts(*category))
            && !self.cleaned.contains(&coordinate)
    }

    pub fn unobserved_cells(&self) -> Vec<Coordinate> {
        match self.grid_bounds {
            Some(bounds) => bounds
                .cells()
                .filter(|cell| !self.observed.contains(cell))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn coverage_complete(&self) -> bool {
        match self.grid_bounds {
            Some(bounds) => bounds.cells().all(|cell| self.observed.contains(&cell)),
            None => false,
        }
    }

    /// The full task list in row-major order, as broadcast to peers.
    pub fn task_list(&self) -> Vec<Task> {
        self.task_map
            .iter()
            .map(|(coordinate, category)| Task::new(*coordinate, *category))
            .collect()
    }

    /// A coordinate that certainly lies outside the grid. Unknown far edges are not
    /// assumed.
    pub fn known_out_of_bounds(&self, coordinate: Coordinate) -> bool {
        if coordinate.x < 0 || coordinate.y < 0 {
            return true;
        }
        match (self.grid_bounds, self.known_width) {
            (Some(bounds), _) => !bounds.contains(coordinate),
            (None, Some(width)) => coordinate.x >= width,
            (None, None) => false,
        }
    }

    pub fn check_invariants(&self) -> Result<(), MindError> {
        if let Some(cell) = self.visited.iter().find(|cell| !self.observed.contains(cell)) {
            return Err(invariant_violation(format!(
                "visited cell {cell} is missing from observed"
            )));
        }

        for cell in &self.cleaned {
            if !self.task_map.contains_key(cell) {
                return Err(invariant_violation(format!(
                    "cleaned cell {cell} is not a known task"
                )));
            }
            if !self.observed.contains(cell) {
                return Err(invariant_violation(format!(
                    "cleaned cell {cell} was never observed"
                )));
            }
        }

        if let Some(bounds) = self.grid_bounds
            && (bounds.width <= 0 || bounds.height <= 0)
        {
            return Err(invariant_violation(format!(
                "grid bounds {}x{} are not positive",
                bounds.width, bounds.height
            )));
        }

        Ok(())
    }

    /// Verifies that `next` only grew relative to `self`.
    pub fn check_growth(&self, next: &BeliefState) -> Result<(), MindError> {
        if !self.visited.is_subset(&next.visited) || !self.observed.is_subset(&next.observed) {
            return Err(invariant_violation("visited/observed sets shrank"));
        }
        if !self.cleaned.is_subset(&next.cleaned) {
            return Err(invariant_violation("cleaned set shrank"));
        }
        for (cell, category) in &self.task_map {
            if next.task_map.get(cell) != Some(category) {
                return Err(invariant_violation(format!(
                    "task at {cell} was removed or re-categorised"
                )));
            }
        }
        if self.grid_bounds.is_some() && self.grid_bounds != next.grid_bounds {
            return Err(invariant_violation("grid bounds changed after being set"));
        }
        Ok(())
    }
}
