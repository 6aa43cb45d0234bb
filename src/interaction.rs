//! Drag gestures as per-node state transitions over a [`Simulation`].
//!
//! Every node is either `Free` or `Dragging`. A drag pins the node under the
//! pointer and raises the shared `alpha_target` so the rest of the layout
//! reacts; releasing the last dragged node lets the layout cool again.

use eframe::egui::Vec2;
use thiserror::Error;
use tracing::debug;

use crate::config::InteractionConfig;
use crate::sim::Simulation;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragState {
    Free,
    Dragging { pointer: Vec2 },
}

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum InteractionError {
    #[error("node {0} does not exist")]
    UnknownNode(usize),
    #[error("node {0} is already being dragged")]
    AlreadyDragging(usize),
    #[error("node {0} is not being dragged")]
    NotDragging(usize),
    #[error("pointer position ({x}, {y}) is not finite")]
    NonFinitePointer { x: f32, y: f32 },
}

pub struct DragController {
    states: Vec<DragState>,
    active: usize,
    config: InteractionConfig,
}

impl DragController {
    pub fn new(node_count: usize, config: InteractionConfig) -> Self {
        Self {
            states: vec![DragState::Free; node_count],
            active: 0,
            config,
        }
    }

    pub fn state(&self, index: usize) -> Option<DragState> {
        self.states.get(index).copied()
    }

    pub fn is_dragging(&self, index: usize) -> bool {
        matches!(self.state(index), Some(DragState::Dragging { .. }))
    }

    pub fn active_drags(&self) -> usize {
        self.active
    }

    /// Pins `index` at `pointer`. The first concurrent drag raises the shared
    /// alpha target and restarts a converged simulation.
    pub fn drag_start(
        &mut self,
        sim: &mut Simulation,
        index: usize,
        pointer: Vec2,
    ) -> Result<(), InteractionError> {
        let pointer = finite(pointer)?;
        match self.state(index) {
            None => return Err(InteractionError::UnknownNode(index)),
            Some(DragState::Dragging { .. }) => return Err(InteractionError::AlreadyDragging(index)),
            Some(DragState::Free) => {}
        }
        if !sim.pin(index, pointer) {
            return Err(InteractionError::UnknownNode(index));
        }

        self.states[index] = DragState::Dragging { pointer };
        self.active += 1;
        if self.active == 1 {
            sim.set_alpha_target(self.config.drag_alpha_target);
        }
        sim.restart();
        debug!(index, active = self.active, "drag started");
        Ok(())
    }

    /// Moves the pin of a dragged node. Takes effect before the next tick.
    pub fn drag_move(
        &mut self,
        sim: &mut Simulation,
        index: usize,
        pointer: Vec2,
    ) -> Result<(), InteractionError> {
        let pointer = finite(pointer)?;
        self.expect_dragging(index)?;
        sim.pin(index, pointer);
        self.states[index] = DragState::Dragging { pointer };
        if !sim.is_running() {
            sim.restart();
        }
        Ok(())
    }

    /// Frees a dragged node where it was last held.
    pub fn drag_end(&mut self, sim: &mut Simulation, index: usize) -> Result<(), InteractionError> {
        self.expect_dragging(index)?;
        sim.unpin(index);
        self.states[index] = DragState::Free;
        self.active -= 1;
        if self.active == 0 {
            sim.set_alpha_target(self.config.resting_alpha_target);
        }
        debug!(index, active = self.active, "drag ended");
        Ok(())
    }

    /// Ends every active drag, e.g. when the pointer leaves the canvas.
    pub fn release_all(&mut self, sim: &mut Simulation) {
        if self.active == 0 {
            return;
        }
        for (index, state) in self.states.iter_mut().enumerate() {
            if matches!(state, DragState::Dragging { .. }) {
                sim.unpin(index);
                *state = DragState::Free;
            }
        }
        debug!(released = self.active, "all drags released");
        self.active = 0;
        sim.set_alpha_target(self.config.resting_alpha_target);
    }

    fn expect_dragging(&self, index: usize) -> Result<(), InteractionError> {
        match self.state(index) {
            None => Err(InteractionError::UnknownNode(index)),
            Some(DragState::Free) => Err(InteractionError::NotDragging(index)),
            Some(DragState::Dragging { .. }) => Ok(()),
        }
    }
}

fn finite(pointer: Vec2) -> Result<Vec2, InteractionError> {
    if pointer.is_finite() {
        Ok(pointer)
    } else {
        Err(InteractionError::NonFinitePointer {
            x: pointer.x,
            y: pointer.y,
        })
    }
}
