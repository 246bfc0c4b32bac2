use std::collections::VecDeque;

use super::error::{StateError, StateResult};
use super::{DragEvent, DragState, DragTransition, PressTarget};

const TRANSITION_HISTORY_LIMIT: usize = 64;

#[derive(Debug)]
pub struct DragStateMachine {
    state: DragState,
    transition_history: VecDeque<DragTransition>,
}

impl DragStateMachine {
    pub fn new() -> Self {
        Self {
            state: DragState::default(),
            transition_history: VecDeque::new(),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn can_transition(&self, event: DragEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: DragEvent) -> Option<DragState> {
        match (self.state, event) {
            (DragState::Idle, DragEvent::Press(PressTarget::Handle(kind))) => {
                Some(DragState::DraggingHandle(kind))
            }
            (DragState::Idle, DragEvent::Press(PressTarget::Image)) => {
                Some(DragState::DraggingImage)
            }
            (DragState::Idle, DragEvent::Press(PressTarget::Crop)) => Some(DragState::DraggingCrop),
            (
                DragState::DraggingHandle(_) | DragState::DraggingImage | DragState::DraggingCrop,
                DragEvent::Release | DragEvent::Leave,
            ) => Some(DragState::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: DragEvent) -> StateResult<DragState> {
        tracing::debug!(from = ?self.state, event = ?event, "request drag transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::debug!(from = ?from, event = ?event, "drag transition rejected");
            StateError::InvalidDragTransition { from, event }
        })?;

        if self.transition_history.len() == TRANSITION_HISTORY_LIMIT {
            self.transition_history.pop_front();
        }
        self.transition_history
            .push_back(DragTransition::new(self.state, event, next));
        self.state = next;

        Ok(self.state)
    }

    /// Drops any in-progress drag without recording a transition.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }

    pub fn history(&self) -> impl Iterator<Item = &DragTransition> {
        self.transition_history.iter()
    }
}

impl Default for DragStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DragStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DragState::{:?}", self.state)
    }
}
