use super::model::DragState;
use crate::editor::HandleKind;

/// Where a press landed, as decided by the hit-tester.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Handle(HandleKind),
    Image,
    Crop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    Press(PressTarget),
    Release,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragTransition {
    pub from: DragState,
    pub event: DragEvent,
    pub to: DragState,
}

impl DragTransition {
    pub const fn new(from: DragState, event: DragEvent, to: DragState) -> Self {
        Self { from, event, to }
    }
}
