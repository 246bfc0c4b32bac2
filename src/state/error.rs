use super::event::DragEvent;
use super::model::DragState;
use thiserror::Error;

pub type StateResult<T> = std::result::Result<T, StateError>;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("invalid drag transition: from {from:?} using event {event:?}")]
    InvalidDragTransition { from: DragState, event: DragEvent },
}
