pub mod error;
pub mod event;
pub mod machine;
pub mod model;

pub use error::{StateError, StateResult};
pub use event::{DragEvent, DragTransition, PressTarget};
pub use machine::DragStateMachine;
pub use model::DragState;
