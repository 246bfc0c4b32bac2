use crate::editor::HandleKind;

/// What the pointer is currently manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingHandle(HandleKind),
    DraggingImage,
    DraggingCrop,
}

impl DragState {
    pub const fn is_dragging(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub const fn active_handle(self) -> Option<HandleKind> {
        match self {
            Self::DraggingHandle(kind) => Some(kind),
            _ => None,
        }
    }
}
