use crate::config::ConfigPathError;
use crate::editor::raster::RasterError;
use crate::editor::EditorError;
use crate::presets::PresetError;
use crate::source::SourceError;
use crate::state::StateError;
use crate::submit::SubmitError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    ConfigPath(#[from] ConfigPathError),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("no image load or submission is pending")]
    NothingPending,
}
