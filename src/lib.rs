pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod presets;
pub mod source;
pub mod state;
pub mod submit;
pub use error::{AppError, AppResult};

use crate::app::{App, RunOptions};
use crate::submit::SubmissionReceipt;

/// Entrypoint used by higher-level integrations and CLI bindings.
pub fn run(options: RunOptions) -> AppResult<SubmissionReceipt> {
    logging::init();
    tracing::info!("starting Magic Resize");

    let app = App::new(config::load_editor_config());
    let receipt = app.run(options)?;

    tracing::info!(%receipt, "run complete");
    Ok(receipt)
}
