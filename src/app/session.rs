use std::sync::Arc;

use crate::editor::RectangleEditor;
use crate::error::{AppError, AppResult};
use crate::geometry::ImageSize;
use crate::source::{ImageLoader, ImageReference, ImageSource, LoadEvent, SourceError};
use crate::submit::{SubmissionReceipt, SubmissionSink, SubmitError, SubmitResult};

use super::worker::{spawn_worker_action, PendingAction, WorkerPoll};

#[derive(Debug)]
pub enum SessionEvent {
    ImageReady(ImageSize),
    ImageFailed(SourceError),
    Submitted(SubmissionReceipt),
    SubmitFailed(SubmitError),
}

/// Event-loop side of the editor: owns the editor and drives the image
/// loader and submission workers from `tick`.
pub struct EditorSession<S, K> {
    editor: RectangleEditor,
    loader: ImageLoader<S>,
    sink: Arc<K>,
    submitting: Option<PendingAction<SubmitResult<SubmissionReceipt>>>,
}

impl<S, K> EditorSession<S, K>
where
    S: ImageSource + Send + Sync + 'static,
    K: SubmissionSink + Send + Sync + 'static,
{
    pub fn new(editor: RectangleEditor, source: S, sink: K) -> Self {
        Self {
            editor,
            loader: ImageLoader::new(source),
            sink: Arc::new(sink),
            submitting: None,
        }
    }

    pub fn editor(&self) -> &RectangleEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RectangleEditor {
        &mut self.editor
    }

    pub fn open(&mut self, reference: ImageReference) -> bool {
        self.loader.request(reference)
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_some()
    }

    /// Drains finished background work without blocking.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(event) = self.loader.poll() {
            events.push(self.apply_load(event));
        }
        if let Some(pending) = self.submitting.as_ref() {
            let result = match pending.poll() {
                WorkerPoll::Pending => None,
                WorkerPoll::Ready(result) => Some(result),
                WorkerPoll::Lost => Some(Err(SubmitError::WorkerLost)),
            };
            if let Some(result) = result {
                self.submitting = None;
                events.push(submit_event(result));
            }
        }
        events
    }

    /// Blocks until the requested image is decoded and loaded into the editor.
    pub fn wait_for_image(&mut self) -> AppResult<ImageSize> {
        let event = self.loader.wait().ok_or(AppError::NothingPending)?;
        match self.apply_load(event) {
            SessionEvent::ImageReady(size) => Ok(size),
            SessionEvent::ImageFailed(err) => Err(err.into()),
            SessionEvent::Submitted(_) | SessionEvent::SubmitFailed(_) => {
                Err(AppError::NothingPending)
            }
        }
    }

    /// Resolves the crop and hands it to the sink on a worker thread.
    pub fn submit(&mut self) -> AppResult<()> {
        if self.submitting.is_some() {
            return Err(AppError::SubmissionInFlight);
        }
        let submission = self.editor.submission()?;
        tracing::info!(kind = submission.kind(), "submitting crop");
        let sink = Arc::clone(&self.sink);
        self.submitting = Some(spawn_worker_action(move || sink.submit(&submission)));
        Ok(())
    }

    pub fn wait_for_submission(&mut self) -> AppResult<SubmissionReceipt> {
        let pending = self.submitting.take().ok_or(AppError::NothingPending)?;
        let result = pending.wait().unwrap_or(Err(SubmitError::WorkerLost));
        match submit_event(result) {
            SessionEvent::Submitted(receipt) => Ok(receipt),
            SessionEvent::SubmitFailed(err) => Err(err.into()),
            SessionEvent::ImageReady(_) | SessionEvent::ImageFailed(_) => {
                Err(AppError::NothingPending)
            }
        }
    }

    fn apply_load(&mut self, event: LoadEvent) -> SessionEvent {
        match event {
            LoadEvent::Ready(bitmap) => {
                let size = ImageSize::new(bitmap.width(), bitmap.height());
                self.editor.load_bitmap(bitmap);
                SessionEvent::ImageReady(size)
            }
            LoadEvent::Failed(err) => SessionEvent::ImageFailed(err),
        }
    }
}

fn submit_event(result: SubmitResult<SubmissionReceipt>) -> SessionEvent {
    match result {
        Ok(receipt) => {
            tracing::info!(%receipt, "submission complete");
            SessionEvent::Submitted(receipt)
        }
        Err(err) => {
            tracing::warn!(%err, "submission failed");
            SessionEvent::SubmitFailed(err)
        }
    }
}
