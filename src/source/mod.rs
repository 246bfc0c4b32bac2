//! Image sources and the background loader that feeds the editor.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::RgbaImage;
use thiserror::Error;

use crate::app::worker::{spawn_worker_action, PendingAction, WorkerPoll};

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image loader worker exited without a result")]
    WorkerLost,
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[derive(Clone, PartialEq, Eq)]
pub enum ImageReference {
    Path(PathBuf),
    /// `data:image/<type>;base64,<payload>`
    DataUrl(String),
    Bytes(Vec<u8>),
}

impl ImageReference {
    /// Treats `data:` strings as data URLs and everything else as a path.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(DATA_URL_SCHEME) {
            Self::DataUrl(raw.to_string())
        } else {
            Self::Path(PathBuf::from(raw))
        }
    }

    /// File stem used to name saved output.
    pub fn stem(&self) -> String {
        match self {
            Self::Path(path) => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
                .unwrap_or("image")
                .to_string(),
            Self::DataUrl(_) | Self::Bytes(_) => "image".to_string(),
        }
    }
}

impl std::fmt::Debug for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::DataUrl(url) => write!(f, "DataUrl({} bytes)", url.len()),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

pub trait ImageSource {
    fn load(&self, reference: &ImageReference) -> SourceResult<RgbaImage>;
}

/// Decodes files, data URLs and raw bytes with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodingImageSource;

impl ImageSource for DecodingImageSource {
    fn load(&self, reference: &ImageReference) -> SourceResult<RgbaImage> {
        let bytes = match reference {
            ImageReference::Path(path) => std::fs::read(path)?,
            ImageReference::DataUrl(url) => decode_data_url(url)?,
            ImageReference::Bytes(bytes) => bytes.clone(),
        };
        let image = image::load_from_memory(&bytes)?;
        Ok(image.to_rgba8())
    }
}

pub fn decode_data_url(url: &str) -> SourceResult<Vec<u8>> {
    let rest = url
        .strip_prefix(DATA_URL_SCHEME)
        .ok_or_else(|| SourceError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SourceError::InvalidDataUrl("missing ',' separator".to_string()))?;
    if !header.ends_with(BASE64_MARKER) {
        return Err(SourceError::InvalidDataUrl(format!(
            "unsupported encoding in header {header:?}"
        )));
    }
    Ok(BASE64.decode(payload.trim())?)
}

#[derive(Debug)]
pub enum LoadEvent {
    Ready(RgbaImage),
    Failed(SourceError),
}

struct PendingLoad {
    generation: u64,
    action: PendingAction<SourceResult<RgbaImage>>,
}

/// Decodes images on a worker thread; only the newest request completes.
pub struct ImageLoader<S> {
    source: Arc<S>,
    generation: u64,
    current: Option<ImageReference>,
    pending: Option<PendingLoad>,
}

impl<S> ImageLoader<S>
where
    S: ImageSource + Send + Sync + 'static,
{
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            generation: 0,
            current: None,
            pending: None,
        }
    }

    /// Starts loading `reference`. Returns `false` when it matches the
    /// current reference, so each image initializes the editor once.
    pub fn request(&mut self, reference: ImageReference) -> bool {
        if self.current.as_ref() == Some(&reference) {
            tracing::debug!(?reference, "image reference unchanged; skipping load");
            return false;
        }
        self.generation += 1;
        if let Some(stale) = self.pending.take() {
            tracing::debug!(
                generation = stale.generation,
                "superseding in-flight image load"
            );
        }

        let source = Arc::clone(&self.source);
        let worker_reference = reference.clone();
        let action = spawn_worker_action(move || source.load(&worker_reference));
        tracing::debug!(generation = self.generation, ?reference, "image load requested");
        self.current = Some(reference);
        self.pending = Some(PendingLoad {
            generation: self.generation,
            action,
        });
        true
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn poll(&mut self) -> Option<LoadEvent> {
        let pending = self.pending.as_ref()?;
        let event = match pending.action.poll() {
            WorkerPoll::Pending => return None,
            WorkerPoll::Ready(Ok(image)) => LoadEvent::Ready(image),
            WorkerPoll::Ready(Err(err)) => LoadEvent::Failed(err),
            WorkerPoll::Lost => LoadEvent::Failed(SourceError::WorkerLost),
        };
        self.finish(event)
    }

    /// Blocks until the newest request resolves.
    pub fn wait(&mut self) -> Option<LoadEvent> {
        let pending = self.pending.as_ref()?;
        let event = match pending.action.wait() {
            Some(Ok(image)) => LoadEvent::Ready(image),
            Some(Err(err)) => LoadEvent::Failed(err),
            None => LoadEvent::Failed(SourceError::WorkerLost),
        };
        self.finish(event)
    }

    fn finish(&mut self, event: LoadEvent) -> Option<LoadEvent> {
        let generation = self.pending.take().map(|pending| pending.generation);
        match &event {
            LoadEvent::Ready(image) => tracing::info!(
                ?generation,
                width = image.width(),
                height = image.height(),
                "image ready"
            ),
            LoadEvent::Failed(err) => {
                tracing::warn!(?generation, %err, "image load failed");
                // A failed reference may be retried.
                self.current = None;
            }
        }
        Some(event)
    }
}
