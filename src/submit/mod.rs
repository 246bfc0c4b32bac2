//! Submission sinks for finished crops and edge-extension requests.

mod remote;

use std::fs;
use std::io;
use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::Margins;

pub use remote::{parse_extend_response, RemoteExtendSink};

const OUTPUT_PREFIX: &str = "magic_resize_";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("cropped region is empty; nothing to submit")]
    EmptyBitmap,
    #[error("this sink cannot handle {0} submissions")]
    Unsupported(&'static str),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode png: {0}")]
    Encode(#[from] image::ImageError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("extension service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("invalid extension service response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("submission worker exited without a result")]
    WorkerLost,
}

pub type SubmitResult<T> = std::result::Result<T, SubmitError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The crop is fully covered by image pixels.
    Finished(RgbaImage),
    /// Part of the crop lies outside the image; the service must fill `margins`.
    Extend { bitmap: RgbaImage, margins: Margins },
}

impl Submission {
    /// Margins that round to zero on every side count as fully covered.
    pub fn from_resolution(bitmap: RgbaImage, margins: Margins) -> Self {
        if margins.rounded() == (0, 0, 0, 0) {
            Self::Finished(bitmap)
        } else {
            Self::Extend { bitmap, margins }
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Finished(_) => "finished",
            Self::Extend { .. } => "extend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionReceipt {
    Saved(PathBuf),
    Remote { url: String },
}

impl std::fmt::Display for SubmissionReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Saved(path) => write!(f, "saved to {}", path.display()),
            Self::Remote { url } => write!(f, "processed image available at {url}"),
        }
    }
}

pub trait SubmissionSink {
    fn submit(&self, submission: &Submission) -> SubmitResult<SubmissionReceipt>;
}

impl<T: SubmissionSink + ?Sized> SubmissionSink for Box<T> {
    fn submit(&self, submission: &Submission) -> SubmitResult<SubmissionReceipt> {
        (**self).submit(submission)
    }
}

/// Writes finished crops as PNG files into an output directory.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
    stem: String,
}

impl FileSink {
    pub fn new(output_dir: PathBuf, stem: impl Into<String>) -> Self {
        Self {
            output_dir,
            stem: stem.into(),
        }
    }

    pub fn target_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{OUTPUT_PREFIX}{}.png", self.stem))
    }
}

impl SubmissionSink for FileSink {
    fn submit(&self, submission: &Submission) -> SubmitResult<SubmissionReceipt> {
        let Submission::Finished(bitmap) = submission else {
            return Err(SubmitError::Unsupported(submission.kind()));
        };
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(SubmitError::EmptyBitmap);
        }
        fs::create_dir_all(&self.output_dir)?;
        let target = self.target_path();
        bitmap.save_with_format(&target, image::ImageFormat::Png)?;
        tracing::info!(path = %target.display(), "saved finished crop");
        Ok(SubmissionReceipt::Saved(target))
    }
}

/// Sends finished crops to one sink and extension requests to another.
#[derive(Debug, Clone)]
pub struct RoutingSink<F, E> {
    finished: F,
    extend: E,
}

impl<F, E> RoutingSink<F, E> {
    pub const fn new(finished: F, extend: E) -> Self {
        Self { finished, extend }
    }
}

impl<F: SubmissionSink, E: SubmissionSink> SubmissionSink for RoutingSink<F, E> {
    fn submit(&self, submission: &Submission) -> SubmitResult<SubmissionReceipt> {
        match submission {
            Submission::Finished(_) => self.finished.submit(submission),
            Submission::Extend { .. } => self.extend.submit(submission),
        }
    }
}

pub(crate) fn encode_png(bitmap: &RgbaImage) -> SubmitResult<Vec<u8>> {
    let mut bytes = Vec::new();
    bitmap.write_to(&mut io::Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}
