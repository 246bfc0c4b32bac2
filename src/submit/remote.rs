//! Multipart client for the edge-extension service.
//!
//! Pure parsing in `parse_extend_response` keeps the wire handling testable
//! without a server.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;

use super::{encode_png, Submission, SubmissionReceipt, SubmissionSink, SubmitError, SubmitResult};

const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const IMAGE_PART: &str = "image";
const IMAGE_FILE_NAME: &str = "crop.png";
const IMAGE_MIME: &str = "image/png";

pub struct RemoteExtendSink {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl std::fmt::Debug for RemoteExtendSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteExtendSink")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RemoteExtendSink {
    pub fn new(endpoint: impl Into<String>) -> SubmitResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SubmissionSink for RemoteExtendSink {
    fn submit(&self, submission: &Submission) -> SubmitResult<SubmissionReceipt> {
        let Submission::Extend { bitmap, margins } = submission else {
            return Err(SubmitError::Unsupported(submission.kind()));
        };
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(SubmitError::EmptyBitmap);
        }

        let (left, top, right, bottom) = margins.rounded();
        let image = Part::bytes(encode_png(bitmap)?)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_MIME)?;
        let form = Form::new()
            .text("left", left.to_string())
            .text("top", top.to_string())
            .text("right", right.to_string())
            .text("bottom", bottom.to_string())
            .part(IMAGE_PART, image);

        tracing::info!(
            endpoint = %self.endpoint,
            left,
            top,
            right,
            bottom,
            width = bitmap.width(),
            height = bitmap.height(),
            "sending extension request"
        );
        let response = self.http.post(&self.endpoint).multipart(form).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "extension service rejected request");
            return Err(SubmitError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let url = parse_extend_response(&body)?;
        tracing::info!(url = %url, "extension service accepted request");
        Ok(SubmissionReceipt::Remote { url })
    }
}

#[derive(Deserialize)]
struct ExtendResponse {
    #[serde(alias = "image_url")]
    url: String,
}

pub fn parse_extend_response(json: &str) -> SubmitResult<String> {
    let response: ExtendResponse = serde_json::from_str(json)?;
    Ok(response.url)
}
