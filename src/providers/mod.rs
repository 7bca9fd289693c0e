//! Inference client for the remote classification and summarization service.
//!
//! All network traffic of the pipeline goes through [`InferenceClient`]. It
//! builds request payloads, enforces input length limits and decodes
//! responses into typed values. The wire itself sits behind
//! [`InferenceTransport`] so the blocking HTTP implementation can be swapped.

pub mod huggingface;

pub use huggingface::HuggingFaceTransport;

use crate::config::InferenceConfig;
use crate::error::{InferenceError, ResponseFormatError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::{debug, warn};

/// Appended to any input cut down to the length limit
pub const TRUNCATION_MARKER: &str = "...";

/// Returned when a well-formed summarization response carries no summary
pub const SUMMARY_UNAVAILABLE: &str = "No summary available.";

/// Raw outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON request for a model and blocks until the service answers
pub trait InferenceTransport {
    fn post(&self, model: &str, payload: &serde_json::Value) -> Result<TransportResponse, InferenceError>;
}

impl<T: InferenceTransport + ?Sized> InferenceTransport for &T {
    fn post(&self, model: &str, payload: &serde_json::Value) -> Result<TransportResponse, InferenceError> {
        (**self).post(model, payload)
    }
}

impl<T: InferenceTransport + ?Sized> InferenceTransport for Box<T> {
    fn post(&self, model: &str, payload: &serde_json::Value) -> Result<TransportResponse, InferenceError> {
        (**self).post(model, payload)
    }
}

/// Target output length passed through to the summarizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationBounds {
    pub max_length: u32,
    pub min_length: u32,
}

#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Serialize)]
struct SummarizationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationBounds,
}

/// One label/score entry of a classification result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// One result list per input, each holding label/score entries
type ClassificationResponse = Vec<Vec<LabelScore>>;

/// Result of a summarization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Summary(String),
    /// The response was well formed but held no `summary_text`
    Unavailable,
}

impl SummaryOutcome {
    pub fn into_text(self) -> String {
        match self {
            Self::Summary(s) => s,
            Self::Unavailable => SUMMARY_UNAVAILABLE.to_string(),
        }
    }
}

/// Cut `text` to at most `limit` characters, appending [`TRUNCATION_MARKER`] when cut
pub fn truncate(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => Cow::Owned(format!("{}{}", &text[..idx], TRUNCATION_MARKER)),
        None => Cow::Borrowed(text),
    }
}

fn format_error(e: serde_json::Error, expected: &'static str) -> ResponseFormatError {
    match e.classify() {
        serde_json::error::Category::Data => ResponseFormatError::Shape {
            expected,
            found: e.to_string(),
        },
        _ => ResponseFormatError::InvalidJson(e.to_string()),
    }
}

/// Decode a classification body and take the first entry of the first result
pub fn decode_classification(body: &str) -> Result<LabelScore, ResponseFormatError> {
    let response: ClassificationResponse =
        serde_json::from_str(body).map_err(|e| format_error(e, "a list of label/score lists"))?;
    let first = response.into_iter().next().ok_or(ResponseFormatError::Empty)?;
    first.into_iter().next().ok_or(ResponseFormatError::NoLabels)
}

/// Decode a summarization body.
///
/// Only the first element is inspected. When it is an object without a string
/// `summary_text` the result degrades to [`SummaryOutcome::Unavailable`].
pub fn decode_summarization(body: &str) -> Result<SummaryOutcome, ResponseFormatError> {
    let response: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| format_error(e, "a list of summary objects"))?;
    let first = response.into_iter().next().ok_or(ResponseFormatError::Empty)?;
    let entry = match first {
        serde_json::Value::Object(entry) => entry,
        other => {
            return Err(ResponseFormatError::Shape {
                expected: "a summary object",
                found: other.to_string(),
            });
        }
    };
    Ok(match entry.get("summary_text").and_then(serde_json::Value::as_str) {
        Some(text) => SummaryOutcome::Summary(text.to_string()),
        None => SummaryOutcome::Unavailable,
    })
}

/// Request builder, size limiter and response decoder in front of a transport
pub struct InferenceClient<T: InferenceTransport> {
    transport: T,
    config: InferenceConfig,
}

impl<T: InferenceTransport> InferenceClient<T> {
    pub fn new(transport: T, config: InferenceConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn bounds(&self) -> GenerationBounds {
        GenerationBounds {
            max_length: self.config.summary_max_length,
            min_length: self.config.summary_min_length,
        }
    }

    fn send(&self, model: &str, payload: serde_json::Value) -> Result<String, InferenceError> {
        let response = self.transport.post(model, &payload)?;
        if !response.is_success() {
            return Err(InferenceError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.body)
    }

    /// Classify one comment, returning the top label
    pub fn classify(&self, text: &str) -> Result<LabelScore, InferenceError> {
        let limit = self.config.classification_char_limit;
        let input = truncate(text, limit);
        if matches!(input, Cow::Owned(_)) {
            debug!("Truncated comment to {} characters for classification", limit);
        }

        let payload = serde_json::to_value(ClassificationRequest { inputs: &input })
            .map_err(|e| InferenceError::Network(e.to_string()))?;
        let body = self.send(&self.config.classification_model, payload)?;
        let result = decode_classification(&body)?;
        debug!("Classified comment as {} (score {:?})", result.label, result.score);
        Ok(result)
    }

    /// Summarize the comments as one space-joined document with a single call
    pub fn summarize<S: AsRef<str>>(&self, comments: &[S]) -> Result<SummaryOutcome, InferenceError> {
        let combined = comments.iter().map(|c| c.as_ref()).collect::<Vec<_>>().join(" ");
        let limit = self.config.summarization_char_limit;
        let input = truncate(&combined, limit);
        if matches!(input, Cow::Owned(_)) {
            warn!(
                "Summarization input of {} characters truncated to {}",
                combined.chars().count(),
                limit
            );
        }

        let payload = serde_json::to_value(SummarizationRequest {
            inputs: &input,
            parameters: self.bounds(),
        })
        .map_err(|e| InferenceError::Network(e.to_string()))?;
        let body = self.send(&self.config.summarization_model, payload)?;
        let outcome = decode_summarization(&body)?;
        if outcome == SummaryOutcome::Unavailable {
            warn!("Summarization response carried no summary_text");
        }
        Ok(outcome)
    }
}
