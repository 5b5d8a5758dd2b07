use thiserror::Error;

use crate::siri::ShapeError;

/// Failures while fetching or reading a stop-monitoring response.
///
/// The `Display` text is what the tool caller sees; the full error goes to
/// the log.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("❌ API Error: HTTP {status} - {body}")]
    Status { status: u16, body: String },
    #[error("❌ Error: Network or request failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("❌ Error processing API response: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("❌ Error processing API response: {0}")]
    Shape(#[from] ShapeError),
}
