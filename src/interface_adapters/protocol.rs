use serde::{Deserialize, Serialize};

// Envelope wrapping every backend response: {code, message, data}.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

// Subset of the envelope read from failed responses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub message: Option<String>,
}

// Request payload for the analysis service.
#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub content: &'a str,
}
