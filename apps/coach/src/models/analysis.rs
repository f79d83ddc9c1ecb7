use serde::{Deserialize, Serialize};

/// GET /health payload. Rendered verbatim, so every field is kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub timestamp: String,
}

/// POST /upload-cv success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub text: String,
}

/// POST /analyze success payload. Produced by the backend and shown as-is.
///
/// `match_percentage` is not range-checked; `85.0` and `85` both display as
/// "85" through `f64`'s `Display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_percentage: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub learning_suggestions: Vec<String>,
}

/// Qualitative bucket shown next to the match percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLabel {
    Excellent, // >= 80
    Good,      // 60 - 79
    Fair,      // 40 - 59
    Weak,      // < 40
}

impl AnalysisResult {
    pub fn label(&self) -> MatchLabel {
        let pct = self.match_percentage;
        if pct >= 80.0 {
            MatchLabel::Excellent
        } else if pct >= 60.0 {
            MatchLabel::Good
        } else if pct >= 40.0 {
            MatchLabel::Fair
        } else {
            MatchLabel::Weak
        }
    }
}

/// Form fields for POST /analyze.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub cv_text: String,
    pub job_description: String,
    pub api_key: String,
}
