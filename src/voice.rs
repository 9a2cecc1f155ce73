//! Voice note processing client.
//!
//! Audio is shipped to the AI service as base64; the service returns a
//! transcription, a summary, a detected language, and structured entities.
//! The call sits behind [`VoiceProcessor`] so messaging can be tested with
//! a mock and never needs a live service.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ExtractedEntities, LanguageHint, VoiceAiProcessed};

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Cannot reach voice service at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Voice service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Failed to parse voice service response: {0}")]
    ResponseParsing(String),
}

/// Request body for POST /process-voice
#[derive(Debug, Serialize)]
pub struct VoiceProcessingRequest {
    pub audio_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_hint: Option<LanguageHint>,
}

impl VoiceProcessingRequest {
    pub fn from_audio(audio: &[u8], language_hint: Option<LanguageHint>) -> Self {
        Self {
            audio_base64: base64::engine::general_purpose::STANDARD.encode(audio),
            language_hint,
        }
    }
}

/// Response body from POST /process-voice
#[derive(Debug, Deserialize)]
pub struct VoiceProcessingResponse {
    pub transcription: String,
    pub summary: Option<String>,
    pub language_detected: Option<String>,
    #[serde(default)]
    pub entities: ExtractedEntities,
}

impl From<VoiceProcessingResponse> for VoiceAiProcessed {
    fn from(response: VoiceProcessingResponse) -> Self {
        VoiceAiProcessed {
            transcription: response.transcription,
            summary: response.summary.unwrap_or_default(),
            language_detected: response.language_detected.unwrap_or_default(),
            entities: response.entities,
        }
    }
}

/// Seam between messaging and the AI service.
pub trait VoiceProcessor {
    fn process(&self, request: &VoiceProcessingRequest) -> Result<VoiceProcessingResponse, VoiceError>;
}

/// HTTP client for the voice-processing service.
pub struct VoiceServiceClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl VoiceServiceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, VoiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| VoiceError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// Client pointed at the configured service URL with a 2-minute timeout.
    /// Transcription of a long voice note is slow but not unbounded.
    pub fn from_env() -> Result<Self, VoiceError> {
        Self::new(&crate::config::voice_service_url(), 120)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl VoiceProcessor for VoiceServiceClient {
    fn process(&self, request: &VoiceProcessingRequest) -> Result<VoiceProcessingResponse, VoiceError> {
        let url = format!("{}/process-voice", self.base_url);

        let response = self.client.post(&url).json(request).send().map_err(|e| {
            if e.is_connect() {
                VoiceError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                VoiceError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
            } else {
                VoiceError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(VoiceError::Service {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| VoiceError::ResponseParsing(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) struct MockVoiceProcessor {
    response_json: String,
}

#[cfg(test)]
impl MockVoiceProcessor {
    pub fn new(response_json: &str) -> Self {
        Self {
            response_json: response_json.to_string(),
        }
    }
}

#[cfg(test)]
impl VoiceProcessor for MockVoiceProcessor {
    fn process(&self, _request: &VoiceProcessingRequest) -> Result<VoiceProcessingResponse, VoiceError> {
        serde_json::from_str(&self.response_json)
            .map_err(|e| VoiceError::ResponseParsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_encodes_audio_as_base64() {
        let request = VoiceProcessingRequest::from_audio(b"audio bytes", None);
        assert_eq!(request.audio_base64, "YXVkaW8gYnl0ZXM=");
    }

    #[test]
    fn language_hint_omitted_when_absent() {
        let request = VoiceProcessingRequest::from_audio(b"x", None);
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("language_hint"));

        let hinted = VoiceProcessingRequest::from_audio(b"x", Some(LanguageHint::Hindi));
        let json = serde_json::to_string(&hinted).unwrap();
        assert!(json.contains("\"language_hint\":\"hi\""));
    }

    #[test]
    fn response_parses_with_sparse_entities() {
        let json = r#"{
            "transcription": "Take paracetamol twice daily",
            "summary": null,
            "language_detected": "en"
        }"#;
        let response: VoiceProcessingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.transcription, "Take paracetamol twice daily");
        assert!(response.entities.medicines.is_empty());
    }

    #[test]
    fn response_converts_to_ai_processed() {
        let json = r#"{
            "transcription": "Bukhar ke liye dawai",
            "summary": "Medication for fever",
            "language_detected": "hi",
            "entities": {
                "medicines": [{"name": "Paracetamol", "dosage": "500mg", "frequency": "twice daily"}],
                "conditions": ["fever"]
            }
        }"#;
        let response: VoiceProcessingResponse = serde_json::from_str(json).unwrap();
        let processed: VoiceAiProcessed = response.into();
        assert_eq!(processed.entities.medicines.len(), 1);
        assert_eq!(processed.entities.medicines[0].name, "Paracetamol");
        assert_eq!(processed.language_detected, "hi");
    }

    #[test]
    fn client_strips_trailing_slash() {
        let client = VoiceServiceClient::new("http://localhost:8000/", 10).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn mock_processor_returns_configured_response() {
        let mock = MockVoiceProcessor::new(
            r#"{"transcription": "hello", "summary": null, "language_detected": null}"#,
        );
        let request = VoiceProcessingRequest::from_audio(b"x", None);
        let response = mock.process(&request).unwrap();
        assert_eq!(response.transcription, "hello");
    }
}
