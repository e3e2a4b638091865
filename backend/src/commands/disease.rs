use axum::extract::{FromRequest, Json, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::ai::extract::{bool_field, number_field, string_field};
use crate::ai::{CompletionRequest, GatewayError, ImageInput};
use crate::error::{LeafError, LeafResult};
use crate::models::{AlertKind, NewAlert, NewDiseaseScan};
use crate::state::AppState;

pub const UNKNOWN_DISEASE: &str = "Unknown";
pub const DEFAULT_CONFIDENCE: f64 = 75.0;
pub const DEFAULT_SEVERITY: &str = "low";
pub const DEFAULT_TREATMENT: &str = "Consult a local plant specialist for a detailed diagnosis.";
/// Unhealthy results at or above this level raise an alert.
pub const ALERT_SEVERITY_FLOOR: Severity = Severity::Medium;

const DISEASE_PROMPT: &str = "You are a plant pathologist. Examine this plant image and diagnose any disease, pest damage or nutrient deficiency.\n\
Respond with a JSON object only, with keys:\n\
\"disease_name\" (string, \"Healthy\" if none), \"confidence\" (0-100), \"severity\" (\"low\", \"medium\", \"high\" or \"critical\"), \
\"treatment\" (short recommended treatment), \"is_healthy\" (boolean).";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "mild" => Some(Severity::Low),
            "medium" | "moderate" => Some(Severity::Medium),
            "high" | "severe" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnosis {
    pub disease_name: String,
    pub confidence: f64,
    pub severity: String,
    pub treatment: String,
    pub is_healthy: bool,
}

impl Diagnosis {
    pub fn from_completion(obj: Option<&Map<String, Value>>) -> Self {
        Self {
            disease_name: string_field(obj, "disease_name").unwrap_or_else(|| UNKNOWN_DISEASE.to_string()),
            confidence: number_field(obj, "confidence").unwrap_or(DEFAULT_CONFIDENCE),
            severity: string_field(obj, "severity")
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_SEVERITY.to_string()),
            treatment: string_field(obj, "treatment").unwrap_or_else(|| DEFAULT_TREATMENT.to_string()),
            is_healthy: bool_field(obj, "is_healthy").unwrap_or(false),
        }
    }

    pub fn failed() -> Self {
        Self {
            disease_name: "Analysis Failed".to_string(),
            confidence: 0.0,
            severity: "unknown".to_string(),
            treatment: "Unable to analyze the image. Please try again with a clearer photo.".to_string(),
            is_healthy: false,
        }
    }

    /// `None` when the result does not warrant an alert.
    pub fn alert(&self) -> Option<NewAlert> {
        if self.is_healthy {
            return None;
        }
        let severity = Severity::parse(&self.severity)?;
        if severity < ALERT_SEVERITY_FLOOR {
            return None;
        }
        let kind = if severity >= Severity::High {
            AlertKind::Critical
        } else {
            AlertKind::Warning
        };
        Some(NewAlert::new(
            kind,
            format!(
                "Disease detected: {} ({} severity, {}% confidence)",
                self.disease_name, self.severity, self.confidence
            ),
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DiseasePayload {
    pub image_base64: Option<String>,
    pub image_url: Option<String>,
    pub mime_type: Option<String>,
}

/// Accepts raw base64 or a `data:<mime>;base64,` URL; validates the payload decodes.
pub fn decode_inline_image(raw: &str, mime_hint: Option<&str>) -> LeafResult<(ImageInput, String)> {
    let (mime_type, data) = match raw.strip_prefix("data:").and_then(|rest| rest.split_once(";base64,")) {
        Some((mime, data)) => (mime.to_string(), data.trim().to_string()),
        None => (
            mime_hint.unwrap_or("image/jpeg").to_string(),
            raw.trim().to_string(),
        ),
    };
    let bytes = general_purpose::STANDARD.decode(&data)?;
    if bytes.is_empty() {
        return Err(LeafError::Validation("Image payload is empty".to_string()));
    }
    let image_ref = format!("inline:{}:{}b", mime_type, bytes.len());
    Ok((ImageInput::Base64 { data, mime_type }, image_ref))
}

impl DiseasePayload {
    pub fn into_image(self) -> LeafResult<(ImageInput, Option<String>)> {
        if let Some(raw) = self.image_base64.filter(|s| !s.trim().is_empty()) {
            let (image, image_ref) = decode_inline_image(&raw, self.mime_type.as_deref())?;
            return Ok((image, Some(image_ref)));
        }
        if let Some(url) = self.image_url.filter(|s| !s.trim().is_empty()) {
            let url = url.trim().to_string();
            return Ok((ImageInput::Url(url.clone()), Some(url)));
        }
        Err(LeafError::Validation("No image provided".to_string()))
    }
}

async fn read_multipart(mut multipart: Multipart) -> LeafResult<(ImageInput, Option<String>)> {
    let mut payload = DiseasePayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| LeafError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        if name == "image" || (is_file && payload.image_base64.is_none()) {
            let mime_type = field
                .content_type()
                .unwrap_or("image/jpeg")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| LeafError::Validation(format!("Failed to read image: {}", e)))?;
            if bytes.is_empty() {
                continue;
            }
            payload.image_base64 = Some(general_purpose::STANDARD.encode(&bytes));
            payload.mime_type = Some(mime_type);
        } else if name == "image_url" {
            let text = field
                .text()
                .await
                .map_err(|e| LeafError::Validation(format!("Failed to read image_url: {}", e)))?;
            payload.image_url = Some(text);
        }
    }

    payload.into_image()
}

async fn read_image(state: &AppState, req: Request) -> LeafResult<(ImageInput, Option<String>)> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| LeafError::Validation(e.body_text()))?;
        read_multipart(multipart).await
    } else {
        let Json(payload) = Json::<DiseasePayload>::from_request(req, state).await?;
        payload.into_image()
    }
}

async fn diagnose(state: &AppState, image: ImageInput, image_ref: Option<String>) -> LeafResult<Diagnosis> {
    let text = state
        .gateway
        .complete(CompletionRequest::vision(DISEASE_PROMPT, image))
        .await?;

    let obj = state.extractor.extract(&text);
    if obj.is_none() {
        tracing::warn!("Disease completion had no JSON object; using defaults");
    }
    let diagnosis = Diagnosis::from_completion(obj.as_ref());

    let scan_id = state
        .store
        .insert_disease_scan(NewDiseaseScan {
            disease_name: diagnosis.disease_name.clone(),
            confidence: diagnosis.confidence,
            severity: diagnosis.severity.clone(),
            treatment: diagnosis.treatment.clone(),
            is_healthy: diagnosis.is_healthy,
            image_ref,
        })
        .await?;
    tracing::info!(
        "Disease scan {}: {} (healthy={}, severity={})",
        scan_id,
        diagnosis.disease_name,
        diagnosis.is_healthy,
        diagnosis.severity
    );

    // Separate write: a failure here leaves the scan without its alert.
    if let Some(alert) = diagnosis.alert() {
        state.store.insert_alert(alert).await?;
    }

    Ok(diagnosis)
}

pub async fn predict_disease(State(state): State<AppState>, req: Request) -> Response {
    let (image, image_ref) = match read_image(&state, req).await {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    match diagnose(&state, image, image_ref).await {
        Ok(diagnosis) => Json(diagnosis).into_response(),
        Err(e @ LeafError::Upstream(GatewayError::RateLimited | GatewayError::PaymentRequired)) => {
            e.into_response()
        }
        Err(e) => {
            tracing::error!("Disease analysis failed: {}", e);
            let mut body = json!(Diagnosis::failed());
            body["error"] = json!(e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}
