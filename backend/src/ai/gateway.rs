use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use super::{CompletionGateway, CompletionRequest, GatewayError, ImageInput};
use crate::config::GatewayConfig;

/// OpenAI-compatible `chat/completions` client.
#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    cfg: GatewayConfig,
}

impl HttpGateway {
    pub fn new(cfg: GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| GatewayError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.cfg.base_url.trim_end_matches('/'))
    }
}

pub(crate) fn build_body(model: &str, request: &CompletionRequest) -> Value {
    let content = match &request.image {
        None => json!(request.prompt),
        Some(image) => {
            let url = match image {
                ImageInput::Url(url) => url.clone(),
                ImageInput::Base64 { data, mime_type } => {
                    format!("data:{};base64,{}", mime_type, data)
                }
            };
            json!([
                { "type": "text", "text": request.prompt },
                { "type": "image_url", "image_url": { "url": url } }
            ])
        }
    };

    json!({
        "model": model,
        "messages": [{ "role": "user", "content": content }]
    })
}

/// Missing or empty content yields an empty string; callers fall back to field defaults.
pub(crate) fn extract_text(envelope: &Value) -> String {
    let content = &envelope["choices"][0]["message"]["content"];
    let text = match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    };
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
        .to_string()
}

#[async_trait]
impl CompletionGateway for HttpGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<String, GatewayError> {
        let api_key = self.cfg.api_key.as_deref().ok_or(GatewayError::NotConfigured)?;
        let url = self.endpoint();
        tracing::debug!(
            model = %self.cfg.model,
            vision = request.image.is_some(),
            "POST {}",
            url
        );

        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&build_body(&self.cfg.model, &request))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited,
                StatusCode::PAYMENT_REQUIRED => GatewayError::PaymentRequired,
                _ => GatewayError::Status {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let envelope: Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        let text = extract_text(&envelope);
        if text.is_empty() {
            tracing::warn!("Completion envelope carried no message content");
        }
        Ok(text)
    }
}
