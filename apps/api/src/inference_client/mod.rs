//! Inference client: the single point of entry for hosted model calls.
//!
//! ARCHITECTURAL RULE: No other module may call the inference endpoint directly.
//! Script generation and chat both go through `InferenceClient::generate`.
//!
//! Generation parameters are fixed here and are not configurable per call.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Hosted instruction-tuned model used when `INFERENCE_MODEL_URL` is unset.
pub const DEFAULT_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct-v0.1";
const MAX_NEW_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const REPETITION_PENALTY: f32 = 1.1;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Prompt is required")]
    EmptyPrompt,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Inference API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed inference response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    do_sample: bool,
    return_full_text: bool,
    repetition_penalty: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: MAX_NEW_TOKENS,
            temperature: TEMPERATURE,
            do_sample: true,
            return_full_text: false,
            repetition_penalty: REPETITION_PENALTY,
        }
    }
}

/// The single inference client used by all services.
/// One request per call; failures are returned to the caller, never retried.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    api_token: String,
    model_url: String,
}

impl InferenceClient {
    pub fn new(api_token: String, model_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_token,
            model_url,
        }
    }

    /// Model identifier reported back to callers, e.g. `mistralai/Mistral-7B-Instruct-v0.1`.
    pub fn model(&self) -> &str {
        model_name(&self.model_url)
    }

    /// Sends a single prompt and returns the trimmed generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        if prompt.trim().is_empty() {
            return Err(InferenceError::EmptyPrompt);
        }

        info!(
            "Processing inference request with prompt: {}...",
            prompt.chars().take(100).collect::<String>()
        );

        let request_body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters::default(),
        };

        let response = self
            .client
            .post(&self.model_url)
            .bearer_auth(&self.api_token)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Inference API error: {body}");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = response.json().await?;
        let text = extract_generated_text(&body);
        debug!("Generated text length: {}", text.len());
        Ok(text)
    }
}

/// Pulls generated text out of the shapes the hosted endpoint returns.
/// Unknown shapes are passed through as their JSON text.
fn extract_generated_text(body: &Value) -> String {
    let text = match body {
        Value::Array(items) if !items.is_empty() => items[0]
            .get("generated_text")
            .or_else(|| items[0].get("translation_text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::Object(map) if map.contains_key("generated_text") => map
            .get("generated_text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::String(s) => s.clone(),
        other => {
            warn!("Unexpected inference response format: {other}");
            other.to_string()
        }
    };
    text.trim().to_string()
}

fn model_name(model_url: &str) -> &str {
    model_url
        .split_once("/models/")
        .map(|(_, name)| name.trim_end_matches('/'))
        .filter(|name| !name.is_empty())
        .unwrap_or(model_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_from_array() {
        let body = json!([{ "generated_text": "  Hello {name}!  " }]);
        assert_eq!(extract_generated_text(&body), "Hello {name}!");
    }

    #[test]
    fn test_extract_translation_text_fallback() {
        let body = json!([{ "translation_text": "Namaste" }]);
        assert_eq!(extract_generated_text(&body), "Namaste");
    }

    #[test]
    fn test_extract_from_object() {
        let body = json!({ "generated_text": "Script" });
        assert_eq!(extract_generated_text(&body), "Script");
    }

    #[test]
    fn test_extract_from_bare_string() {
        assert_eq!(extract_generated_text(&json!(" plain ")), "plain");
    }

    #[test]
    fn test_unknown_shape_passes_through_as_json() {
        let body = json!({ "estimated_time": 20.0 });
        assert_eq!(extract_generated_text(&body), "{\"estimated_time\":20.0}");
    }

    #[test]
    fn test_array_without_text_is_empty() {
        assert_eq!(extract_generated_text(&json!([{ "score": 1 }])), "");
    }

    #[test]
    fn test_fixed_generation_parameters() {
        let json = serde_json::to_value(GenerationRequest {
            inputs: "hi",
            parameters: GenerationParameters::default(),
        })
        .unwrap();
        assert_eq!(json["inputs"], "hi");
        assert_eq!(json["parameters"]["max_new_tokens"], 500);
        assert_eq!(json["parameters"]["do_sample"], true);
        assert_eq!(json["parameters"]["return_full_text"], false);
        let temperature = json["parameters"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        let penalty = json["parameters"]["repetition_penalty"].as_f64().unwrap();
        assert!((penalty - 1.1).abs() < 1e-6);
    }

    #[test]
    fn test_model_name_from_url() {
        assert_eq!(
            model_name(DEFAULT_MODEL_URL),
            "mistralai/Mistral-7B-Instruct-v0.1"
        );
        assert_eq!(model_name("http://localhost:8081/generate"), "http://localhost:8081/generate");
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_without_network() {
        let client = InferenceClient::new("token".to_string(), DEFAULT_MODEL_URL.to_string());
        assert!(matches!(
            client.generate("   ").await,
            Err(InferenceError::EmptyPrompt)
        ));
    }
}
