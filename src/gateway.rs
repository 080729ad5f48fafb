//! Calls to the hosted generative model.
//!
//! [`ModelGateway`] exposes the two capabilities the screens need, text
//! completion and image analysis. The wire work sits behind [`ModelClient`]
//! so handlers can be driven against a stub.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use reqwest::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;
use crate::error::InputError;

const LOGGED_BODY_CHARS: usize = 500;
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("API key not configured; set GOOGLE_API_KEY")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("model returned no text")]
    EmptyResponse,
    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Render a gateway outcome the way screens display it.
pub fn render_outcome(outcome: &Result<String, GatewayError>) -> String {
    match outcome {
        Ok(text) => text.clone(),
        Err(e) => format!("Error: {e}"),
    }
}

/// An uploaded image, held only for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Validate uploaded bytes as a JPEG or PNG picture.
    pub fn from_upload(data: Vec<u8>) -> Result<Self, InputError> {
        if data.is_empty() {
            return Err(InputError::new("No file is uploaded!"));
        }

        let format = image::guess_format(&data)
            .map_err(|_| InputError::new("Unsupported file type; upload a JPG or PNG image."))?;
        let mime_type = match format {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            _ => return Err(InputError::new("Unsupported file type; upload a JPG or PNG image.")),
        };

        image::load_from_memory_with_format(&data, format)
            .map_err(|_| InputError::new("The uploaded file could not be read as an image."))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    pub fn base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64())
    }
}

/// One ordered segment of a model request.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    Image(ImagePayload),
}

impl Part {
    fn to_json(&self) -> Value {
        match self {
            Part::Text(text) => json!({ "text": text }),
            Part::Image(img) => json!({
                "inline_data": {
                    "mime_type": img.mime_type,
                    "data": img.base64(),
                }
            }),
        }
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, model: &str, parts: &[Part]) -> Result<String, GatewayError>;
}

/// `generateContent` client for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key,
        }
    }

    pub fn request_body(parts: &[Part]) -> Value {
        let parts: Vec<Value> = parts.iter().map(Part::to_json).collect();
        json!({ "contents": [{ "parts": parts }] })
    }

    /// Concatenate the text parts of the first candidate.
    pub fn extract_text(body: &Value) -> Result<String, GatewayError> {
        let text: String = body["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text)
    }

    fn api_error(status: StatusCode, body: &str) -> GatewayError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());
        GatewayError::Api { status, message }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn complete(&self, model: &str, parts: &[Part]) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.api_base, model);

        tracing::info!(model, parts = parts.len(), "sending request to model");

        // reqwest errors print the request URL; keep it out of rendered errors.
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(&Self::request_body(parts))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;
        tracing::info!(model, %status, "model responded");
        tracing::debug!(
            body = %response_text.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
            "model response body"
        );

        if !status.is_success() {
            return Err(Self::api_error(status, &response_text));
        }

        let body: Value = serde_json::from_str(&response_text)?;
        Self::extract_text(&body)
    }
}

#[derive(Clone)]
pub struct ModelGateway {
    client: Arc<dyn ModelClient>,
    text_model: String,
    vision_model: String,
}

impl ModelGateway {
    pub fn new(
        client: Arc<dyn ModelClient>,
        text_model: impl Into<String>,
        vision_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            text_model: text_model.into(),
            vision_model: vision_model.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let client = GeminiClient::new(cfg.api_base.clone(), cfg.api_key.clone());
        Self::new(Arc::new(client), &cfg.text_model, &cfg.vision_model)
    }

    /// Image first, then the instruction text.
    pub async fn analyze_image(
        &self,
        image: &ImagePayload,
        prompt: &str,
    ) -> Result<String, GatewayError> {
        let parts = [Part::Image(image.clone()), Part::Text(prompt.to_string())];
        self.call(&self.vision_model, &parts).await
    }

    pub async fn generate_text(&self, prompt: &str) -> Result<String, GatewayError> {
        let parts = [Part::Text(prompt.to_string())];
        self.call(&self.text_model, &parts).await
    }

    async fn call(&self, model: &str, parts: &[Part]) -> Result<String, GatewayError> {
        let outcome = self.client.complete(model, parts).await;
        if let Err(e) = &outcome {
            tracing::warn!(model, error = %e, "model call failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        calls: Mutex<Vec<(String, Vec<Part>)>>,
        reply: Result<String, String>,
    }

    #[async_trait]
    impl ModelClient for Recording {
        async fn complete(&self, model: &str, parts: &[Part]) -> Result<String, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), parts.to_vec()));
            self.reply
                .clone()
                .map_err(|message| GatewayError::Api {
                    status: StatusCode::TOO_MANY_REQUESTS,
                    message,
                })
        }
    }

    fn gateway(reply: Result<String, String>) -> (ModelGateway, Arc<Recording>) {
        let client = Arc::new(Recording {
            calls: Mutex::new(Vec::new()),
            reply,
        });
        (ModelGateway::new(client.clone(), "text-m", "vision-m"), client)
    }

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        out
    }

    #[tokio::test]
    async fn generate_text_uses_text_model_with_single_part() {
        let (gw, client) = gateway(Ok("plan".into()));
        assert_eq!(gw.generate_text("hello").await.unwrap(), "plan");

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls[0].0, "text-m");
        assert_eq!(calls[0].1.len(), 1);
        assert!(matches!(&calls[0].1[0], Part::Text(t) if t == "hello"));
    }

    #[tokio::test]
    async fn analyze_image_sends_image_then_prompt_to_vision_model() {
        let (gw, client) = gateway(Ok("salad".into()));
        let img = ImagePayload::from_upload(png_bytes()).unwrap();
        assert_eq!(gw.analyze_image(&img, "describe").await.unwrap(), "salad");

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls[0].0, "vision-m");
        assert!(matches!(&calls[0].1[0], Part::Image(i) if i.mime_type == "image/png"));
        assert!(matches!(&calls[0].1[1], Part::Text(t) if t == "describe"));
    }

    #[tokio::test]
    async fn failures_render_with_error_prefix() {
        let (gw, _) = gateway(Err("quota exceeded".into()));
        let text = render_outcome(&gw.generate_text("x").await);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("quota exceeded"));

        let img = ImagePayload::from_upload(png_bytes()).unwrap();
        let text = render_outcome(&gw.analyze_image(&img, "x").await);
        assert!(text.starts_with("Error: "));
        assert!(text.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new("http://127.0.0.1:9", None);
        let err = client
            .complete("m", &[Part::Text("hi".into())])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MissingApiKey));
    }

    #[test]
    fn empty_upload_is_an_input_error() {
        let err = ImagePayload::from_upload(Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "No file is uploaded!");
    }

    #[test]
    fn non_image_upload_is_rejected() {
        assert!(ImagePayload::from_upload(b"plain text, not a picture".to_vec()).is_err());
    }

    #[test]
    fn png_upload_gets_mime_and_data_url() {
        let img = ImagePayload::from_upload(png_bytes()).unwrap();
        assert_eq!(img.mime_type, "image/png");
        assert!(img.data_url().starts_with("data:image/png;base64,iVBOR"));
    }

    #[test]
    fn request_body_has_inline_data_and_text() {
        let img = ImagePayload::from_upload(png_bytes()).unwrap();
        let body = GeminiClient::request_body(&[Part::Image(img.clone()), Part::Text("p".into())]);
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], img.base64());
        assert_eq!(parts[1]["text"], "p");
    }

    #[test]
    fn extract_text_joins_parts_of_first_candidate() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(GeminiClient::extract_text(&body).unwrap(), "Hello, world");

        let empty = json!({ "candidates": [] });
        assert!(matches!(
            GeminiClient::extract_text(&empty),
            Err(GatewayError::EmptyResponse)
        ));
    }

    #[test]
    fn api_error_prefers_structured_message() {
        let err = GeminiClient::api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error": {"code": 400, "message": "API key not valid."}}"#,
        );
        assert_eq!(err.to_string(), "API error 400 Bad Request: API key not valid.");

        let err = GeminiClient::api_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert!(err.to_string().ends_with("upstream down"));
    }
}
