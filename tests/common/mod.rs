#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use nutrigen::config::Config;
use nutrigen::credentials::{CredentialStore, Users};
use nutrigen::gateway::{GatewayError, ModelClient, ModelGateway, Part};
use nutrigen::state::AppState;
use reqwest::StatusCode;

pub const BOUNDARY: &str = "nutrigen-test-boundary";

/// Records every call and answers with a fixed reply.
pub struct StubClient {
    pub calls: Mutex<Vec<(String, Vec<Part>)>>,
    reply: Result<String, String>,
}

impl StubClient {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Ok(text.to_string()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Err(message.to_string()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_text_prompt(&self) -> Option<String> {
        let calls = self.calls.lock().unwrap();
        calls.last().and_then(|(_, parts)| {
            parts.iter().rev().find_map(|p| match p {
                Part::Text(t) => Some(t.clone()),
                Part::Image(_) => None,
            })
        })
    }
}

#[async_trait]
impl ModelClient for StubClient {
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

pub fn app_with_gateway(gateway: ModelGateway, users_file: &Path) -> (Router, Arc<AppState>) {
    let store = CredentialStore::new(users_file);
    let state = Arc::new(AppState::new(gateway, store, Users::new()));
    let router = nutrigen::build_router(state.clone(), &Config::default());
    (router, state)
}

pub fn app(client: Arc<StubClient>, users_file: &Path) -> Router {
    let gateway = ModelGateway::new(client, "text-model", "vision-model");
    app_with_gateway(gateway, users_file).0
}

pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

/// A multipart upload with a single `image` field.
pub fn upload(filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/nutrition-calculator")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([30, 160, 60]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut out),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    out
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the response's session cookie.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
