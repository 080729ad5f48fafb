use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::views::escape;

/// Missing or unusable user input. Shown inline on the screen that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InputError(String);

impl InputError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failures a handler cannot turn into an on-screen message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        let body = format!(
            "<!DOCTYPE html><html><head><title>NutriGen - Error</title></head>\
             <body><h1>Something went wrong</h1><p>{}</p><p><a href=\"/\">Back to Home</a></p></body></html>",
            escape(&self.to_string())
        );
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}
