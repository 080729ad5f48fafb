//! NutriGen: a small web front end that turns food photos, calorie goals and
//! ingredient lists into prompts for a hosted generative model.

pub mod accounts;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod prompt;
pub mod routes;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod views;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::Config;
use crate::state::AppState;

/// Build the full application router.
pub fn build_router(state: Arc<AppState>, cfg: &Config) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route(
            "/nutrition-calculator",
            get(routes::nutrition_page).post(routes::nutrition_submit),
        )
        .route(
            "/diet-planner",
            get(routes::diet_page).post(routes::diet_submit),
        )
        .route("/meal-plan", get(routes::meal_page).post(routes::meal_submit))
        .route("/about", get(routes::about))
        .route("/contact-us", get(routes::contact_us))
        .route("/account/register", post(routes::register))
        .route("/account/login", post(routes::login))
        .route("/account/logout", post(routes::logout))
        .nest_service("/static", ServeDir::new(&cfg.static_dir))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
