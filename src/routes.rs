//! Route handlers: one GET per screen, one POST per confirm action.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::accounts;
use crate::error::{AppError, InputError};
use crate::gateway::{render_outcome, ImagePayload};
use crate::prompt::{self, CalorieGoal, DietType};
use crate::session::Session;
use crate::state::AppState;
use crate::views::{self, Outcome, Page};

/// Render `body` inside the page chrome, persist the session and attach its cookie.
fn render(state: &AppState, mut session: Session, status: StatusCode, body: &str) -> Response {
    let messages = session.context.take_messages();
    let html = views::layout(&session.context, &messages, body);
    let stored = state.sessions.store(&session);

    let mut response = (status, Html(html)).into_response();
    if let Some(cookie) = session.set_cookie().filter(|_| stored) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

fn open(state: &AppState, headers: &HeaderMap, page: Page) -> Session {
    let mut session = state.sessions.resolve(headers);
    session.context.current_page = page;
    session
}

pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = open(&state, &headers, Page::Home);
    render(&state, session, StatusCode::OK, &views::home())
}

pub async fn about(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = open(&state, &headers, Page::About);
    render(&state, session, StatusCode::OK, &views::about())
}

pub async fn contact_us(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = open(&state, &headers, Page::ContactUs);
    let body = views::contact_us(&state.contact_emails);
    render(&state, session, StatusCode::OK, &body)
}

pub async fn nutrition_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = open(&state, &headers, Page::NutritionCalculator);
    let body = views::nutrition_calculator(&Outcome::default());
    render(&state, session, StatusCode::OK, &body)
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>, InputError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InputError::new(format!("Could not read the upload: {e}")))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| InputError::new(format!("Could not read the upload: {e}")))?;
            return Ok(data.to_vec());
        }
    }
    Ok(Vec::new())
}

pub async fn nutrition_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let session = open(&state, &headers, Page::NutritionCalculator);

    let payload = match read_image_field(&mut multipart)
        .await
        .and_then(ImagePayload::from_upload)
    {
        Ok(payload) => payload,
        Err(e) => {
            tracing::info!(error = %e, "nutrition upload rejected");
            let body = views::nutrition_calculator(&Outcome::input_error(e.to_string()));
            return render(&state, session, StatusCode::BAD_REQUEST, &body);
        }
    };

    tracing::info!(mime = %payload.mime_type, bytes = payload.data.len(), "analyzing food image");
    let outcome = state
        .gateway
        .analyze_image(&payload, &prompt::build_nutrition_prompt())
        .await;

    let body = views::nutrition_calculator(&Outcome {
        result: Some(render_outcome(&outcome)),
        preview: Some(payload.data_url()),
        ..Outcome::default()
    });
    render(&state, session, StatusCode::OK, &body)
}

pub async fn diet_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = open(&state, &headers, Page::DietPlanner);
    let body = views::diet_planner(CalorieGoal::default(), DietType::Balanced, &Outcome::default());
    render(&state, session, StatusCode::OK, &body)
}

#[derive(Debug, Default, Deserialize)]
pub struct DietForm {
    #[serde(default)]
    pub calorie_goal: String,
    #[serde(default)]
    pub diet_type: String,
}

pub async fn diet_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<DietForm>,
) -> Response {
    let session = open(&state, &headers, Page::DietPlanner);

    let goal = form.calorie_goal.parse::<CalorieGoal>();
    let diet = form.diet_type.parse::<DietType>();
    let (goal, diet) = match (goal, diet) {
        (Ok(goal), Ok(diet)) => (goal, diet),
        (goal, diet) => {
            let message = [goal.as_ref().err(), diet.as_ref().err()]
                .into_iter()
                .flatten()
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            let body = views::diet_planner(
                goal.unwrap_or_default(),
                diet.unwrap_or(DietType::Balanced),
                &Outcome::input_error(message),
            );
            return render(&state, session, StatusCode::BAD_REQUEST, &body);
        }
    };

    let prompt = prompt::build_diet_prompt(goal, diet);
    tracing::info!(calorie_goal = goal.get(), diet = %diet, "generating diet plan");
    let outcome = state.gateway.generate_text(&prompt).await;

    let body = views::diet_planner(goal, diet, &Outcome::result(render_outcome(&outcome)));
    render(&state, session, StatusCode::OK, &body)
}

pub async fn meal_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = open(&state, &headers, Page::MealPlan);
    let body = views::meal_plan("", &Outcome::default());
    render(&state, session, StatusCode::OK, &body)
}

#[derive(Debug, Default, Deserialize)]
pub struct MealForm {
    #[serde(default)]
    pub ingredients: String,
}

pub async fn meal_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<MealForm>,
) -> Response {
    let session = open(&state, &headers, Page::MealPlan);

    if form.ingredients.trim().is_empty() {
        let body = views::meal_plan(
            &form.ingredients,
            &Outcome::input_error("Please enter at least one ingredient."),
        );
        return render(&state, session, StatusCode::BAD_REQUEST, &body);
    }

    let prompt = prompt::build_meal_plan_prompt(&form.ingredients);
    tracing::info!("generating meal plan");
    let outcome = state.gateway.generate_text(&prompt).await;

    let body = views::meal_plan(&form.ingredients, &Outcome::result(render_outcome(&outcome)));
    render(&state, session, StatusCode::OK, &body)
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: String,
}

/// Persist the session and send the browser back to the screen it came from.
fn back_to(state: &AppState, session: &Session, next: &str) -> Response {
    let stored = state.sessions.store(session);
    let page = Page::from_path(next).unwrap_or_default();
    let mut response = Redirect::to(page.path()).into_response();
    if let Some(cookie) = session.set_cookie().filter(|_| stored) {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AccountForm>,
) -> Result<Response, AppError> {
    let mut session = state.sessions.resolve(&headers);
    let mut users = state.users.lock().await;

    match accounts::register(&mut users, &form.username, &form.password) {
        Ok(()) => {
            let username = form.username.trim();
            if let Err(e) = state.credentials.save(&users) {
                users.remove(username);
                return Err(e.into());
            }
            tracing::info!(username, "registered user");
            session
                .context
                .push_message("Registration successful. You can now log in.");
        }
        Err(e) => session.context.push_message(e.to_string()),
    }
    drop(users);

    Ok(back_to(&state, &session, &form.next))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AccountForm>,
) -> Response {
    let mut session = state.sessions.resolve(&headers);
    let ok = {
        let users = state.users.lock().await;
        accounts::authenticate(&users, &form.username, &form.password)
    };

    if ok {
        let username = form.username.trim();
        session.context.sign_in(username);
        session.context.push_message(format!("Welcome back, {username}!"));
        tracing::info!(username, "user logged in");
    } else {
        session.context.push_message("Invalid username or password.");
    }
    back_to(&state, &session, &form.next)
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AccountForm>,
) -> Response {
    let mut session = state.sessions.resolve(&headers);
    session.context.sign_out();
    session.context.push_message("You have been logged out.");
    back_to(&state, &session, &form.next)
}
