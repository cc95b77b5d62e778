use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    grid::templates::Template,
    middleware::AdminToken,
    models::{PriceCategory, SeatType, MAX_COLS},
    services::seat_setup::{SeatSetupSession, SetupError, SubmitOutcome},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/setup/templates", get(list_templates))
        .route(
            "/screens/{id}/setup",
            post(load_session).get(get_session).delete(discard_session),
        )
        .route("/screens/{id}/setup/type", patch(select_type))
        .route("/screens/{id}/setup/click", patch(click_cell))
        .route("/screens/{id}/setup/zone-mode", patch(toggle_zone_mode))
        .route("/screens/{id}/setup/resize", patch(resize))
        .route("/screens/{id}/setup/template-dialog", patch(template_dialog))
        .route("/screens/{id}/setup/template", patch(apply_template))
        .route("/screens/{id}/setup/prices", patch(set_price))
        .route("/screens/{id}/setup/submit", post(submit))
}

/* ---------- errors ---------- */

#[derive(Serialize)]
pub struct ApiError {
    success: bool,
    message: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn to_api_error(status: StatusCode, message: &str) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { success: false, message: message.to_string() }))
}

fn no_session(screen_id: i64) -> (StatusCode, Json<ApiError>) {
    to_api_error(
        StatusCode::NOT_FOUND,
        &format!("Seat setup for screen {} is not open", screen_id),
    )
}

fn setup_error(e: SetupError) -> (StatusCode, Json<ApiError>) {
    let status = match &e {
        SetupError::ScreenHasShowtimes => StatusCode::CONFLICT,
        SetupError::Submission(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::BAD_REQUEST,
    };
    if status == StatusCode::BAD_GATEWAY {
        tracing::error!("Seat setup submission failed: {}", e);
    }
    to_api_error(status, &e.to_string())
}

fn validation_error(e: validator::ValidationErrors) -> (StatusCode, Json<ApiError>) {
    to_api_error(StatusCode::BAD_REQUEST, &e.to_string())
}

/// Выполняет синхронное действие над сессией и возвращает ее снимок.
async fn edit<T: Serialize>(
    state: &AppState,
    screen_id: i64,
    action: impl FnOnce(&mut SeatSetupSession) -> Result<T, SetupError>,
) -> ApiResult<Json<serde_json::Value>> {
    let result = state
        .sessions
        .with_session_mut(screen_id, |session| {
            action(session).map(|outcome| (outcome, session.view()))
        })
        .await
        .ok_or_else(|| no_session(screen_id))?;

    let (outcome, view) = result.map_err(setup_error)?;
    Ok(Json(json!({
        "success": true,
        "outcome": outcome,
        "session": view,
    })))
}

/* ---------- SESSION ---------- */

// POST /api/screens/{id}/setup
async fn load_session(
    State(state): State<Arc<AppState>>,
    AdminToken(token): AdminToken,
    Path(screen_id): Path<i64>,
) -> impl IntoResponse {
    let api = state.booking.with_token(token);
    let session = SeatSetupSession::load(&api, screen_id).await;
    let view = session.view();
    state.sessions.insert(session).await;

    (StatusCode::OK, Json(json!({ "success": true, "session": view })))
}

// GET /api/screens/{id}/setup
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let session = state
        .sessions
        .get(screen_id)
        .await
        .ok_or_else(|| no_session(screen_id))?;

    Ok(Json(json!({ "success": true, "session": session.view() })))
}

// DELETE /api/screens/{id}/setup
async fn discard_session(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state
        .sessions
        .remove(screen_id)
        .await
        .ok_or_else(|| no_session(screen_id))?;

    Ok(StatusCode::NO_CONTENT)
}

/* ---------- EDITING ---------- */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectTypeRequest {
    seat_type: SeatType,
}

// PATCH /api/screens/{id}/setup/type
async fn select_type(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
    Json(req): Json<SelectTypeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    edit(&state, screen_id, |session| session.select_type(req.seat_type)).await
}

#[derive(Debug, Deserialize)]
struct ClickRequest {
    row: usize,
    col: usize,
}

// PATCH /api/screens/{id}/setup/click
async fn click_cell(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
    Json(req): Json<ClickRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    edit(&state, screen_id, |session| session.click(req.row, req.col)).await
}

// PATCH /api/screens/{id}/setup/zone-mode
async fn toggle_zone_mode(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    edit(&state, screen_id, |session| Ok(session.toggle_zone_mode())).await
}

#[derive(Debug, Deserialize, Validate)]
struct ResizeRequest {
    // больше 26 рядов не бывает, лишнее обрезается при ресайзе
    #[validate(range(min = 1))]
    rows: usize,
    #[validate(range(min = 1, max = MAX_COLS))]
    cols: usize,
}

// PATCH /api/screens/{id}/setup/resize
async fn resize(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
    Json(req): Json<ResizeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate().map_err(validation_error)?;
    edit(&state, screen_id, |session| {
        session.resize(req.rows, req.cols);
        Ok(())
    })
    .await
}

#[derive(Debug, Serialize)]
struct TemplateInfo {
    key: Template,
    name: &'static str,
    description: &'static str,
}

// GET /api/setup/templates
async fn list_templates() -> Json<Vec<TemplateInfo>> {
    Json(
        Template::ALL
            .into_iter()
            .map(|t| TemplateInfo {
                key: t,
                name: t.name(),
                description: t.description(),
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
struct TemplateDialogRequest {
    open: bool,
}

// PATCH /api/screens/{id}/setup/template-dialog
async fn template_dialog(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
    Json(req): Json<TemplateDialogRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    edit(&state, screen_id, |session| {
        if req.open {
            session.open_template_dialog();
        } else {
            session.close_template_dialog();
        }
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize)]
struct TemplateRequest {
    template: Template,
}

// PATCH /api/screens/{id}/setup/template
async fn apply_template(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
    Json(req): Json<TemplateRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    edit(&state, screen_id, |session| {
        session.choose_template(req.template);
        session.apply_template();
        Ok(())
    })
    .await
}

#[derive(Debug, Deserialize, Validate)]
struct PriceRequest {
    category: PriceCategory,
    #[validate(range(min = 0.0))]
    price: f64,
}

// PATCH /api/screens/{id}/setup/prices
async fn set_price(
    State(state): State<Arc<AppState>>,
    Path(screen_id): Path<i64>,
    Json(req): Json<PriceRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    req.validate().map_err(validation_error)?;
    edit(&state, screen_id, |session| session.set_price(req.category, req.price)).await
}

/* ---------- SUBMIT ---------- */

// POST /api/screens/{id}/setup/submit
async fn submit(
    State(state): State<Arc<AppState>>,
    AdminToken(token): AdminToken,
    Path(screen_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    // Сетевые вызовы идут по копии сессии, без блокировки хранилища
    let session = state
        .sessions
        .get(screen_id)
        .await
        .ok_or_else(|| no_session(screen_id))?;

    let api = state.booking.with_token(token);
    let outcome = session.submit(&api).await.map_err(setup_error)?;

    let message = match outcome {
        SubmitOutcome::NoChanges => "No changes, nothing to save",
        SubmitOutcome::Saved => "Seat layout and seat prices saved",
    };
    // после сохранения (или если сохранять нечего) редактор закрывается
    state.sessions.remove(screen_id).await;

    Ok(Json(json!({
        "success": true,
        "outcome": outcome,
        "message": message,
    })))
}
