//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::gamification::{Action, BADGES, LEVELS};
use crate::logic::*;
use crate::preview::PreviewOutcome;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_modules(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let modules = list_modules(&state);
  info!(target: "catalog", count = modules.len(), "HTTP modules listed");
  Json(modules)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_module(
  State(state): State<Arc<AppState>>,
  Path(module_id): Path<String>,
) -> Result<Json<ModuleDetailOut>, ApiError> {
  let detail = get_module_detail(&state, &module_id)?;
  info!(target: "catalog", %module_id, lessons = detail.lessons.len(), "HTTP module served");
  Ok(Json(detail))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Path((module_id, lesson_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
  let lesson = find_lesson(&state, &module_id, &lesson_id)?;
  info!(target: "catalog", id = %lesson.id, "HTTP lesson served");
  Ok(Json(lesson))
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_lessons(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let lessons: Vec<_> = state.catalog.get_all_lessons().into_iter().cloned().collect();
  Json(lessons)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_quiz(
  State(state): State<Arc<AppState>>,
  Path((module_id, lesson_id)): Path<(String, String)>,
  Json(body): Json<QuizIn>,
) -> Result<impl IntoResponse, ApiError> {
  let result = grade_lesson_quiz(&state, &module_id, &lesson_id, &body.answers)?;
  Ok(Json(result))
}

#[instrument(level = "info", skip(state, body), fields(language = %body.language, code_len = body.code.len()))]
pub async fn http_post_preview(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PreviewIn>,
) -> impl IntoResponse {
  let outcome = do_preview(&state, &body);
  Json(preview_out(&outcome))
}

/// Raw sandbox document for clients that load it by URL instead of `srcdoc`.
#[instrument(level = "info", skip(state, body), fields(language = %body.language, code_len = body.code.len()))]
pub async fn http_post_preview_document(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PreviewIn>,
) -> Response {
  let html = [(header::CONTENT_TYPE, "text/html; charset=utf-8")];
  match do_preview(&state, &body) {
    PreviewOutcome::Ready { preview, .. } => (StatusCode::OK, html, preview.document.render()).into_response(),
    PreviewOutcome::Empty { .. } => StatusCode::NO_CONTENT.into_response(),
    failed @ PreviewOutcome::Failed { .. } => (StatusCode::UNPROCESSABLE_ENTITY, html, failed.embed()).into_response(),
  }
}

#[instrument(level = "info")]
pub async fn http_list_badges() -> impl IntoResponse { Json(BADGES.to_vec()) }

#[instrument(level = "info")]
pub async fn http_list_levels() -> impl IntoResponse { Json(LEVELS.to_vec()) }

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  (StatusCode::CREATED, Json(start_session(&state).await))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionOut>, ApiError> {
  Ok(Json(session_progress(&state, &session_id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
  if state.remove_session(&session_id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::SessionNotFound(session_id))
  }
}

#[instrument(level = "info", skip(state, body), fields(amount = body.amount))]
pub async fn http_post_xp(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<XpIn>,
) -> Result<Json<ReducedOut>, ApiError> {
  Ok(Json(apply_action(&state, &session_id, Action::AddXp(body.amount)).await?))
}

#[instrument(level = "info", skip(state, body), fields(badge = %body.badge_id))]
pub async fn http_post_badge(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<BadgeIn>,
) -> Result<Json<ReducedOut>, ApiError> {
  Ok(Json(apply_action(&state, &session_id, Action::UnlockBadge(body.badge_id)).await?))
}

#[instrument(level = "info", skip(state, body), fields(module = %body.module_id, lesson = %body.lesson_id))]
pub async fn http_post_complete(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<String>,
  Json(body): Json<CompleteIn>,
) -> Result<Json<ReducedOut>, ApiError> {
  let action = lesson_completion(&state, body, today())?;
  Ok(Json(apply_action(&state, &session_id, action).await?))
}

#[instrument(level = "info", skip(body), fields(code_len = body.code.len()))]
pub async fn http_post_analyze(Json(body): Json<AnalyzeIn>) -> Result<Json<AnalyzeOut>, ApiError> {
  Ok(Json(analyze_code(&body)?))
}
