//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Catalog reads (module list/detail, lesson lookup with 404 bodies)
//!   - Quiz grading against a lesson's quiz
//!   - Preview rendering (never fails; errors become the error panel)
//!   - Session actions through the gamification reducer
//!   - Code analysis

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::analyzer::{analyze, Analysis};
use crate::domain::Lesson;
use crate::error::ApiError;
use crate::gamification::Action;
use crate::preview::{render_preview, PreviewOutcome};
use crate::protocol::{
  module_detail, module_summary, progress_out, AnalyzeIn, CompleteIn, ModuleDetailOut, ModuleSummary, PreviewIn,
  ReducedOut, SessionOut,
};
use crate::quiz::{grade_quiz, QuizResult};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Local calendar day used for streaks.
pub fn today() -> NaiveDate {
  chrono::Local::now().date_naive()
}

/// Route ids are positive integers; "0", "" and "abc" are rejected.
pub fn parse_module_id(raw: &str) -> Result<u32, ApiError> {
  match raw.trim().parse::<u32>() {
    Ok(n) if n > 0 => Ok(n),
    _ => Err(ApiError::InvalidModuleId(raw.to_string())),
  }
}

pub fn list_modules(state: &AppState) -> Vec<ModuleSummary> {
  state.catalog.modules().iter().map(module_summary).collect()
}

#[instrument(level = "info", skip(state))]
pub fn get_module_detail(state: &AppState, module_id: &str) -> Result<ModuleDetailOut, ApiError> {
  let n = parse_module_id(module_id)?;
  let module = state.catalog.module(n).ok_or(ApiError::ModuleNotFound(n))?;
  Ok(module_detail(&module))
}

#[instrument(level = "info", skip(state))]
pub fn find_lesson(state: &AppState, module_id: &str, lesson_id: &str) -> Result<Lesson, ApiError> {
  match state.catalog.get_or_synthesize(module_id, lesson_id) {
    Some(lesson) => Ok(lesson),
    None => {
      warn!(target: "catalog", %module_id, %lesson_id, "Lesson not found");
      Err(ApiError::LessonNotFound {
        module_id: module_id.trim().to_string(),
        lesson_id: lesson_id.trim().to_string(),
        available: state.catalog.lesson_ids(),
      })
    }
  }
}

#[instrument(level = "info", skip(state, answers), fields(answers = answers.len()))]
pub fn grade_lesson_quiz(
  state: &AppState,
  module_id: &str,
  lesson_id: &str,
  answers: &[Option<String>],
) -> Result<QuizResult, ApiError> {
  let lesson = find_lesson(state, module_id, lesson_id)?;
  let quiz = lesson.quiz.as_ref().ok_or_else(|| ApiError::QuizNotFound(lesson.id.clone()))?;
  let result = grade_quiz(quiz, answers);
  info!(target: "catalog", lesson = %lesson.id, score = result.score, total = result.total, "Quiz graded");
  Ok(result)
}

#[instrument(level = "info", skip(state, body), fields(language = %body.language, code_len = body.code.len()))]
pub fn do_preview(state: &AppState, body: &PreviewIn) -> PreviewOutcome {
  let outcome = render_preview(&body.code, &body.language, body.height.as_deref(), &state.preview);
  debug!(target: "preview", status = outcome.status(), code = %trunc_for_log(&body.code, 120), "Preview rendered");
  outcome
}

pub async fn start_session(state: &AppState) -> SessionOut {
  let (session_id, progress) = state.create_session().await;
  SessionOut { session_id, progress: progress_out(&progress) }
}

pub async fn session_progress(state: &AppState, session_id: &str) -> Result<SessionOut, ApiError> {
  let progress = state
    .session(session_id)
    .await
    .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
  Ok(SessionOut { session_id: session_id.to_string(), progress: progress_out(&progress) })
}

#[instrument(level = "info", skip(state))]
pub async fn apply_action(state: &AppState, session_id: &str, action: Action) -> Result<ReducedOut, ApiError> {
  let reduced = state
    .apply(session_id, &action)
    .await
    .ok_or_else(|| ApiError::SessionNotFound(session_id.to_string()))?;
  Ok(ReducedOut { progress: progress_out(&reduced.state), events: reduced.events })
}

/// Completion of a lesson the catalog serves. Ids are canonicalised from the
/// resolved lesson ("02"/"2" -> "2") so lesson badges match.
pub fn lesson_completion(state: &AppState, body: CompleteIn, today: NaiveDate) -> Result<Action, ApiError> {
  let lesson = find_lesson(state, &body.module_id, &body.lesson_id)?;
  let (module_id, lesson_id) = match lesson.id.split_once('-') {
    Some((m, l)) => (m.to_string(), l.to_string()),
    None => (body.module_id, body.lesson_id),
  };
  Ok(Action::CompleteLesson {
    module_id,
    lesson_id,
    accuracy: body.accuracy,
    fast_completion: body.fast_completion,
    today,
  })
}

#[instrument(level = "info", skip(body), fields(code_len = body.code.len(), language = ?body.language))]
pub fn analyze_code(body: &AnalyzeIn) -> Result<Analysis, ApiError> {
  if body.code.trim().is_empty() {
    return Err(ApiError::BadRequest("Le code à analyser est manquant".into()));
  }
  let analysis = analyze(&body.code, body.language.as_deref());
  info!(target: "nextmimo_backend", language = %analysis.language, score = analysis.score, "Code analyzed");
  Ok(analysis)
}
