//! HTTP-facing errors. Every variant maps to one status code and the JSON body
//! `{error, message, availableLessons?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("L'identifiant de module '{0}' est invalide")]
    InvalidModuleId(String),

    #[error("Le module {0} n'existe pas")]
    ModuleNotFound(u32),

    #[error("La leçon {module_id}-{lesson_id} n'existe pas")]
    LessonNotFound { module_id: String, lesson_id: String, available: Vec<String> },

    #[error("La leçon {0} ne contient pas de quiz")]
    QuizNotFound(String),

    #[error("Session {0} inconnue")]
    SessionNotFound(String),

    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_lessons: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidModuleId(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ModuleNotFound(_) | Self::LessonNotFound { .. } | Self::QuizNotFound(_) | Self::SessionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
        }
    }

    /// Short, stable label for the `error` field.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidModuleId(_) => "Invalid module id",
            Self::ModuleNotFound(_) => "Module not found",
            Self::LessonNotFound { .. } => "Lesson not found",
            Self::QuizNotFound(_) => "Quiz not found",
            Self::SessionNotFound(_) => "Session not found",
            Self::BadRequest(_) => "Bad request",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let error = self.label();
        let available_lessons = match self {
            Self::LessonNotFound { available, .. } => Some(available),
            _ => None,
        };
        (status, Json(ErrorBody { error, message, available_lessons })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lesson_not_found_lists_available_lessons() {
        let err = ApiError::LessonNotFound {
            module_id: "1".into(),
            lesson_id: "9".into(),
            available: vec!["1-1".into(), "1-2".into()],
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Lesson not found");
        assert_eq!(json["message"], "La leçon 1-9 n'existe pas");
        assert_eq!(json["availableLessons"][1], "1-2");
    }

    #[tokio::test]
    async fn other_errors_omit_available_lessons() {
        let response = ApiError::InvalidModuleId("abc".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("availableLessons").is_none());
    }
}
