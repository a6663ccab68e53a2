//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analyzer::Analysis;
use crate::catalog::LessonKey;
use crate::domain::{Lesson, Module};
use crate::gamification::{Event, GamificationState};
use crate::preview::{PreviewOutcome, PreviewWarning};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartSession,
    ResumeSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    AddXp {
        amount: u64,
    },
    UnlockBadge {
        #[serde(rename = "badgeId")]
        badge_id: String,
    },
    CompleteLesson(CompleteIn),
    GetProgress,
    Preview(PreviewIn),
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        #[serde(rename = "sessionId")]
        session_id: String,
        progress: ProgressOut,
    },
    Progress {
        progress: ProgressOut,
        events: Vec<Event>,
    },
    Preview(PreviewOut),
    Error {
        message: String,
    },
}

//
// Catalog DTOs
//

#[derive(Debug, Serialize)]
pub struct LessonBrief {
    pub id: String,
    pub title: String,
    pub duration: u32,
}

#[derive(Debug, Serialize)]
pub struct ModuleSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub lessons: Vec<LessonBrief>,
}

pub fn module_summary(m: &Module) -> ModuleSummary {
    ModuleSummary {
        id: m.id.clone(),
        title: m.title.clone(),
        description: m.description.clone(),
        difficulty: m.level.clone(),
        lessons: m
            .lessons
            .iter()
            .map(|l| LessonBrief { id: l.id.clone(), title: l.title.clone(), duration: l.duration })
            .collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct ModuleLessonOut {
    /// Lesson number inside the module.
    pub id: u32,
    pub title: String,
    pub duration: u32,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDetailOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: String,
    pub lessons: Vec<ModuleLessonOut>,
    pub duration: String,
    pub total_completed_lessons: u32,
}

/// Lesson numbers as shown in module detail, unique within the module. The
/// numeric part of the id is used once; a lesson without one, or repeating one
/// ("2-3" then "2-3-part1"), takes its position or the next free number after it.
fn lesson_numbers(lessons: &[Lesson]) -> Vec<u32> {
    let mut used = HashSet::new();
    lessons
        .iter()
        .enumerate()
        .map(|(i, lesson)| {
            let wanted = LessonKey::parse(&lesson.id).and_then(|k| k.number);
            let mut n = match wanted {
                Some(n) if !used.contains(&n) => n,
                _ => i as u32 + 1,
            };
            while !used.insert(n) {
                n += 1;
            }
            n
        })
        .collect()
}

pub fn module_detail(m: &Module) -> ModuleDetailOut {
    ModuleDetailOut {
        id: m.id.clone(),
        title: m.title.clone(),
        description: m.description.clone(),
        level: m.level.clone(),
        lessons: m
            .lessons
            .iter()
            .zip(lesson_numbers(&m.lessons))
            .map(|(l, id)| ModuleLessonOut {
                id,
                title: l.title.clone(),
                duration: l.duration,
                completed: false,
            })
            .collect(),
        duration: format!("{} min", m.total_duration()),
        total_completed_lessons: 0,
    }
}

//
// Quiz
//

#[derive(Debug, Deserialize)]
pub struct QuizIn {
    #[serde(default)]
    pub answers: Vec<Option<String>>,
}

//
// Preview
//

#[derive(Debug, Deserialize)]
pub struct PreviewIn {
    #[serde(default)]
    pub code: String,
    pub language: String,
    #[serde(default)]
    pub height: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewOut {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    pub embed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<PreviewWarning>,
}

pub fn preview_out(outcome: &PreviewOutcome) -> PreviewOut {
    PreviewOut {
        status: outcome.status(),
        document: outcome.document_html(),
        embed: outcome.embed(),
        error: outcome.error().map(|e| e.to_string()),
        warnings: outcome.warnings().to_vec(),
    }
}

//
// Gamification
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    #[serde(flatten)]
    pub state: GamificationState,
    pub level_name: &'static str,
    pub level_progress: u8,
}

pub fn progress_out(state: &GamificationState) -> ProgressOut {
    ProgressOut { state: state.clone(), level_name: state.level_name(), level_progress: state.level_progress() }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOut {
    pub session_id: String,
    pub progress: ProgressOut,
}

#[derive(Debug, Serialize)]
pub struct ReducedOut {
    pub progress: ProgressOut,
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
pub struct XpIn {
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeIn {
    pub badge_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteIn {
    pub module_id: String,
    pub lesson_id: String,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub fast_completion: bool,
}

//
// Analyzer
//

#[derive(Debug, Deserialize)]
pub struct AnalyzeIn {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: Option<String>,
}

pub type AnalyzeOut = Analysis;

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
