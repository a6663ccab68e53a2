//! Domain models: lessons and their sub-records, module metadata, and modules.
//!
//! Lesson records keep the camelCase JSON shape the frontend already consumes,
//! so the same structs deserialize from the embedded TOML bank and serialize
//! straight into API responses.

use serde::{Deserialize, Serialize};

/// Atomic content unit. `id` has the form `"<module>-<n>"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub difficulty: String,
  /// Minutes.
  #[serde(default)] pub duration: u32,
  #[serde(default)] pub tags: Vec<String>,
  #[serde(default)] pub prerequisites: Vec<String>,
  /// HTML fragment.
  #[serde(default)] pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub example: Option<Example>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub exercise: Option<Exercise>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub quiz: Option<Quiz>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub project: Option<Project>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub ai_support: Option<AiSupport>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Example {
  pub title: String,
  pub code: String,
  #[serde(default)] pub explanation: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub language: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
  pub title: String,
  #[serde(default)] pub description: String,
  /// e.g. "matching", "code"
  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")] pub kind: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub initial_code: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub solution: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")] pub options: Vec<ExerciseOption>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseOption {
  pub id: u32,
  pub text: String,
  #[serde(default)] pub correct: bool,
  #[serde(default)] pub answer: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
  pub title: String,
  /// Seconds.
  #[serde(default, skip_serializing_if = "Option::is_none")] pub time_limit: Option<u32>,
  #[serde(default)] pub questions: Vec<QuizQuestion>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub correct_answer: CorrectAnswer,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub explanation: Option<String>,
}

/// A question accepts either one answer or any of several.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CorrectAnswer {
  One(String),
  AnyOf(Vec<String>),
}

impl CorrectAnswer {
  pub fn accepts(&self, answer: &str) -> bool {
    match self {
      CorrectAnswer::One(expected) => expected == answer,
      CorrectAnswer::AnyOf(accepted) => accepted.iter().any(|a| a == answer),
    }
  }

  /// Human-readable expected answer(s), joined with " / ".
  pub fn display(&self) -> String {
    match self {
      CorrectAnswer::One(expected) => expected.clone(),
      CorrectAnswer::AnyOf(accepted) => accepted.join(" / "),
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub initial_code: String,
  #[serde(default)] pub solution: String,
  #[serde(default, skip_serializing_if = "Option::is_none")] pub language: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AiSupport {
  pub mentor: String,
  #[serde(default)] pub features: Vec<String>,
  #[serde(default)] pub tips: Vec<String>,
}

/// Display metadata for a module number.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModuleInfo {
  pub title: String,
  pub description: String,
  pub difficulty: String,
}

/// Ordered grouping of lessons sharing an id prefix.
#[derive(Clone, Debug, Serialize)]
pub struct Module {
  pub id: String,
  pub title: String,
  pub description: String,
  pub level: String,
  pub lessons: Vec<Lesson>,
}

impl Module {
  /// Sum of lesson durations in minutes.
  pub fn total_duration(&self) -> u32 {
    self.lessons.iter().map(|l| l.duration).sum()
  }
}
