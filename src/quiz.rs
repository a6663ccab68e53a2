//! Quiz grading.

use serde::Serialize;

use crate::domain::Quiz;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Perfect,
  Passed,
  KeepPracticing,
}

impl Verdict {
  pub fn message(self) -> &'static str {
    match self {
      Verdict::Perfect => "Parfait ! Vous avez répondu correctement à toutes les questions.",
      Verdict::Passed => "Bon travail ! Vous avez réussi le quiz.",
      Verdict::KeepPracticing => "Continuez à pratiquer pour vous améliorer.",
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
  pub question: String,
  pub selected: Option<String>,
  pub expected: String,
  pub correct: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub explanation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
  pub score: usize,
  pub total: usize,
  pub percent: u8,
  pub passed: bool,
  pub verdict: Verdict,
  pub message: &'static str,
  pub results: Vec<QuestionResult>,
}

/// Grade answers positionally. Missing answers count as unanswered, extra ones are ignored.
/// An empty quiz is trivially perfect.
pub fn grade_quiz(quiz: &Quiz, answers: &[Option<String>]) -> QuizResult {
  let results: Vec<QuestionResult> = quiz
    .questions
    .iter()
    .enumerate()
    .map(|(i, q)| {
      let selected = answers.get(i).cloned().flatten();
      let correct = selected.as_deref().map(|a| q.correct_answer.accepts(a)).unwrap_or(false);
      QuestionResult {
        question: q.question.clone(),
        selected,
        expected: q.correct_answer.display(),
        correct,
        explanation: q.explanation.clone(),
      }
    })
    .collect();

  let total = results.len();
  let score = results.iter().filter(|r| r.correct).count();
  let percent = if total == 0 { 100 } else { ((score * 100) as f64 / total as f64).round() as u8 };
  let verdict = if score == total {
    Verdict::Perfect
  } else if score * 2 >= total {
    Verdict::Passed
  } else {
    Verdict::KeepPracticing
  };

  QuizResult {
    score,
    total,
    percent,
    passed: verdict != Verdict::KeepPracticing,
    verdict,
    message: verdict.message(),
    results,
  }
}
