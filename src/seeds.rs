//! Seed data: the built-in lesson bank, module metadata and placeholder records.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{Lesson, ModuleInfo};

const BUILTIN_LESSONS: &str = include_str!("../content/lessons.toml");

#[derive(Deserialize)]
struct LessonBank {
  #[serde(default)]
  lessons: Vec<Lesson>,
}

/// Parse the embedded lesson bank. The bank ships with the binary, so a parse
/// error here is a packaging bug and is reported to the caller.
pub fn seed_lessons() -> Result<Vec<Lesson>, toml::de::Error> {
  toml::from_str::<LessonBank>(BUILTIN_LESSONS).map(|bank| bank.lessons)
}

/// Titles and levels for modules 1..=16.
pub fn seed_module_meta() -> BTreeMap<u32, ModuleInfo> {
  let rows: [(u32, &str, &str, &str); 16] = [
    (1, "Introduction à Next.js", "Découvrez les bases et l'écosystème de Next.js.", "débutant"),
    (2, "Fondamentaux de Next.js", "Pages, routage, récupération de données, et composants.", "débutant"),
    (3, "Fonctionnalités Intermédiaires", "API Routes, génération statique et dynamique, et plus.", "intermédiaire"),
    (4, "React Avancé avec Next.js", "Hooks avancés, gestion d'état, et patterns.", "intermédiaire"),
    (5, "API et Bases de Données", "Intégration de backends et gestion de données.", "avancé"),
    (6, "Routage Avancé", "App Router, migration et techniques avancées.", "avancé"),
    (7, "Authentification et Sécurité", "NextAuth.js, sessions utilisateur et sécurisation.", "expert"),
    (8, "Internationalisation", "i18n, thèmes, et fonctionnalités avancées de Next.js.", "expert"),
    (9, "Tests et Qualité", "Tests unitaires, intégration et E2E pour Next.js.", "intermédiaire"),
    (10, "CMS Headless", "Intégration avec Strapi et autres CMS modernes.", "avancé"),
    (11, "Architecture d'Entreprise", "Projets à grande échelle et design patterns.", "expert"),
    (12, "DevOps et Déploiement", "Docker, CI/CD et monitoring d'applications Next.js.", "expert"),
    (13, "Sécurité Avancée", "Protection API, vulnérabilités et sécurité client.", "expert"),
    (14, "Bases de Données", "Intégration, optimisation et gestion en production.", "avancé"),
    (15, "SEO et Performance", "Optimisation avancée et métriques de performance.", "expert"),
    (16, "Projet Final", "Planification, développement et certification.", "expert"),
  ];
  rows
    .into_iter()
    .map(|(id, title, description, difficulty)| {
      (id, ModuleInfo { title: title.into(), description: description.into(), difficulty: difficulty.into() })
    })
    .collect()
}

/// Metadata returned for module numbers nobody configured.
pub fn fallback_module_info(module_number: u32) -> ModuleInfo {
  ModuleInfo {
    title: format!("Module {}", module_number),
    description: "Description du module à définir.".into(),
    difficulty: "débutant".into(),
  }
}

/// Stand-in record served for a missing lesson of a known module
/// (only when `synthesize_missing_lessons` is enabled).
pub fn placeholder_lesson(module_id: &str, lesson_id: &str) -> Lesson {
  let key = format!("{}-{}", module_id, lesson_id);
  Lesson {
    id: key.clone(),
    title: format!("Leçon {}", key),
    description: format!("Description de la leçon {}", key),
    difficulty: "intermédiaire".into(),
    duration: 30,
    tags: vec!["Next.js".into(), "React".into()],
    prerequisites: vec![],
    content: format!("<h2>Contenu de la leçon {}</h2>", key),
    example: None,
    exercise: None,
    quiz: None,
    project: None,
    ai_support: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_bank_parses_and_has_first_lesson() {
    let lessons = seed_lessons().expect("embedded bank must parse");
    let first = lessons.iter().find(|l| l.id == "1-1").unwrap();
    assert!(!first.title.is_empty());
    assert_eq!(first.quiz.as_ref().unwrap().questions.len(), 3);
    assert_eq!(first.exercise.as_ref().unwrap().kind.as_deref(), Some("matching"));
  }

  #[test]
  fn module_meta_covers_sixteen_modules() {
    let meta = seed_module_meta();
    assert_eq!(meta.len(), 16);
    assert_eq!(meta[&16].title, "Projet Final");
  }

  #[test]
  fn placeholder_uses_composite_key() {
    let l = placeholder_lesson("6", "9");
    assert_eq!(l.id, "6-9");
    assert_eq!(l.content, "<h2>Contenu de la leçon 6-9</h2>");
    assert!(l.quiz.is_none());
  }
}
