//! Read-only lesson catalog: lookup by id, module grouping and ordering.
//!
//! The catalog is built once at startup from the embedded bank plus config
//! extensions and never mutated afterwards, so handlers share it behind an `Arc`
//! without locking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, error, info};

use crate::config::CatalogCfg;
use crate::domain::{Lesson, Module, ModuleInfo};
use crate::seeds::{fallback_module_info, placeholder_lesson, seed_lessons, seed_module_meta};

/// Parsed form of a lesson id `"<module>-<rest>"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonKey {
    pub module: u32,
    /// Leading digits of the lesson part, if any ("3-part1" -> 3).
    pub number: Option<u32>,
    pub rest: String,
}

impl LessonKey {
    pub fn parse(id: &str) -> Option<Self> {
        let (module, rest) = id.trim().split_once('-')?;
        let module = module.parse::<u32>().ok()?;
        if rest.is_empty() {
            return None;
        }
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        let number = digits.parse::<u32>().ok();
        Some(Self { module, number, rest: rest.to_string() })
    }
}

impl Ord for LessonKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.module
            .cmp(&other.module)
            .then_with(|| match (self.number, other.number) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| self.rest.cmp(&other.rest))
    }
}

impl PartialOrd for LessonKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    lessons: BTreeMap<LessonKey, Lesson>,
    module_meta: BTreeMap<u32, ModuleInfo>,
    synthesize_missing: bool,
}

impl Catalog {
    /// Build from the embedded bank, then apply config extensions.
    pub fn from_config(cfg: &CatalogCfg) -> Self {
        let mut lessons = match seed_lessons() {
            Ok(l) => l,
            Err(e) => {
                error!(target: "catalog", error = %e, "Embedded lesson bank failed to parse; starting empty");
                Vec::new()
            }
        };
        lessons.extend(cfg.lessons.iter().cloned());

        let mut meta = seed_module_meta();
        for m in &cfg.modules {
            meta.insert(
                m.id,
                ModuleInfo { title: m.title.clone(), description: m.description.clone(), difficulty: m.difficulty.clone() },
            );
        }

        let catalog = Self::new(lessons, meta, cfg.synthesize_missing_lessons);
        info!(
            target: "catalog",
            lessons = catalog.lessons.len(),
            modules = catalog.modules().len(),
            synthesize_missing = catalog.synthesize_missing,
            "Catalog ready"
        );
        catalog
    }

    /// Index lessons by key. Later entries replace earlier ones with the same id;
    /// malformed ids are skipped.
    pub fn new(lessons: Vec<Lesson>, module_meta: BTreeMap<u32, ModuleInfo>, synthesize_missing: bool) -> Self {
        let mut by_key = BTreeMap::new();
        for lesson in lessons {
            match LessonKey::parse(&lesson.id) {
                Some(key) => {
                    if by_key.insert(key, lesson).is_some() {
                        debug!(target: "catalog", "Lesson replaced by later definition");
                    }
                }
                None => {
                    error!(target: "catalog", id = %lesson.id, "Skipping lesson: id is not '<module>-<n>'");
                }
            }
        }
        Self { lessons: by_key, module_meta, synthesize_missing }
    }

    pub fn synthesize_missing(&self) -> bool {
        self.synthesize_missing
    }

    /// Exact key first, then the integer-normalised key ("01" -> "1").
    pub fn get_lesson(&self, module_id: &str, lesson_id: &str) -> Option<&Lesson> {
        let module_id = module_id.trim();
        let lesson_id = lesson_id.trim();
        if let Some(key) = LessonKey::parse(&format!("{}-{}", module_id, lesson_id)) {
            if let Some(lesson) = self.lessons.get(&key) {
                return Some(lesson);
            }
        }
        let m = module_id.parse::<u32>().ok()?;
        let l = lesson_id.parse::<u32>().ok()?;
        let key = LessonKey::parse(&format!("{}-{}", m, l))?;
        self.lessons.get(&key)
    }

    /// Lesson for the pair, or a placeholder when synthesis is on and the module is known.
    pub fn get_or_synthesize(&self, module_id: &str, lesson_id: &str) -> Option<Lesson> {
        if let Some(lesson) = self.get_lesson(module_id, lesson_id) {
            return Some(lesson.clone());
        }
        if !self.synthesize_missing {
            return None;
        }
        let module_number = module_id.trim().parse::<u32>().ok()?;
        let lesson_id = lesson_id.trim();
        if lesson_id.is_empty() || !self.module_meta.contains_key(&module_number) {
            return None;
        }
        debug!(target: "catalog", module = module_number, %lesson_id, "Synthesizing placeholder lesson");
        Some(placeholder_lesson(&module_number.to_string(), lesson_id))
    }

    /// Every lesson in (module, lesson) order.
    pub fn get_all_lessons(&self) -> Vec<&Lesson> {
        self.lessons.values().collect()
    }

    pub fn get_module_lessons(&self, module_number: u32) -> Vec<&Lesson> {
        self.lessons
            .iter()
            .filter(|(k, _)| k.module == module_number)
            .map(|(_, l)| l)
            .collect()
    }

    pub fn get_module_info(&self, module_number: u32) -> ModuleInfo {
        self.module_meta
            .get(&module_number)
            .cloned()
            .unwrap_or_else(|| fallback_module_info(module_number))
    }

    pub fn module(&self, module_number: u32) -> Option<Module> {
        let lessons: Vec<Lesson> = self.get_module_lessons(module_number).into_iter().cloned().collect();
        if lessons.is_empty() {
            return None;
        }
        let info = self.get_module_info(module_number);
        Some(Module {
            id: module_number.to_string(),
            title: info.title,
            description: info.description,
            level: info.difficulty,
            lessons,
        })
    }

    /// Modules with at least one lesson, in module order.
    pub fn modules(&self) -> Vec<Module> {
        let mut numbers: Vec<u32> = self.lessons.keys().map(|k| k.module).collect();
        numbers.dedup();
        numbers.into_iter().filter_map(|n| self.module(n)).collect()
    }

    pub fn lesson_ids(&self) -> Vec<String> {
        self.lessons.values().map(|l| l.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogCfg;

    fn lesson(id: &str, duration: u32) -> Lesson {
        let mut l = placeholder_lesson("0", "0");
        l.id = id.into();
        l.title = format!("Lesson {}", id);
        l.duration = duration;
        l
    }

    fn builtin() -> Catalog {
        Catalog::from_config(&CatalogCfg::default())
    }

    #[test]
    fn known_lesson_has_title() {
        let c = builtin();
        let l = c.get_lesson("1", "1").unwrap();
        assert!(!l.title.is_empty());
    }

    #[test]
    fn unknown_lesson_is_none() {
        let c = builtin();
        assert!(c.get_lesson("99", "99").is_none());
        assert!(c.get_lesson("", "").is_none());
        assert!(c.get_lesson("abc", "1").is_none());
    }

    #[test]
    fn lookup_normalises_padding_and_whitespace() {
        let c = builtin();
        assert_eq!(c.get_lesson(" 01 ", "1").unwrap().id, "1-1");
    }

    #[test]
    fn ordering_is_numeric_not_lexical() {
        let c = Catalog::new(
            vec![lesson("10-1", 5), lesson("2-10", 5), lesson("2-2", 5), lesson("2-3-part1", 5)],
            BTreeMap::new(),
            false,
        );
        let ids: Vec<&str> = c.get_all_lessons().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2-2", "2-3-part1", "2-10", "10-1"]);
    }

    #[test]
    fn malformed_ids_are_skipped_and_duplicates_replaced() {
        let mut replacement = lesson("1-1", 99);
        replacement.title = "Replaced".into();
        let c = Catalog::new(vec![lesson("bad", 1), lesson("1-", 1), lesson("1-1", 5), replacement], BTreeMap::new(), false);
        assert_eq!(c.lesson_ids(), vec!["1-1".to_string()]);
        assert_eq!(c.get_lesson("1", "1").unwrap().title, "Replaced");
    }

    #[test]
    fn module_groups_lessons_by_prefix() {
        let c = builtin();
        let m = c.module(1).unwrap();
        assert_eq!(m.title, "Introduction à Next.js");
        assert!(m.lessons.iter().all(|l| l.id.starts_with("1-")));
        assert_eq!(m.total_duration(), m.lessons.iter().map(|l| l.duration).sum::<u32>());
        assert!(c.module(42).is_none());
    }

    #[test]
    fn module_info_falls_back_for_unknown_numbers() {
        let c = builtin();
        let info = c.get_module_info(99);
        assert_eq!(info.title, "Module 99");
        assert_eq!(info.difficulty, "débutant");
    }

    #[test]
    fn synthesis_only_for_known_modules() {
        let mut meta = BTreeMap::new();
        meta.insert(6, fallback_module_info(6));
        let c = Catalog::new(vec![], meta, true);
        assert_eq!(c.get_or_synthesize("6", "2").unwrap().title, "Leçon 6-2");
        assert!(c.get_or_synthesize("7", "1").is_none());

        let off = Catalog::new(vec![], seed_module_meta(), false);
        assert!(off.get_or_synthesize("6", "2").is_none());
    }
}
