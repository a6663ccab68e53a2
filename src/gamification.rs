//! Session-scoped progress model: XP, levels, badges and daily streaks.
//!
//! `GamificationState` is a plain serializable value. All mutation goes through
//! [`reduce`], which takes the current state and an [`Action`] and returns the
//! next state plus the [`Event`]s the action produced. Nothing here touches a
//! clock or a lock; callers pass `today` in and own storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub level: u32,
    pub name: &'static str,
    pub min_xp: u64,
    /// `None` for the open-ended top level.
    pub max_xp: Option<u64>,
}

pub const LEVELS: [Level; 5] = [
    Level { level: 1, name: "Novice", min_xp: 0, max_xp: Some(500) },
    Level { level: 2, name: "Apprentice", min_xp: 501, max_xp: Some(1500) },
    Level { level: 3, name: "Developer", min_xp: 1501, max_xp: Some(3000) },
    Level { level: 4, name: "Artisan", min_xp: 3001, max_xp: Some(5000) },
    Level { level: 5, name: "Master", min_xp: 5001, max_xp: None },
];

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const BADGES: [Badge; 10] = [
    Badge { id: "first_step", name: "First Step", description: "Complete your first lesson", icon: "🚶" },
    Badge { id: "explorer", name: "Explorer", description: "Visit every section of the application", icon: "🧭" },
    Badge { id: "diligent", name: "Diligent", description: "7 consecutive days of learning", icon: "📆" },
    Badge { id: "marathoner", name: "Marathoner", description: "30 consecutive days of learning", icon: "🏃" },
    Badge { id: "perfectionist", name: "Perfectionist", description: "100% success on a whole module", icon: "💯" },
    Badge { id: "router", name: "Router", description: "Mastered the routing system", icon: "🧭" },
    Badge { id: "data_architect", name: "Data Architect", description: "Data fetching expertise", icon: "📊" },
    Badge { id: "api_maestro", name: "API Maestro", description: "Built advanced API routes", icon: "🔌" },
    Badge { id: "optimizer", name: "Optimizer", description: "Performance excellence", icon: "⚡" },
    Badge { id: "polyglot", name: "Polyglot", description: "Implemented internationalization", icon: "🌐" },
];

pub const LESSON_BASE_XP: u64 = 100;
pub const ACCURACY_BONUS_XP: f64 = 50.0;
pub const FAST_COMPLETION_XP: u64 = 30;

pub fn find_badge(id: &str) -> Option<&'static Badge> {
    BADGES.iter().find(|b| b.id == id)
}

/// Level whose band contains `xp`.
pub fn level_for_xp(xp: u64) -> &'static Level {
    LEVELS.iter().rev().find(|l| xp >= l.min_xp).unwrap_or(&LEVELS[0])
}

fn level_info(level: u32) -> &'static Level {
    LEVELS.iter().find(|l| l.level == level).unwrap_or(&LEVELS[0])
}

/// Badge awarded for completing a specific lesson.
fn lesson_badge(module_id: &str, lesson_id: &str) -> Option<&'static str> {
    match (module_id.trim(), lesson_id.trim()) {
        ("2", "2") => Some("router"),
        ("2", "4") => Some("data_architect"),
        ("3", "1") => Some("api_maestro"),
        ("4", "3") => Some("optimizer"),
        ("3", "4") => Some("polyglot"),
        _ => None,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GamificationState {
    pub xp: u64,
    pub level: u32,
    /// Badge ids in unlock order, no duplicates.
    pub badges: Vec<String>,
    pub streak_days: u32,
    pub last_activity: Option<NaiveDate>,
}

impl Default for GamificationState {
    fn default() -> Self {
        Self { xp: 0, level: 1, badges: Vec::new(), streak_days: 0, last_activity: None }
    }
}

impl GamificationState {
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b == id)
    }

    pub fn level_name(&self) -> &'static str {
        level_info(self.level).name
    }

    /// Percent through the current level band, capped at 100. The top level has no band.
    pub fn level_progress(&self) -> u8 {
        let info = level_info(self.level);
        let Some(max) = info.max_xp else { return 0 };
        let range = max.saturating_sub(info.min_xp);
        if range == 0 {
            return 100;
        }
        let into = self.xp.saturating_sub(info.min_xp);
        let pct = ((into as f64 / range as f64) * 100.0).round();
        pct.min(100.0) as u8
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    AddXp(u64),
    UnlockBadge(String),
    RecordActivity(NaiveDate),
    CompleteLesson {
        module_id: String,
        lesson_id: String,
        /// 0.0..=1.0; clamped.
        accuracy: Option<f64>,
        fast_completion: bool,
        today: NaiveDate,
    },
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    XpAwarded { amount: u64, total: u64 },
    LevelUp { from: u32, to: u32 },
    BadgeUnlocked { badge: String },
    BadgeAlreadyUnlocked { badge: String },
    UnknownBadge { badge: String },
    StreakUpdated { days: u32 },
    LessonCompleted { lesson: String, points: u64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reduced {
    pub state: GamificationState,
    pub events: Vec<Event>,
}

pub fn reduce(state: GamificationState, action: &Action) -> Reduced {
    let mut state = state;
    let mut events = Vec::new();
    match action {
        Action::AddXp(amount) => add_xp(&mut state, *amount, &mut events),
        Action::UnlockBadge(id) => unlock_badge(&mut state, id, &mut events),
        Action::RecordActivity(today) => record_activity(&mut state, *today, &mut events),
        Action::CompleteLesson { module_id, lesson_id, accuracy, fast_completion, today } => {
            let first_lesson = state.xp == 0;
            let accuracy_bonus = accuracy
                .map(|a| (a.clamp(0.0, 1.0) * ACCURACY_BONUS_XP).round() as u64)
                .unwrap_or(0);
            let speed_bonus = if *fast_completion { FAST_COMPLETION_XP } else { 0 };
            let points = LESSON_BASE_XP + accuracy_bonus + speed_bonus;

            add_xp(&mut state, points, &mut events);
            record_activity(&mut state, *today, &mut events);
            if first_lesson {
                unlock_badge(&mut state, "first_step", &mut events);
            }
            if let Some(badge) = lesson_badge(module_id, lesson_id) {
                unlock_badge(&mut state, badge, &mut events);
            }
            events.push(Event::LessonCompleted { lesson: format!("{}-{}", module_id.trim(), lesson_id.trim()), points });
        }
    }
    Reduced { state, events }
}

fn add_xp(state: &mut GamificationState, amount: u64, events: &mut Vec<Event>) {
    state.xp = state.xp.saturating_add(amount);
    events.push(Event::XpAwarded { amount, total: state.xp });
    let next = level_for_xp(state.xp).level;
    if next != state.level {
        events.push(Event::LevelUp { from: state.level, to: next });
        state.level = next;
    }
}

fn unlock_badge(state: &mut GamificationState, id: &str, events: &mut Vec<Event>) {
    if find_badge(id).is_none() {
        events.push(Event::UnknownBadge { badge: id.to_string() });
    } else if state.has_badge(id) {
        events.push(Event::BadgeAlreadyUnlocked { badge: id.to_string() });
    } else {
        state.badges.push(id.to_string());
        events.push(Event::BadgeUnlocked { badge: id.to_string() });
    }
}

fn record_activity(state: &mut GamificationState, today: NaiveDate, events: &mut Vec<Event>) {
    let days = match state.last_activity {
        Some(last) if last == today => state.streak_days.max(1),
        Some(last) if last.succ_opt() == Some(today) => state.streak_days + 1,
        _ => 1,
    };
    state.last_activity = Some(today);
    if days != state.streak_days {
        state.streak_days = days;
        events.push(Event::StreakUpdated { days });
    }
    if days >= 30 && !state.has_badge("marathoner") {
        unlock_badge(state, "marathoner", events);
    }
    if days >= 7 && !state.has_badge("diligent") {
        unlock_badge(state, "diligent", events);
    }
}
