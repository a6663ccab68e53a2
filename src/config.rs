//! Loading application configuration (catalog extensions, preview settings, session bounds) from TOML.
//!
//! See `AppConfig`, `CatalogCfg` and `PreviewCfg` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Lesson;

pub const CONFIG_PATH_ENV: &str = "NEXTMIMO_CONFIG_PATH";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub catalog: CatalogCfg,
  #[serde(default)]
  pub preview: PreviewCfg,
  #[serde(default)]
  pub sessions: SessionCfg,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CatalogCfg {
  /// Serve a placeholder lesson instead of 404 when the module is known.
  #[serde(default)]
  pub synthesize_missing_lessons: bool,
  /// Extra lessons; same id as a built-in lesson replaces it.
  #[serde(default)]
  pub lessons: Vec<Lesson>,
  #[serde(default)]
  pub modules: Vec<ModuleCfg>,
}

/// Module metadata entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ModuleCfg {
  pub id: u32,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub difficulty: String,
}

/// Sandbox document settings. CDN urls are loaded unconditionally by `react` previews.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PreviewCfg {
  pub default_height: String,
  pub max_code_bytes: usize,
  pub react_url: String,
  pub react_dom_url: String,
  pub babel_url: String,
}

impl Default for PreviewCfg {
  fn default() -> Self {
    Self {
      default_height: "300px".into(),
      max_code_bytes: 64 * 1024,
      react_url: "https://unpkg.com/react@17/umd/react.development.js".into(),
      react_dom_url: "https://unpkg.com/react-dom@17/umd/react-dom.development.js".into(),
      babel_url: "https://unpkg.com/@babel/standalone/babel.min.js".into(),
    }
  }
}

/// In-memory session store bounds. Idle sessions are swept whenever a new one is
/// created; at `max_sessions` the least recently used session is evicted.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
  pub max_sessions: usize,
  pub idle_ttl_secs: u64,
}

impl Default for SessionCfg {
  fn default() -> Self {
    Self { max_sessions: 10_000, idle_ttl_secs: 24 * 60 * 60 }
  }
}

/// Parse a TOML document into `AppConfig`.
pub fn parse_config(s: &str) -> Result<AppConfig, toml::de::Error> {
  toml::from_str::<AppConfig>(s)
}

/// Attempt to load `AppConfig` from NEXTMIMO_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var(CONFIG_PATH_ENV).ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "nextmimo_backend", %path, extra_lessons = cfg.catalog.lessons.len(), "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "nextmimo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "nextmimo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
