//! Auto-render heuristic for `react` snippets that never call `ReactDOM.render`.
//!
//! Only `function Capitalized(...)` declarations are recognised. Arrow-function
//! components and class components are invisible to it; callers surface that
//! through [`RenderPlan`] warnings instead of guessing further.

use std::sync::OnceLock;

use regex::Regex;

static FUNCTION_COMPONENT: OnceLock<Option<Regex>> = OnceLock::new();

fn function_component_regex() -> Option<&'static Regex> {
    FUNCTION_COMPONENT
        .get_or_init(|| Regex::new(r"\bfunction\s+([A-Z][A-Za-z0-9_]*)\s*\(").ok())
        .as_ref()
}

/// Names of `function Capitalized(` declarations, in source order.
pub fn declared_components(code: &str) -> Vec<String> {
    let Some(re) = function_component_regex() else {
        return Vec::new();
    };
    re.captures_iter(code)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderPlan {
    /// The snippet renders itself.
    Explicit,
    /// Render `component`; `candidates` counts every declaration seen.
    Auto { component: String, candidates: usize },
    NoComponent,
}

pub fn plan_render(code: &str) -> RenderPlan {
    if code.contains("ReactDOM.render") {
        return RenderPlan::Explicit;
    }
    let components = declared_components(code);
    let candidates = components.len();
    match components.into_iter().last() {
        Some(component) => RenderPlan::Auto { component, candidates },
        None => RenderPlan::NoComponent,
    }
}

/// Statement appended after the user code for an `Auto` plan.
pub fn render_call(component: &str) -> String {
    format!("ReactDOM.render(React.createElement({}), document.getElementById('root'));", component)
}
