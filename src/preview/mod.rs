//! Code preview sandbox: turns (code, language) into a self-contained HTML
//! document for an `<iframe sandbox="allow-scripts">`, or into an inline error
//! panel when the document cannot be built.
//!
//! Two failure domains stay separate:
//! - building the document here (`PreviewError`, shown as the error panel);
//! - running user code inside the iframe (caught by the generated script's own
//!   try/catch and shown as a `.error` box inside the document).

pub mod document;
pub mod react;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::PreviewCfg;
use crate::util::{escape_html, is_css_length};

use document::{PreviewDocument, ScriptKind, BASE_STYLES};
use react::RenderPlan;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewLanguage {
    Html,
    Css,
    Javascript,
    Jsx,
    React,
}

impl FromStr for PreviewLanguage {
    type Err = PreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            "javascript" | "js" => Ok(Self::Javascript),
            "jsx" => Ok(Self::Jsx),
            "react" => Ok(Self::React),
            _ => Err(PreviewError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for PreviewLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Javascript => "javascript",
            Self::Jsx => "jsx",
            Self::React => "react",
        };
        f.write_str(s)
    }
}

/// Failures while building the document (never while running it).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("unsupported language '{0}' (expected html, css, javascript, jsx or react)")]
    UnsupportedLanguage(String),
    #[error("code is {len} bytes, preview limit is {max} bytes")]
    CodeTooLarge { len: usize, max: usize },
    #[error("invalid preview height '{0}'")]
    InvalidHeight(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PreviewWarning {
    /// Several `function Capitalized` declarations; the last one was rendered.
    MultipleComponents { rendered: String, candidates: usize },
    /// No `ReactDOM.render` and no detectable component: the root stays empty.
    NoComponentFound,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Preview {
    pub language: PreviewLanguage,
    pub document: PreviewDocument,
    pub warnings: Vec<PreviewWarning>,
}

const OUTPUT_STYLES: &str = "#output{font-family:monospace;border:1px solid #e2e8f0;border-radius:4px;padding:12px;margin-top:16px;min-height:100px;background-color:#f8f9fa;}";

const CSS_DEMO_MARKUP: &str = r#"<div class="container">
  <h1>Example heading</h1>
  <p>This paragraph is here to try your CSS.</p>
  <div class="box">Demo box</div>
  <button>Example button</button>
</div>"#;

const CONSOLE_CAPTURE: &str = r#"const output = document.getElementById('output');
const originalConsoleLog = console.log;
console.log = function (...args) {
  originalConsoleLog.apply(console, args);
  const line = document.createElement('div');
  line.textContent = args
    .map((arg) => (typeof arg === 'object' ? JSON.stringify(arg, null, 2) : String(arg)))
    .join(' ');
  output.appendChild(line);
};"#;

const CATCH_TO_ERROR_BOX: &str = r#"} catch (error) {
  const errorElement = document.createElement('div');
  errorElement.className = 'error';
  errorElement.textContent = 'Error: ' + error.message;
  document.body.appendChild(errorElement);
}"#;

fn guarded(body: &str) -> String {
    format!("try {{\n{}\n{}", body, CATCH_TO_ERROR_BOX)
}

/// Build the sandbox document. Empty (whitespace-only) code yields `Ok(None)`.
#[instrument(level = "debug", skip(code, cfg), fields(code_len = code.len(), %language))]
pub fn build_preview(code: &str, language: PreviewLanguage, cfg: &PreviewCfg) -> Result<Option<Preview>, PreviewError> {
    if code.trim().is_empty() {
        return Ok(None);
    }
    if code.len() > cfg.max_code_bytes {
        return Err(PreviewError::CodeTooLarge { len: code.len(), max: cfg.max_code_bytes });
    }

    let mut warnings = Vec::new();
    let builder = PreviewDocument::builder().style(BASE_STYLES);
    let document = match language {
        PreviewLanguage::Html | PreviewLanguage::Jsx => builder.user_markup(code).build(),
        PreviewLanguage::Css => builder.user_style(code).markup(CSS_DEMO_MARKUP).build(),
        PreviewLanguage::Javascript => builder
            .style(OUTPUT_STYLES)
            .markup("<h3>JavaScript output:</h3>\n<div id=\"output\"></div>")
            .script(ScriptKind::Classic, format!("{}\n{}", CONSOLE_CAPTURE, guarded(code)))
            .build(),
        PreviewLanguage::React => {
            let body = match react::plan_render(code) {
                RenderPlan::Explicit => code.to_string(),
                RenderPlan::Auto { component, candidates } => {
                    if candidates > 1 {
                        warnings.push(PreviewWarning::MultipleComponents { rendered: component.clone(), candidates });
                    }
                    format!("{}\n{}", code, react::render_call(&component))
                }
                RenderPlan::NoComponent => {
                    warnings.push(PreviewWarning::NoComponentFound);
                    code.to_string()
                }
            };
            builder
                .external_script(cfg.react_url.as_str())
                .external_script(cfg.react_dom_url.as_str())
                .external_script(cfg.babel_url.as_str())
                .markup("<div id=\"root\"></div>")
                .script(ScriptKind::Babel, guarded(&body))
                .build()
        }
    };

    if !warnings.is_empty() {
        warn!(target: "preview", ?warnings, "React auto-render is guessing");
    }
    debug!(target: "preview", "Preview document built");
    Ok(Some(Preview { language, document, warnings }))
}

/// Result of one render pass, ready to be embedded in a page.
#[derive(Clone, Debug, PartialEq)]
pub enum PreviewOutcome {
    Empty { height: String },
    Ready { preview: Preview, height: String },
    Failed { error: PreviewError, height: String },
}

/// Parse the language tag, validate height and build. Every failure ends up in
/// `PreviewOutcome::Failed`; nothing propagates. Empty code is `Empty` whatever
/// the tag or height say.
pub fn render_preview(code: &str, language: &str, height: Option<&str>, cfg: &PreviewCfg) -> PreviewOutcome {
    let default_height = cfg.default_height.clone();
    if code.trim().is_empty() {
        let height = height.map(str::trim).filter(|h| is_css_length(h)).map_or(default_height, str::to_string);
        return PreviewOutcome::Empty { height };
    }
    let height = match height.map(str::trim).filter(|h| !h.is_empty()) {
        Some(h) if is_css_length(h) => h.to_string(),
        Some(h) => {
            return PreviewOutcome::Failed { error: PreviewError::InvalidHeight(h.to_string()), height: default_height }
        }
        None => default_height,
    };

    let built = language.parse::<PreviewLanguage>().and_then(|lang| build_preview(code, lang, cfg));
    match built {
        Ok(Some(preview)) => PreviewOutcome::Ready { preview, height },
        Ok(None) => PreviewOutcome::Empty { height },
        Err(error) => {
            debug!(target: "preview", %error, "Preview template failed");
            PreviewOutcome::Failed { error, height }
        }
    }
}

impl PreviewOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            PreviewOutcome::Empty { .. } => "empty",
            PreviewOutcome::Ready { .. } => "ready",
            PreviewOutcome::Failed { .. } => "error",
        }
    }

    pub fn document_html(&self) -> Option<String> {
        match self {
            PreviewOutcome::Ready { preview, .. } => Some(preview.document.render()),
            _ => None,
        }
    }

    pub fn warnings(&self) -> &[PreviewWarning] {
        match self {
            PreviewOutcome::Ready { preview, .. } => &preview.warnings,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&PreviewError> {
        match self {
            PreviewOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Iframe (empty or with `srcdoc`) or the red error panel.
    pub fn embed(&self) -> String {
        match self {
            PreviewOutcome::Empty { height } => frame(height, ""),
            PreviewOutcome::Ready { preview, height } => {
                frame(height, &format!(" srcdoc=\"{}\"", escape_html(&preview.document.render())))
            }
            PreviewOutcome::Failed { error, height } => error_panel(height, &error.to_string()),
        }
    }
}

fn frame(height: &str, srcdoc_attr: &str) -> String {
    format!(
        "<div class=\"code-preview-sandbox\" style=\"height: {}\"><iframe title=\"Code Preview\" class=\"w-full h-full\" sandbox=\"allow-scripts\"{}></iframe></div>",
        escape_html(height),
        srcdoc_attr
    )
}

pub fn error_panel(height: &str, message: &str) -> String {
    format!(
        "<div class=\"code-preview-sandbox\" style=\"height: {}\"><div class=\"preview-error\" style=\"color: #dc2626; border: 1px solid #dc2626; border-radius: 4px; padding: 16px; height: 100%; overflow: auto;\"><p><strong>Preview error:</strong></p><p>{}</p></div></div>",
        escape_html(height),
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PreviewCfg {
        PreviewCfg::default()
    }

    fn doc(code: &str, lang: PreviewLanguage) -> String {
        build_preview(code, lang, &cfg()).unwrap().unwrap().document.render()
    }

    #[test]
    fn empty_code_generates_nothing_for_every_language() {
        for lang in ["html", "css", "javascript", "jsx", "react"] {
            let outcome = render_preview("", lang, None, &cfg());
            assert_eq!(outcome.status(), "empty", "{lang}");
            assert!(outcome.document_html().is_none());
            assert!(outcome.error().is_none());
            assert!(!outcome.embed().contains("srcdoc"));
            assert!(!outcome.embed().contains("preview-error"));
        }
    }

    #[test]
    fn empty_code_ignores_bad_height_and_tag() {
        for (code, lang, height) in [("", "html", "tall"), ("   ", "CSS ", "abc"), ("\n", "cobol", "1px;x")] {
            let outcome = render_preview(code, lang, Some(height), &cfg());
            assert_eq!(outcome.status(), "empty", "{lang}");
            assert!(outcome.error().is_none());
            assert!(!outcome.embed().contains("preview-error"));
            assert!(outcome.embed().contains("style=\"height: 300px\""));
        }
    }

    #[test]
    fn html_and_jsx_are_embedded_verbatim() {
        let code = "<section><h1>Hello</h1></section>";
        assert!(doc(code, PreviewLanguage::Html).contains(code));
        assert!(doc(code, PreviewLanguage::Jsx).contains(code));
    }

    #[test]
    fn css_goes_in_style_block_above_demo_markup() {
        let html = doc(".box { color: red; }", PreviewLanguage::Css);
        let style = html.find(".box { color: red; }").unwrap();
        let demo = html.find("<div class=\"box\">").unwrap();
        assert!(style < demo);
        assert!(html.contains("<button>Example button</button>"));
    }

    #[test]
    fn javascript_captures_console_into_output() {
        let html = doc("console.log(\"x\");", PreviewLanguage::Javascript);
        let output_div = html.find("<div id=\"output\"></div>").unwrap();
        let patch = html.find("console.log = function").unwrap();
        let user = html.find("console.log(\"x\");").unwrap();
        let catch = html.find("} catch (error) {").unwrap();
        assert!(output_div < patch && patch < user && user < catch);
        assert!(html.contains("output.appendChild(line);"));
        assert!(html.contains("errorElement.className = 'error';"));
        assert!(html.contains("document.body.appendChild(errorElement);"));
    }

    #[test]
    fn react_single_component_is_auto_rendered() {
        let preview = build_preview("function Foo() { return <p>hi</p>; }", PreviewLanguage::React, &cfg())
            .unwrap()
            .unwrap();
        assert!(preview.warnings.is_empty());
        let html = preview.document.render();
        assert!(html.contains("ReactDOM.render(React.createElement(Foo), document.getElementById('root'));"));
        assert!(html.contains("<script type=\"text/babel\">"));
        assert!(html.contains("react@17/umd/react.development.js"));
        assert!(html.contains("react-dom@17/umd/react-dom.development.js"));
        assert!(html.contains("@babel/standalone/babel.min.js"));
        assert!(html.contains("<div id=\"root\"></div>"));
    }

    #[test]
    fn react_explicit_render_is_left_alone() {
        let code = "function App() { return null; }\nReactDOM.render(<App />, document.getElementById('root'));";
        let html = doc(code, PreviewLanguage::React);
        assert!(!html.contains("React.createElement(App)"));
    }

    #[test]
    fn react_guesses_are_reported() {
        let multi = build_preview("function A() {}\nfunction B() {}", PreviewLanguage::React, &cfg())
            .unwrap()
            .unwrap();
        assert_eq!(multi.warnings, vec![PreviewWarning::MultipleComponents { rendered: "B".into(), candidates: 2 }]);

        let none = build_preview("const App = () => null;", PreviewLanguage::React, &cfg()).unwrap().unwrap();
        assert_eq!(none.warnings, vec![PreviewWarning::NoComponentFound]);
    }

    #[test]
    fn unknown_language_renders_error_panel() {
        let outcome = render_preview("x", "cobol", None, &cfg());
        assert_eq!(outcome.status(), "error");
        let embed = outcome.embed();
        assert!(embed.contains("preview-error"));
        assert!(embed.contains("unsupported language &#39;cobol&#39;"));
        assert!(!embed.contains("<iframe"));
    }

    #[test]
    fn oversized_code_is_rejected() {
        let small = PreviewCfg { max_code_bytes: 4, ..PreviewCfg::default() };
        assert_eq!(
            build_preview("12345", PreviewLanguage::Html, &small),
            Err(PreviewError::CodeTooLarge { len: 5, max: 4 })
        );
    }

    #[test]
    fn height_is_validated_and_defaulted() {
        let bad = render_preview("<p>x</p>", "html", Some("1px;position:fixed"), &cfg());
        assert!(matches!(bad.error(), Some(PreviewError::InvalidHeight(_))));

        let ok = render_preview("<p>x</p>", "html", Some("50vh"), &cfg());
        assert!(ok.embed().contains("style=\"height: 50vh\""));
        let default = render_preview("<p>x</p>", "HTML", None, &cfg());
        assert!(default.embed().contains("style=\"height: 300px\""));
    }

    #[test]
    fn embed_escapes_document_into_srcdoc() {
        let outcome = render_preview("<p class=\"a\">&</p>", "html", None, &cfg());
        let embed = outcome.embed();
        assert!(embed.contains("sandbox=\"allow-scripts\""));
        assert!(!embed.contains("allow-same-origin"));
        assert!(embed.contains("&lt;p class=&quot;a&quot;&gt;&amp;&lt;/p&gt;"));
    }
}
