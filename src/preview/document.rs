//! Typed sandbox document: head and body assembled from fragments, rendered once.
//!
//! Trusted fragments (our own markup/styles) are emitted as-is. User text is
//! emitted verbatim as markup (html/jsx), or inside `<style>`/`<script>` blocks
//! with the matching closing-tag sequence neutralised so it cannot end the block.

use std::fmt::Write;

use crate::util::escape_html;

/// Styles shared by every generated document.
pub const BASE_STYLES: &str = "body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Oxygen,Ubuntu,Cantarell,'Open Sans','Helvetica Neue',sans-serif;margin:0;padding:16px;color:#333;}\
.error{color:red;font-family:monospace;padding:10px;background-color:#ffeeee;border:1px solid red;border-radius:4px;margin-top:10px;}";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    Classic,
    /// Transpiled in the browser by Babel standalone.
    Babel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HeadFragment {
    Style(String),
    UserStyle(String),
    ExternalScript(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum BodyFragment {
    Markup(String),
    UserMarkup(String),
    Script { kind: ScriptKind, source: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreviewDocument {
    head: Vec<HeadFragment>,
    body: Vec<BodyFragment>,
}

impl PreviewDocument {
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    pub fn render(&self) -> String {
        let mut html = String::with_capacity(1024);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
        for fragment in &self.head {
            // Writing into a String cannot fail.
            let _ = match fragment {
                HeadFragment::Style(css) => writeln!(html, "<style>{}</style>", css),
                HeadFragment::UserStyle(css) => writeln!(html, "<style>\n{}\n</style>", neutralise_closing(css, Tag::Style)),
                HeadFragment::ExternalScript(src) => writeln!(html, "<script src=\"{}\"></script>", escape_html(src)),
            };
        }
        html.push_str("</head>\n<body>\n");
        for fragment in &self.body {
            let _ = match fragment {
                BodyFragment::Markup(markup) | BodyFragment::UserMarkup(markup) => writeln!(html, "{}", markup),
                BodyFragment::Script { kind, source } => {
                    let open = match kind {
                        ScriptKind::Classic => "<script>",
                        ScriptKind::Babel => "<script type=\"text/babel\">",
                    };
                    writeln!(html, "{}\n{}\n</script>", open, neutralise_closing(source, Tag::Script))
                }
            };
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

#[derive(Default)]
pub struct DocumentBuilder {
    doc: PreviewDocument,
}

impl DocumentBuilder {
    pub fn style(mut self, css: impl Into<String>) -> Self {
        self.doc.head.push(HeadFragment::Style(css.into()));
        self
    }

    pub fn user_style(mut self, css: impl Into<String>) -> Self {
        self.doc.head.push(HeadFragment::UserStyle(css.into()));
        self
    }

    pub fn external_script(mut self, src: impl Into<String>) -> Self {
        self.doc.head.push(HeadFragment::ExternalScript(src.into()));
        self
    }

    pub fn markup(mut self, html: impl Into<String>) -> Self {
        self.doc.body.push(BodyFragment::Markup(html.into()));
        self
    }

    pub fn user_markup(mut self, html: impl Into<String>) -> Self {
        self.doc.body.push(BodyFragment::UserMarkup(html.into()));
        self
    }

    pub fn script(mut self, kind: ScriptKind, source: impl Into<String>) -> Self {
        self.doc.body.push(BodyFragment::Script { kind, source: source.into() });
        self
    }

    pub fn build(self) -> PreviewDocument {
        self.doc
    }
}

#[derive(Clone, Copy)]
enum Tag {
    Script,
    Style,
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Tag::Script => "script",
            Tag::Style => "style",
        }
    }
}

/// `</script` -> `<\/script` (any case). Same for style.
fn neutralise_closing(text: &str, tag: Tag) -> String {
    let name = tag.name();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("</") {
        let after = &rest[pos + 2..];
        let closes = after
            .get(..name.len())
            .map(|candidate| candidate.eq_ignore_ascii_case(name))
            .unwrap_or(false);
        out.push_str(&rest[..pos]);
        out.push_str(if closes { "<\\/" } else { "</" });
        rest = after;
    }
    out.push_str(rest);
    out
}
