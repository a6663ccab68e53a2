//! Small utility helpers used across modules.

/// Escape text for HTML element content and double-quoted attribute values.
pub fn escape_html(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
    .replace('\'', "&#39;")
}

/// Log-safe truncation for large strings (user code, request bodies).
/// Cuts on a char boundary at or below `max` bytes.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Accepts a plain CSS length: number + unit (px, em, rem, vh, vw, %), or "auto".
pub fn is_css_length(s: &str) -> bool {
  let s = s.trim();
  if s == "auto" {
    return true;
  }
  let unit_start = s.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(s.len());
  let (num, unit) = s.split_at(unit_start);
  if num.is_empty() || num.parse::<f64>().is_err() {
    return false;
  }
  matches!(unit, "px" | "em" | "rem" | "vh" | "vw" | "%")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escapes_markup_and_quotes() {
    assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "éééé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with('é'));
    assert!(t.ends_with("(8 bytes total)"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }

  #[test]
  fn css_lengths() {
    for ok in ["300px", "50vh", "100%", "2.5rem", "auto"] {
      assert!(is_css_length(ok), "{ok}");
    }
    for bad in ["", "px", "300", "300px;color:red", "1e3px", "calc(1px)"] {
      assert!(!is_css_length(bad), "{bad}");
    }
  }
}
