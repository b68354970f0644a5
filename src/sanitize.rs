//! Text sanitization helpers for safe HTML redisplay.
//!
//! Escaping happens exactly once, at validation time: stored values are
//! already escaped and are emitted into markup verbatim. Raw user input is
//! escaped here only when a failed submission has to be re-displayed.
//! Applying [`html_escape`] to already-escaped text re-escapes the
//! ampersands, which is why nothing downstream is allowed to escape twice.

use std::sync::LazyLock;

use regex::Regex;

use crate::validation::TaskForm;

/// Marker inserted in front of every line break in a sanitized description.
///
/// The marker precedes the preserved newline, so stripping it restores the
/// original line structure for textarea pre-fill.
pub const BREAK_MARKER: &str = "<br />";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN: invalid regex pattern"));

/// Escape the five HTML-significant characters (`&`, `<`, `>`, `"`, `'`).
///
/// The ampersand is replaced first so entities produced by the later
/// replacements are not escaped again within the same pass.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Collapse every run of whitespace to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").into_owned()
}

/// Insert a [`BREAK_MARKER`] before each line break, keeping the newline
/// itself so the plain-text line structure survives a round trip through
/// [`strip_break_markers`].
pub fn newlines_to_breaks(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                out.push_str(BREAK_MARKER);
                out.push('\r');
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    out.push('\n');
                }
            }
            '\n' => {
                out.push_str(BREAK_MARKER);
                out.push('\n');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Remove every [`BREAK_MARKER`], leaving the preserved newlines in place.
pub fn strip_break_markers(s: &str) -> String {
    s.replace(BREAK_MARKER, "")
}

/// Trim and HTML-escape every field of a raw submission.
///
/// Used to re-populate the form after a failed submission: the user's
/// original text round-trips to the browser unchanged apart from escaping.
pub fn sanitize_form(form: &TaskForm) -> TaskForm {
    TaskForm {
        title: html_escape(form.title.trim()),
        description: html_escape(form.description.trim()),
        status: html_escape(form.status.trim()),
        due_date: html_escape(form.due_date.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escape_covers_all_significant_characters() {
        assert_eq!(
            html_escape(r#"<b>"tom" & 'jerry'</b>"#),
            "&lt;b&gt;&quot;tom&quot; &amp; &#039;jerry&#039;&lt;/b&gt;"
        );
    }

    #[test]
    fn html_escape_is_not_idempotent_on_raw_text() {
        // Escaping twice re-escapes the ampersand of the entity. This is the
        // documented reason values are escaped exactly once at validation.
        assert_eq!(html_escape("&amp;"), "&amp;amp;");
    }

    #[test]
    fn collapse_whitespace_squeezes_runs() {
        assert_eq!(collapse_whitespace("a  b\t\tc \n d"), "a b c d");
        assert_eq!(collapse_whitespace("no runs here"), "no runs here");
    }

    #[test]
    fn newlines_to_breaks_handles_unix_and_windows_breaks() {
        assert_eq!(newlines_to_breaks("a\nb"), "a<br />\nb");
        assert_eq!(newlines_to_breaks("a\r\nb"), "a<br />\r\nb");
        assert_eq!(newlines_to_breaks("no breaks"), "no breaks");
    }

    #[test]
    fn break_markers_round_trip() {
        let original = "Buy milk\nCall mom";
        let marked = newlines_to_breaks(original);
        assert_eq!(marked, "Buy milk<br />\nCall mom");
        assert_eq!(strip_break_markers(&marked), original);
    }

    #[test]
    fn sanitize_form_trims_and_escapes_every_field() {
        let raw = TaskForm {
            title: "  <Hello>  ".to_string(),
            description: " a & b ".to_string(),
            status: "pending".to_string(),
            due_date: " 2026-01-01 ".to_string(),
        };
        let clean = sanitize_form(&raw);
        assert_eq!(clean.title, "&lt;Hello&gt;");
        assert_eq!(clean.description, "a &amp; b");
        assert_eq!(clean.status, "pending");
        assert_eq!(clean.due_date, "2026-01-01");
    }
}
