//! Form validation pipeline for task submissions.
//!
//! Each field validator is a pure function from raw input to a
//! [`FieldValidation`] carrying the verdict, the error messages, and the
//! sanitized value that downstream storage and redisplay use.
//! [`validate_task_form`] runs all four validators unconditionally and
//! aggregates the results; an error in one field never suppresses the
//! checks on another.
//!
//! The harmful-content scan on descriptions is a fixed denylist and
//! deliberately rejects on match instead of stripping, so a hit is visible
//! to the user and in the logs. It is a best-effort filter, not a security
//! boundary; escaping on output is what actually neutralizes markup.

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use serde::Deserialize;

use crate::sanitize::{collapse_whitespace, html_escape, newlines_to_breaks};
use crate::store::{TaskData, TaskStatus};

/// Minimum title length in characters.
pub const TITLE_MIN_LEN: usize = 3;
/// Maximum title length in characters.
pub const TITLE_MAX_LEN: usize = 100;
/// Maximum description length in characters.
pub const DESCRIPTION_MAX_LEN: usize = 500;

// Letters, digits, whitespace, and the punctuation set - . , ! ? '
static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9\s\-.,!?']+$").expect("TITLE_PATTERN: invalid regex pattern")
});

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("DATE_PATTERN: invalid regex pattern"));

// Scanned in order against the raw (pre-escape) description; the scan stops
// at the first match and reports one aggregate error.
static HARMFUL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)<script.*?>.*?</script>",
        r"(?i)onload\s*=",
        r"(?i)onerror\s*=",
        r"(?i)javascript:",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("HARMFUL_PATTERNS: invalid regex pattern"))
    .collect()
});

/// Raw task form fields as submitted by the browser.
///
/// The legal field set is closed, so this is a fixed record rather than an
/// open map; missing fields deserialize to empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub due_date: String,
}

/// Outcome of validating a single field.
#[derive(Debug, Clone)]
pub struct FieldValidation {
    /// Whether the field passed every check.
    pub is_valid: bool,
    /// User-facing error messages, in check order.
    pub errors: Vec<String>,
    /// Sanitized value for storage and pre-fill; `None` for an empty
    /// optional field (only the due date can be empty).
    pub value: Option<String>,
    /// The trimmed original input, untouched apart from trimming.
    pub original: String,
    /// Non-blocking advisory (currently only the past-due-date warning).
    pub warning: Option<String>,
}

/// Validate the task title.
///
/// An empty title short-circuits with a single "required" error; otherwise
/// length bounds and the character-set pattern are checked independently and
/// may both be reported. The sanitized value is HTML-escaped with whitespace
/// runs collapsed to one space.
pub fn validate_title(raw: &str) -> FieldValidation {
    let title = raw.trim();

    if title.is_empty() {
        return FieldValidation {
            is_valid: false,
            errors: vec!["Title is required".to_string()],
            value: Some(String::new()),
            original: String::new(),
            warning: None,
        };
    }

    let mut errors = Vec::new();
    let length = title.chars().count();
    if length < TITLE_MIN_LEN {
        errors.push(format!("Title must be at least {} characters", TITLE_MIN_LEN));
    }
    if length > TITLE_MAX_LEN {
        errors.push(format!("Title must not exceed {} characters", TITLE_MAX_LEN));
    }
    if !TITLE_PATTERN.is_match(title) {
        errors.push(
            "Title contains invalid characters. Only letters, numbers, spaces, and basic \
             punctuation are allowed"
                .to_string(),
        );
    }

    let sanitized = collapse_whitespace(&html_escape(title));
    FieldValidation {
        is_valid: errors.is_empty(),
        errors,
        value: Some(sanitized),
        original: title.to_string(),
        warning: None,
    }
}

/// Validate the task description.
///
/// The harmful-content scan runs against the raw text before any escaping.
/// The sanitized value is HTML-escaped with line breaks converted to break
/// markers; it is the canonical form seen by storage and edit pre-fill.
pub fn validate_description(raw: &str) -> FieldValidation {
    let description = raw.trim();
    let mut errors = Vec::new();

    if description.chars().count() > DESCRIPTION_MAX_LEN {
        errors.push(format!(
            "Description must not exceed {} characters",
            DESCRIPTION_MAX_LEN
        ));
    }

    if HARMFUL_PATTERNS.iter().any(|p| p.is_match(description)) {
        errors.push("Description contains potentially harmful content".to_string());
    }

    let sanitized = newlines_to_breaks(&html_escape(description));
    FieldValidation {
        is_valid: errors.is_empty(),
        errors,
        value: Some(sanitized),
        original: description.to_string(),
        warning: None,
    }
}

/// Validate the task status against the three allowed enum literals.
pub fn validate_status(raw: &str) -> FieldValidation {
    match raw.parse::<TaskStatus>() {
        Ok(status) => FieldValidation {
            is_valid: true,
            errors: Vec::new(),
            value: Some(status.as_str().to_string()),
            original: raw.to_string(),
            warning: None,
        },
        Err(_) => FieldValidation {
            is_valid: false,
            errors: vec!["Invalid status selected".to_string()],
            value: Some(raw.to_string()),
            original: raw.to_string(),
            warning: None,
        },
    }
}

/// Validate the optional due date against the current date.
pub fn validate_due_date(raw: &str) -> FieldValidation {
    validate_due_date_on(raw, Local::now().date_naive())
}

/// Validate the due date against an explicit `today`.
///
/// Empty input is valid and yields no value. Non-empty input must match the
/// `YYYY-MM-DD` shape and be a real calendar date. A date in the past is
/// accepted with a warning; overdue tasks are legal.
pub fn validate_due_date_on(raw: &str, today: NaiveDate) -> FieldValidation {
    let due = raw.trim();

    if due.is_empty() {
        return FieldValidation {
            is_valid: true,
            errors: Vec::new(),
            value: None,
            original: String::new(),
            warning: None,
        };
    }

    let mut errors = Vec::new();
    let mut warning = None;
    if !DATE_PATTERN.is_match(due) {
        errors.push("Invalid date format. Use YYYY-MM-DD".to_string());
    } else {
        match NaiveDate::parse_from_str(due, "%Y-%m-%d") {
            Ok(date) => {
                if date < today {
                    warning = Some("Due date is in the past".to_string());
                }
            }
            Err(_) => errors.push("Invalid date".to_string()),
        }
    }

    FieldValidation {
        is_valid: errors.is_empty(),
        errors,
        value: Some(due.to_string()),
        original: due.to_string(),
        warning,
    }
}

/// Per-field errors in the fixed display order, only for fields that failed.
pub type FieldErrors<'a> = Vec<(&'static str, &'a [String])>;

/// Aggregated validation results for a whole task form.
#[derive(Debug, Clone)]
pub struct FormValidation {
    pub title: FieldValidation,
    pub description: FieldValidation,
    pub status: FieldValidation,
    pub due_date: FieldValidation,
}

impl FormValidation {
    /// The four field results paired with their field names, in display order.
    pub fn fields(&self) -> [(&'static str, &FieldValidation); 4] {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("status", &self.status),
            ("due_date", &self.due_date),
        ]
    }

    /// True iff every field passed validation.
    pub fn is_valid(&self) -> bool {
        self.fields().iter().all(|(_, f)| f.is_valid)
    }

    /// Fields that failed, with their messages, in deterministic order.
    pub fn errors(&self) -> FieldErrors<'_> {
        self.fields()
            .into_iter()
            .filter(|(_, f)| !f.is_valid)
            .map(|(name, f)| (name, f.errors.as_slice()))
            .collect()
    }

    /// Convert a fully-valid result into the sanitized field set for storage.
    ///
    /// Returns `None` when any field failed.
    pub fn task_data(&self) -> Option<TaskData> {
        if !self.is_valid() {
            return None;
        }
        let status = self.status.value.as_deref()?.parse::<TaskStatus>().ok()?;
        let due_date = match self.due_date.value.as_deref() {
            Some(s) => Some(NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?),
            None => None,
        };
        Some(TaskData {
            title: self.title.value.clone()?,
            description: self.description.value.clone().unwrap_or_default(),
            status,
            due_date,
        })
    }
}

/// Run every field validator over the submitted form.
///
/// All four validators run unconditionally; a failure in one field never
/// short-circuits the others. Pure: no I/O, no shared state.
pub fn validate_task_form(form: &TaskForm) -> FormValidation {
    FormValidation {
        title: validate_title(&form.title),
        description: validate_description(&form.description),
        status: validate_status(&form.status),
        due_date: validate_due_date(&form.due_date),
    }
}
