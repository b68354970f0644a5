//! HTML production for the server-rendered pages.
//!
//! Values arriving here from the store or the validation pipeline are
//! already escaped; this module emits them verbatim and never re-escapes
//! stored text. Only genuinely untrusted strings (the flash message taken
//! from the query) are escaped at this layer.

use chrono::{DateTime, Local, NaiveDate};

use crate::sanitize::{html_escape, strip_break_markers};
use crate::store::{Task, TaskStats, TaskStatus};
use crate::validation::{TaskForm, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN, TITLE_MIN_LEN};

/// Bootstrap `needs-validation` affordance plus live checks mirroring the
/// server-side rules; submission is never blocked on the due date, matching
/// the server policy of warning (not rejecting) on past dates.
const FORM_SCRIPT: &str = r#"<script>
(function () {
  'use strict';
  const forms = document.querySelectorAll('.needs-validation');
  Array.from(forms).forEach(form => {
    form.addEventListener('submit', event => {
      if (!form.checkValidity()) {
        event.preventDefault();
        event.stopPropagation();
      }
      form.classList.add('was-validated');
    }, false);
  });

  const titleField = document.getElementById('title');
  if (titleField) {
    titleField.addEventListener('input', function () {
      const pattern = /^[a-zA-Z0-9\s\-.,!?']+$/;
      if (!pattern.test(this.value) && this.value.length > 0) {
        this.setCustomValidity('Only letters, numbers, spaces, and basic punctuation are allowed.');
      } else {
        this.setCustomValidity('');
      }
    });
  }
})();
</script>"#;

const PAGE_STYLE: &str = r#"<style>
.task-card { transition: transform 0.2s; }
.task-card:hover { transform: translateY(-5px); box-shadow: 0 4px 15px rgba(0,0,0,0.1); }
.status-badge { font-size: 0.75em; }
.completed { opacity: 0.8; background-color: #f8f9fa; }
</style>"#;

/// Wrap page content in the shared chrome (navbar, container, footer).
pub fn layout(title: &str, body: &str) -> String {
    let year = Local::now().format("%Y");
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - Task Manager</title>
<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/css/bootstrap.min.css" rel="stylesheet">
<link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.8.1/font/bootstrap-icons.css">
{style}
</head>
<body>
<nav class="navbar navbar-expand-lg navbar-dark bg-primary mb-4">
<div class="container">
<a class="navbar-brand" href="/"><i class="bi bi-check2-circle"></i> Task Manager</a>
<div class="collapse navbar-collapse">
<ul class="navbar-nav ms-auto">
<li class="nav-item"><a class="nav-link" href="/"><i class="bi bi-house"></i> Home</a></li>
<li class="nav-item"><a class="nav-link" href="/tasks/new"><i class="bi bi-plus-circle"></i> New Task</a></li>
</ul>
</div>
</div>
</nav>
<div class="container">
{body}
</div>
<footer class="mt-5 py-3 bg-light text-center">
<div class="container">
<p class="mb-0">Task Manager &copy; {year}</p>
</div>
</footer>
<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.1.3/dist/js/bootstrap.bundle.min.js"></script>
{script}
</body>
</html>"#,
        title = title,
        style = PAGE_STYLE,
        body = body,
        year = year,
        script = FORM_SCRIPT,
    )
}

/// Field label shown to users: underscores become spaces, first letter
/// capitalized (`due_date` -> `Due date`).
pub fn field_label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Bootstrap invalid-marker class for a field, empty when the field has no
/// errors.
pub fn field_class(errors: &[(&'static str, &[String])], field: &str) -> &'static str {
    if errors.iter().any(|(f, _)| *f == field) {
        "is-invalid"
    } else {
        ""
    }
}

/// Deterministic, field-grouped error listing. Empty input yields an empty
/// string, never an empty wrapper.
pub fn error_summary(errors: &[(&'static str, &[String])]) -> String {
    if errors.is_empty() {
        return String::new();
    }

    let mut html = String::from(
        "<div class=\"alert alert-danger\">\n\
         <h5><i class=\"bi bi-exclamation-triangle\"></i> Please fix the following errors:</h5>\n\
         <ul class=\"mb-0\">\n",
    );
    for (field, field_errors) in errors {
        let label = field_label(field);
        for error in *field_errors {
            html.push_str(&format!("<li><strong>{}:</strong> {}</li>\n", label, error));
        }
    }
    html.push_str("</ul>\n</div>\n");
    html
}

fn alert_kind(kind: &str) -> &'static str {
    match kind {
        "success" => "success",
        "danger" => "danger",
        "warning" => "warning",
        _ => "info",
    }
}

/// Dismissible alert box. `message` must already be safe for markup.
fn alert(message: &str, kind: &str) -> String {
    format!(
        "<div class=\"alert alert-{} alert-dismissible fade show\" role=\"alert\">\n{}\n\
         <button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\"></button>\n</div>\n",
        alert_kind(kind),
        message
    )
}

fn status_badge_class(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "bg-warning",
        TaskStatus::InProgress => "bg-info",
        TaskStatus::Completed => "bg-success",
    }
}

/// Display label for a status (`in_progress` -> `In progress`).
pub fn status_label(status: TaskStatus) -> String {
    field_label(status.as_str())
}

fn stat_card(label: &str, value: i64, color: &str) -> String {
    format!(
        "<div class=\"col-md-3\">\n<div class=\"card text-white {}\">\n<div class=\"card-body\">\n\
         <h5 class=\"card-title\">{}</h5>\n<h2 class=\"display-4\">{}</h2>\n\
         </div>\n</div>\n</div>\n",
        color, label, value
    )
}

fn task_card(task: &Task, today: NaiveDate) -> String {
    let completed_class = if task.status == TaskStatus::Completed {
        " completed"
    } else {
        ""
    };
    let overdue = task.is_overdue(today);
    let border = if overdue { " border-danger" } else { "" };

    let due = match task.due_date {
        Some(date) => {
            let badge = if overdue {
                " <span class=\"badge bg-danger\">Overdue</span>"
            } else {
                ""
            };
            format!(
                "<small class=\"text-muted\">{}{}</small>",
                date.format("%b %d, %Y"),
                badge
            )
        }
        None => "<small class=\"text-muted\">No due date</small>".to_string(),
    };

    format!(
        r#"<div class="col-md-4 mb-4">
<div class="card task-card{completed}{border}">
<div class="card-body">
<div class="d-flex justify-content-between align-items-start mb-2">
<h5 class="card-title">{title}</h5>
<span class="badge {badge_class} status-badge">{status}</span>
</div>
<p class="card-text">{description}</p>
<div class="d-flex justify-content-between align-items-center mt-3">
{due}
<div>
<a href="/tasks/{id}/edit" class="btn btn-sm btn-outline-primary"><i class="bi bi-pencil"></i></a>
<form method="POST" action="/tasks/{id}/delete" class="d-inline" onsubmit="return confirm('Are you sure you want to delete this task?');">
<button type="submit" class="btn btn-sm btn-outline-danger"><i class="bi bi-trash"></i></button>
</form>
</div>
</div>
</div>
</div>
</div>
"#,
        completed = completed_class,
        border = border,
        title = task.title,
        badge_class = status_badge_class(task.status),
        status = status_label(task.status),
        description = task.description,
        due = due,
        id = task.id,
    )
}

/// The list view: per-status count cards, task cards, optional flash alert.
///
/// The flash message comes from the query string and is escaped here.
pub fn index_page(
    tasks: &[Task],
    stats: &TaskStats,
    flash: Option<(&str, &str)>,
    today: NaiveDate,
) -> String {
    let mut body = String::from("<h1 class=\"mb-4\">Task Manager</h1>\n");

    if let Some((message, kind)) = flash {
        body.push_str(&alert(&html_escape(message), kind));
    }

    body.push_str("<div class=\"row mb-4\">\n");
    body.push_str(&stat_card("Total Tasks", stats.total, "bg-primary"));
    body.push_str(&stat_card("Pending", stats.pending, "bg-warning"));
    body.push_str(&stat_card("In Progress", stats.in_progress, "bg-info"));
    body.push_str(&stat_card("Completed", stats.completed, "bg-success"));
    body.push_str("</div>\n");

    body.push_str(
        "<div class=\"mb-4\">\n<a href=\"/tasks/new\" class=\"btn btn-success\">\
         <i class=\"bi bi-plus-circle\"></i> Add New Task</a>\n</div>\n",
    );

    if tasks.is_empty() {
        body.push_str(
            "<div class=\"alert alert-info\">\n<h4 class=\"alert-heading\">No tasks found!</h4>\n\
             <p>You don't have any tasks yet. Click the \"Add New Task\" button to create your first task.</p>\n\
             </div>\n",
        );
    } else {
        body.push_str("<div class=\"row\">\n");
        for task in tasks {
            body.push_str(&task_card(task, today));
        }
        body.push_str("</div>\n");
    }

    layout("Tasks", &body)
}

/// Inputs for the shared create/edit form page.
pub struct FormPage<'a> {
    pub heading: &'a str,
    pub action: &'a str,
    pub submit_label: &'a str,
    /// Field values, already escaped (stored values or a sanitized raw
    /// submission).
    pub form: &'a TaskForm,
    pub errors: &'a [(&'static str, &'a [String])],
    /// Page-level message; the texts used here are fixed strings.
    pub message: Option<(&'a str, &'a str)>,
    /// Created/updated timestamps shown on the edit page.
    pub task_meta: Option<(&'a str, &'a str)>,
}

fn status_options(selected: &str) -> String {
    let mut html = String::new();
    for status in TaskStatus::ALL {
        let marker = if status.as_str() == selected {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            status.as_str(),
            marker,
            status_label(status)
        ));
    }
    html
}

/// Render the create/edit form with validation state and re-populated values.
pub fn form_page(page: &FormPage<'_>) -> String {
    let mut body = format!("<h1 class=\"mb-4\">{}</h1>\n", page.heading);

    if let Some((message, kind)) = page.message {
        body.push_str(&alert(message, kind));
    }
    body.push_str(&error_summary(page.errors));

    // Textarea pre-fill must not show literal break markers.
    let description = strip_break_markers(&page.form.description);

    body.push_str(&format!(
        r#"<form method="POST" action="{action}" id="taskForm" class="needs-validation" novalidate>
<div class="mb-3">
<label for="title" class="form-label">Task Title <span class="text-danger">*</span>
<small class="text-muted">({min}-{max} characters)</small></label>
<input type="text" class="form-control {title_class}" id="title" name="title" value="{title}"
 required minlength="{min}" maxlength="{max}" pattern="^[a-zA-Z0-9\s\-.,!?']+$">
<div class="invalid-feedback">
Please enter a valid title ({min}-{max} characters, only letters, numbers, spaces, and basic punctuation).
</div>
</div>
<div class="mb-3">
<label for="description" class="form-label">Description
<small class="text-muted">(Max {desc_max} characters)</small></label>
<textarea class="form-control {description_class}" id="description" name="description" rows="3"
 maxlength="{desc_max}" placeholder="Enter task description">{description}</textarea>
<div class="invalid-feedback">
Description cannot exceed {desc_max} characters and should not contain harmful content.
</div>
</div>
<div class="row mb-3">
<div class="col-md-6">
<label for="status" class="form-label">Status <span class="text-danger">*</span></label>
<select class="form-select {status_class}" id="status" name="status" required>
{status_options}</select>
<div class="invalid-feedback">Please select a valid status.</div>
</div>
<div class="col-md-6">
<label for="due_date" class="form-label">Due Date</label>
<input type="date" class="form-control {due_date_class}" id="due_date" name="due_date" value="{due_date}">
<div class="invalid-feedback">Please enter a valid date (YYYY-MM-DD format).</div>
<small class="text-muted">Leave empty if no due date</small>
</div>
</div>
<div class="d-flex gap-2">
<button type="submit" class="btn btn-primary"><i class="bi bi-save"></i> {submit}</button>
<a href="/" class="btn btn-outline-secondary">Cancel</a>
</div>
</form>
"#,
        action = page.action,
        min = TITLE_MIN_LEN,
        max = TITLE_MAX_LEN,
        desc_max = DESCRIPTION_MAX_LEN,
        title = page.form.title,
        description = description,
        due_date = page.form.due_date,
        title_class = field_class(page.errors, "title"),
        description_class = field_class(page.errors, "description"),
        status_class = field_class(page.errors, "status"),
        due_date_class = field_class(page.errors, "due_date"),
        status_options = status_options(&page.form.status),
        submit = page.submit_label,
    ));

    if let Some((created_at, updated_at)) = page.task_meta {
        body.push_str(&format!(
            "<hr class=\"my-4\">\n<div class=\"text-muted\"><small>\
             <strong>Created:</strong> {}<br>\
             <strong>Last Updated:</strong> {}</small></div>\n",
            format_timestamp(created_at),
            format_timestamp(updated_at)
        ));
    }

    layout(page.heading, &body)
}

/// Format an RFC3339 timestamp for display, falling back to the raw string.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%b %d, %Y %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::now_string;

    fn sample_task(status: TaskStatus, due_date: Option<NaiveDate>) -> Task {
        Task {
            id: 7,
            title: "Water the plants".to_string(),
            description: "Front porch<br />\nand kitchen".to_string(),
            status,
            due_date,
            created_at: now_string(),
            updated_at: now_string(),
        }
    }

    #[test]
    fn field_label_replaces_underscores_and_capitalizes() {
        assert_eq!(field_label("due_date"), "Due date");
        assert_eq!(field_label("title"), "Title");
        assert_eq!(field_label("in_progress"), "In progress");
    }

    #[test]
    fn field_class_marks_only_failing_fields() {
        let title_errors = vec!["Title is required".to_string()];
        let errors: Vec<(&'static str, &[String])> = vec![("title", title_errors.as_slice())];
        assert_eq!(field_class(&errors, "title"), "is-invalid");
        assert_eq!(field_class(&errors, "description"), "");
    }

    #[test]
    fn error_summary_is_empty_for_no_errors() {
        assert_eq!(error_summary(&[]), "");
    }

    #[test]
    fn error_summary_groups_by_field_with_labels() {
        let title_errors = vec!["Title is required".to_string()];
        let due_errors = vec!["Invalid date".to_string()];
        let errors: Vec<(&'static str, &[String])> = vec![
            ("title", title_errors.as_slice()),
            ("due_date", due_errors.as_slice()),
        ];

        let html = error_summary(&errors);
        assert!(html.contains("<li><strong>Title:</strong> Title is required</li>"));
        assert!(html.contains("<li><strong>Due date:</strong> Invalid date</li>"));
        let title_pos = html.find("Title is required").unwrap();
        let due_pos = html.find("Invalid date").unwrap();
        assert!(title_pos < due_pos);
    }

    #[test]
    fn index_page_flags_overdue_open_tasks() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let overdue = sample_task(TaskStatus::Pending, NaiveDate::from_ymd_opt(2026, 8, 1));
        let html = index_page(&[overdue], &TaskStats::default(), None, today);
        assert!(html.contains("Overdue"));
        assert!(html.contains("border-danger"));
    }

    #[test]
    fn index_page_does_not_flag_completed_tasks() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let done = sample_task(TaskStatus::Completed, NaiveDate::from_ymd_opt(2026, 8, 1));
        let html = index_page(&[done], &TaskStats::default(), None, today);
        assert!(!html.contains("Overdue"));
    }

    #[test]
    fn index_page_escapes_the_flash_message() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let html = index_page(
            &[],
            &TaskStats::default(),
            Some(("<script>x</script>", "success")),
            today,
        );
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
    }

    #[test]
    fn index_page_restricts_flash_kinds_to_known_classes() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let html = index_page(
            &[],
            &TaskStats::default(),
            Some(("done", "danger\" onmouseover=\"x")),
            today,
        );
        assert!(html.contains("alert-info"));
        assert!(!html.contains("onmouseover"));
    }

    #[test]
    fn form_page_strips_break_markers_from_textarea() {
        let form = TaskForm {
            title: "Water the plants".to_string(),
            description: "line one<br />\nline two".to_string(),
            status: "pending".to_string(),
            due_date: String::new(),
        };
        let errors: Vec<(&'static str, &[String])> = Vec::new();
        let html = form_page(&FormPage {
            heading: "Edit Task",
            action: "/tasks/7/edit",
            submit_label: "Update Task",
            form: &form,
            errors: &errors,
            message: None,
            task_meta: None,
        });
        assert!(html.contains(">line one\nline two</textarea>"));
        assert!(!html.contains("line one<br />"));
    }

    #[test]
    fn form_page_marks_selected_status() {
        let form = TaskForm {
            status: "in_progress".to_string(),
            ..Default::default()
        };
        let errors: Vec<(&'static str, &[String])> = Vec::new();
        let html = form_page(&FormPage {
            heading: "Create New Task",
            action: "/tasks/new",
            submit_label: "Create Task",
            form: &form,
            errors: &errors,
            message: None,
            task_meta: None,
        });
        assert!(html.contains("<option value=\"in_progress\" selected>In progress</option>"));
        assert!(html.contains("<option value=\"pending\">Pending</option>"));
    }
}
