//! Page handlers for the task CRUD flows.
//!
//! Every flow is one synchronous validation pass followed by at most one
//! store call. Validation failures re-render the form with the submitted
//! values (escaped once) and per-field messages; store failures surface a
//! generic message and keep the submitted data; unknown ids redirect to the
//! listing with no banner.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use chrono::Local;
use serde::Deserialize;

use super::render::{self, FormPage};
use super::routes::AppState;
use crate::sanitize::sanitize_form;
use crate::store::{Task, TaskStats, TaskStore};
use crate::validation::{validate_task_form, FieldErrors, TaskForm};

/// Flash message passed through the query string after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct FlashParams {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Empty form with the create-page defaults: pending status, due today.
fn default_form() -> TaskForm {
    TaskForm {
        status: "pending".to_string(),
        due_date: Local::now().format("%Y-%m-%d").to_string(),
        ..Default::default()
    }
}

/// Pre-fill a form from a stored task. Stored values are already escaped;
/// they are used as-is.
fn form_from_task(task: &Task) -> TaskForm {
    TaskForm {
        title: task.title.clone(),
        description: task.description.clone(),
        status: task.status.as_str().to_string(),
        due_date: task
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
    }
}

/// `GET /` - task list with per-status counts.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(flash): Query<FlashParams>,
) -> Html<String> {
    let tasks = state.store.list().await.unwrap_or_else(|e| {
        tracing::error!("Failed to list tasks: {}", e);
        Vec::new()
    });
    let stats = state.store.stats().await.unwrap_or_else(|e| {
        tracing::error!("Failed to load task stats: {}", e);
        TaskStats::default()
    });

    let flash = flash
        .message
        .as_deref()
        .map(|m| (m, flash.kind.as_deref().unwrap_or("info")));

    Html(render::index_page(
        &tasks,
        &stats,
        flash,
        Local::now().date_naive(),
    ))
}

/// `GET /tasks/new` - empty create form.
pub async fn new_task_form(State(_state): State<Arc<AppState>>) -> Html<String> {
    let form = default_form();
    let errors: FieldErrors = Vec::new();
    Html(render::form_page(&FormPage {
        heading: "Create New Task",
        action: "/tasks/new",
        submit_label: "Create Task",
        form: &form,
        errors: &errors,
        message: None,
        task_meta: None,
    }))
}

/// `POST /tasks/new` - create flow.
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Form(raw): Form<TaskForm>,
) -> Html<String> {
    let validation = validate_task_form(&raw);

    if let Some(data) = validation.task_data() {
        match state.store.create(&data).await {
            Ok(task) => {
                tracing::info!(id = task.id, "Task created");
                let form = default_form();
                let errors: FieldErrors = Vec::new();
                Html(render::form_page(&FormPage {
                    heading: "Create New Task",
                    action: "/tasks/new",
                    submit_label: "Create Task",
                    form: &form,
                    errors: &errors,
                    message: Some(("Task created successfully!", "success")),
                    task_meta: None,
                }))
            }
            Err(e) => {
                tracing::error!("Failed to create task: {}", e);
                let form = sanitize_form(&raw);
                let errors: FieldErrors = Vec::new();
                Html(render::form_page(&FormPage {
                    heading: "Create New Task",
                    action: "/tasks/new",
                    submit_label: "Create Task",
                    form: &form,
                    errors: &errors,
                    message: Some(("Error creating task. Please try again.", "danger")),
                    task_meta: None,
                }))
            }
        }
    } else {
        let errors = validation.errors();
        let form = sanitize_form(&raw);
        Html(render::form_page(&FormPage {
            heading: "Create New Task",
            action: "/tasks/new",
            submit_label: "Create Task",
            form: &form,
            errors: &errors,
            message: Some(("Please correct the errors below.", "danger")),
            task_meta: None,
        }))
    }
}

/// `GET /tasks/:id/edit` - edit form pre-filled from the stored task.
pub async fn edit_task_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Response {
    let task = match state.store.get(id).await {
        Ok(Some(task)) => task,
        Ok(None) => return Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!("Failed to load task {}: {}", id, e);
            return Redirect::to("/").into_response();
        }
    };

    let form = form_from_task(&task);
    let action = format!("/tasks/{}/edit", id);
    let errors: FieldErrors = Vec::new();
    Html(render::form_page(&FormPage {
        heading: "Edit Task",
        action: &action,
        submit_label: "Update Task",
        form: &form,
        errors: &errors,
        message: None,
        task_meta: Some((&task.created_at, &task.updated_at)),
    }))
    .into_response()
}

/// `POST /tasks/:id/edit` - update flow (full field replace).
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Form(raw): Form<TaskForm>,
) -> Response {
    let existing = match state.store.get(id).await {
        Ok(Some(task)) => task,
        Ok(None) => return Redirect::to("/").into_response(),
        Err(e) => {
            tracing::error!("Failed to load task {}: {}", id, e);
            return Redirect::to("/").into_response();
        }
    };

    let action = format!("/tasks/{}/edit", id);
    let validation = validate_task_form(&raw);

    if let Some(data) = validation.task_data() {
        match state.store.update(id, &data).await {
            Ok(true) => {
                tracing::info!(id, "Task updated");
                // Re-read so the form reflects exactly what is stored.
                let task = state
                    .store
                    .get(id)
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or(existing);
                let form = form_from_task(&task);
                let errors: FieldErrors = Vec::new();
                Html(render::form_page(&FormPage {
                    heading: "Edit Task",
                    action: &action,
                    submit_label: "Update Task",
                    form: &form,
                    errors: &errors,
                    message: Some(("Task updated successfully!", "success")),
                    task_meta: Some((&task.created_at, &task.updated_at)),
                }))
                .into_response()
            }
            Ok(false) => Redirect::to("/").into_response(),
            Err(e) => {
                tracing::error!("Failed to update task {}: {}", id, e);
                let form = sanitize_form(&raw);
                let errors: FieldErrors = Vec::new();
                Html(render::form_page(&FormPage {
                    heading: "Edit Task",
                    action: &action,
                    submit_label: "Update Task",
                    form: &form,
                    errors: &errors,
                    message: Some(("Error updating task. Please try again.", "danger")),
                    task_meta: Some((&existing.created_at, &existing.updated_at)),
                }))
                .into_response()
            }
        }
    } else {
        let errors = validation.errors();
        let form = sanitize_form(&raw);
        Html(render::form_page(&FormPage {
            heading: "Edit Task",
            action: &action,
            submit_label: "Update Task",
            form: &form,
            errors: &errors,
            message: Some(("Please correct the errors below.", "danger")),
            task_meta: Some((&existing.created_at, &existing.updated_at)),
        }))
        .into_response()
    }
}

/// `POST /tasks/:id/delete` - hard delete, then redirect to the listing.
pub async fn delete_task(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Redirect {
    match state.store.delete(id).await {
        Ok(true) => {
            tracing::info!(id, "Task deleted");
            redirect_with_flash("Task deleted successfully", "success")
        }
        // Unknown id: back to the listing with no banner.
        Ok(false) => Redirect::to("/"),
        Err(e) => {
            tracing::error!("Failed to delete task {}: {}", id, e);
            redirect_with_flash("Error deleting task", "danger")
        }
    }
}

fn redirect_with_flash(message: &str, kind: &str) -> Redirect {
    Redirect::to(&format!(
        "/?message={}&type={}",
        urlencoding::encode(message),
        kind
    ))
}
