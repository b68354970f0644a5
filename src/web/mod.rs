//! HTTP surface: server-rendered pages plus a small JSON API.
//!
//! ## Routes
//!
//! - `GET  /` - task list with per-status counts and flash messages
//! - `GET  /tasks/new` - create form
//! - `POST /tasks/new` - create a task
//! - `GET  /tasks/:id/edit` - edit form pre-filled from the stored task
//! - `POST /tasks/:id/edit` - update a task
//! - `POST /tasks/:id/delete` - delete a task
//! - `GET  /api/health` - health check
//! - `GET  /api/stats` - task counts grouped by status

pub mod pages;
pub mod render;
mod routes;

pub use routes::{router, serve, AppState};
