//! # taskman
//!
//! Minimal task-tracking web application: list, create, edit, and delete
//! tasks backed by a SQLite table, rendered as server-generated HTML pages.
//!
//! ## Request Flow
//!
//! 1. A form submission arrives at a page handler
//! 2. The validation pipeline runs every field validator and aggregates
//!    per-field errors
//! 3. Valid data goes to the task store as one parameterized statement;
//!    invalid data is sanitized and re-displayed with the error summary
//!
//! ## Modules
//!
//! - `validation`: field validators and the form aggregator
//! - `sanitize`: escaping and normalization for safe redisplay
//! - `store`: task storage backends (SQLite, in-memory)
//! - `web`: HTTP routes, page handlers, and HTML rendering
//! - `config`: environment-based configuration

pub mod config;
pub mod sanitize;
pub mod store;
pub mod validation;
pub mod web;

pub use config::Config;
