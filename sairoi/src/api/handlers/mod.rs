//! HTTP request handlers for all endpoints.
//!
//! Each handler authenticates through the [`CurrentUser`](crate::api::models::users::CurrentUser)
//! extractor, checks the role the operation needs, then works through the repositories in
//! [`crate::db::handlers`].
//!
//! - [`auth`]: Login, logout and the root redirect
//! - [`dashboard`]: Scoped ROI metrics
//! - [`events`]: The event logging form and its submission
//! - [`reports`]: CSV export
//! - [`admin`]: Admin overview and configuration changes
//!
//! Failures become [`crate::errors::Error`] responses, except in the admin mutations, which
//! always redirect back to the admin view and log what went wrong.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod reports;
