//! API layer for HTTP request handling and data models.
//!
//! This module contains the HTTP surface, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures and form payloads
//!
//! # API Structure
//!
//! - **Authentication** (`/login`, `/logout`): Cookie session lifecycle
//! - **Dashboard** (`/dashboard`): Scoped ROI metrics for the signed-in user
//! - **Event log** (`/log`): Options for, and submission of, AI-assist events
//! - **Reports** (`/api/report`): CSV export of raw events
//! - **Admin** (`/admin/*`): Teams, users, approved tools, categories and the hourly rate
//!
//! Page endpoints return JSON view models; rendering is left to the front end. Form submissions
//! are `application/x-www-form-urlencoded` and answer with a `303 See Other` redirect.
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa`. The rendered reference is served at `/docs`.

pub mod handlers;
pub mod models;
