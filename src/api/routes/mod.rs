//! One module per resource. Each exposes a `router()` nested under `/api` by
//! [`crate::api::router`].

/// Admin-only user management
pub mod admin;
/// Announcement feed and its administration
pub mod announcements;
/// Registration, login and the caller's own profile
pub mod auth;
/// Contribution submission and review
pub mod contributions;
/// Aggregated dashboard view
pub mod dashboard;
/// Liveness, API index and unknown-route handling
pub mod health;
/// Investment portfolio, capacity and valuation
pub mod investments;
/// Settings store, meeting details and notification preferences
pub mod settings;
