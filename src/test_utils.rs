//! Shared test utilities for the family fund service.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults. Rows that would normally
//! need several API steps (a completed contribution, an investment outside the
//! capacity check) are inserted directly.

#![allow(clippy::unwrap_used)]

use crate::{
    api::{self, AppState},
    config::AppConfig,
    core::{
        auth::TokenKeys,
        user::{self, Actor, NewUser, Role, UserStatus},
    },
    entities::{contribution, investment},
    errors::Result,
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tower::ServiceExt;

/// Password given to every user created by these helpers.
pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    last_name: &str,
    role: Role,
) -> Result<crate::entities::user::Model> {
    user::create_user(
        db,
        NewUser {
            first_name: "Test".to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: TEST_PASSWORD.to_string(),
            phone: None,
            role,
            status: UserStatus::Active,
        },
    )
    .await
}

/// Creates an active member with [`TEST_PASSWORD`].
pub async fn create_test_member(
    db: &DatabaseConnection,
    email: &str,
) -> Result<crate::entities::user::Model> {
    create_test_user(db, email, "Member", Role::Member).await
}

/// Creates an active admin with [`TEST_PASSWORD`].
pub async fn create_test_admin(
    db: &DatabaseConnection,
    email: &str,
) -> Result<crate::entities::user::Model> {
    create_test_user(db, email, "Admin", Role::Admin).await
}

/// The [`Actor`] for a stored user.
pub fn actor_for(model: &crate::entities::user::Model) -> Result<Actor> {
    Actor::from_model(model)
}

/// Inserts a contribution with an explicit status and creation time.
///
/// # Defaults
/// * `payment_method`: `"bank_transfer"`
/// * no transaction id or notes
pub async fn insert_test_contribution(
    db: &DatabaseConnection,
    user_id: i64,
    amount: f64,
    status: &str,
    created_at: DateTime<Utc>,
) -> Result<contribution::Model> {
    let model = contribution::ActiveModel {
        amount: Set(amount),
        status: Set(status.to_string()),
        payment_method: Set("bank_transfer".to_string()),
        transaction_id: Set(None),
        notes: Set(None),
        user_id: Set(user_id),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Inserts a `completed` contribution dated now.
pub async fn create_completed_contribution(
    db: &DatabaseConnection,
    user_id: i64,
    amount: f64,
) -> Result<contribution::Model> {
    insert_test_contribution(db, user_id, amount, "completed", Utc::now()).await
}

/// Inserts an investment directly, skipping the capacity check.
///
/// # Defaults
/// * `current_value`: `amount`
/// * `expected_return_rate`: 10.0
/// * `investment_type`: `"other"`, `risk_level`: `"medium"`
pub async fn insert_test_investment(
    db: &DatabaseConnection,
    created_by: i64,
    amount: f64,
    status: &str,
) -> Result<investment::Model> {
    let now = Utc::now();
    let model = investment::ActiveModel {
        name: Set(format!("Test investment {amount}")),
        investment_type: Set("other".to_string()),
        category: Set("Testing".to_string()),
        amount_invested: Set(amount),
        current_value: Set(amount),
        expected_return_rate: Set(10.0),
        roi: Set(0.0),
        risk_level: Set("medium".to_string()),
        status: Set(status.to_string()),
        description: Set(None),
        created_by: Set(Some(created_by)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

/// Application state over `db` with default config and a fixed signing secret.
pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, AppConfig::default(), TokenKeys::new(b"test-secret", 1))
}

/// `Authorization` header value for `model`.
pub fn bearer_for(state: &AppState, model: &crate::entities::user::Model) -> Result<String> {
    Ok(format!("Bearer {}", state.keys.issue(model)?))
}

/// Sends one request through a fresh router and decodes the JSON body.
///
/// `body` is sent as JSON when present; `auth` becomes the `Authorization` header.
pub async fn call(
    state: &AppState,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = api::router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
