//! User business logic - registration, sign-in, profiles and administration.
//!
//! Roles and statuses are persisted as strings; [`Role`] and [`UserStatus`] are the
//! typed views used everywhere else. Passwords are hashed in `core::auth` before they
//! reach the database and the hash is never returned to callers outside this crate:
//! API responses are built from [`UserProfile`].

use crate::{
    config::app::AdminBootstrap,
    core::{auth, optional_text, require_text},
    entities::{Announcement, Contribution, Investment, User, announcement, contribution, investment, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, info};

/// Shortest password accepted at registration or password change.
pub const MIN_PASSWORD_LEN: usize = 6;

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full control over the ledger
    Admin,
    /// Regular family member
    Member,
    /// Read-mostly access
    Guest,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Member, Self::Guest];

    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::Guest => "guest",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Invalid role: {s}")))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    /// Normal account
    Active,
    /// Awaiting confirmation; may still sign in
    Pending,
    /// Blocked by an admin
    Suspended,
    /// Retired account
    Inactive,
}

impl UserStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [Self::Active, Self::Pending, Self::Suspended, Self::Inactive];

    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
            Self::Inactive => "inactive",
        }
    }

    /// Suspended and inactive accounts are refused at sign-in and on every request.
    #[must_use]
    pub const fn can_sign_in(self) -> bool {
        matches!(self, Self::Active | Self::Pending)
    }
}

impl FromStr for UserStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Invalid user status: {s}")))
    }
}

/// The identity a request acts as, resolved fresh from the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// User id
    pub id: i64,
    /// Current role
    pub role: Role,
    /// Current status
    pub status: UserStatus,
}

impl Actor {
    /// Builds an actor from a stored user row.
    pub fn from_model(model: &user::Model) -> Result<Self> {
        Ok(Self {
            id: model.id,
            role: model.role.parse()?,
            status: model.status.parse()?,
        })
    }

    /// Whether this actor holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// A user as shown to clients - everything except the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User id
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// See [`full_name`]
    pub full_name: String,
    /// Always lowercase
    pub email: String,
    /// `"admin"` or `"member"`
    pub role: String,
    /// `"active"`, `"pending"`, `"suspended"` or `"inactive"`
    pub status: String,
    /// Optional contact number
    pub phone: Option<String>,
    /// Set on each successful login
    pub last_login: Option<DateTime<Utc>>,
    /// Registration time
    pub created_at: DateTime<Utc>,
    /// Last profile change
    pub updated_at: DateTime<Utc>,
}

impl From<&user::Model> for UserProfile {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name.clone(),
            last_name: model.last_name.clone(),
            full_name: full_name(model),
            email: model.email.clone(),
            role: model.role.clone(),
            status: model.status.clone(),
            phone: model.phone.clone(),
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Name and email attached to contributions, investments and announcements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    /// User id
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email
    pub email: String,
}

impl From<&user::Model> for MemberSummary {
    fn from(model: &user::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name.clone(),
            last_name: model.last_name.clone(),
            email: model.email.clone(),
        }
    }
}

/// "First Last" for display.
#[must_use]
pub fn full_name(model: &user::Model) -> String {
    format!("{} {}", model.first_name, model.last_name)
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Given name; must not be blank
    pub first_name: String,
    /// Family name; must not be blank
    pub last_name: String,
    /// Lowercased before storage; must be unique
    pub email: String,
    /// Plaintext, at least `MIN_PASSWORD_LEN` characters; only its hash is stored
    pub password: String,
    /// Optional contact number
    pub phone: Option<String>,
    /// Initial role
    pub role: Role,
    /// Initial account status
    pub status: UserStatus,
}

/// Admin edit of another user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// Must stay unique across users
    pub email: Option<String>,
    /// New role
    pub role: Option<Role>,
    /// New account status; `suspended` and `inactive` block login
    pub status: Option<UserStatus>,
    /// `Some(None)` clears the phone number
    pub phone: Option<Option<String>>,
}

/// Self-service profile edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// New given name
    pub first_name: Option<String>,
    /// New family name
    pub last_name: Option<String>,
    /// A blank string clears the phone number
    pub phone: Option<String>,
}

/// Per-user notification switches, stored as JSON on the user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    /// Default on
    pub email_notifications: bool,
    /// Default off
    pub push_notifications: bool,
    /// Default on
    pub contribution_reminders: bool,
    /// Default on
    pub meeting_reminders: bool,
    /// Default on
    pub monthly_reports: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            contribution_reminders: true,
            meeting_reminders: true,
            monthly_reports: true,
        }
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = require_text("Email", email)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(Error::validation(format!("Invalid email address: {email}"))),
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

async fn ensure_email_free<C>(db: &C, email: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let existing = get_user_by_email(db, email).await?;
    match existing {
        Some(found) if Some(found.id) != except_id => Err(Error::Conflict {
            message: "User already exists with this email".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Finds a user by email (case-insensitive, emails are stored lowercased).
pub async fn get_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(email.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Like [`get_user_by_id`] but a missing user is an error.
pub async fn require_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    get_user_by_id(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", user_id))
}

/// Creates a user after validating names, email and password.
pub async fn create_user<C>(db: &C, new_user: NewUser) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let first_name = require_text("First name", &new_user.first_name)?;
    let last_name = require_text("Last name", &new_user.last_name)?;
    let email = normalize_email(&new_user.email)?;
    validate_password(&new_user.password)?;
    ensure_email_free(db, &email, None).await?;
    let password_hash = auth::hash_password_async(new_user.password).await?;

    let now = Utc::now();
    let model = user::ActiveModel {
        first_name: Set(first_name),
        last_name: Set(last_name),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(new_user.role.as_str().to_string()),
        status: Set(new_user.status.as_str().to_string()),
        phone: Set(optional_text(new_user.phone)),
        notification_preferences: Set(None),
        last_login: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        "Created user_id {} ({}) with role {}",
        created.id, created.email, created.role
    );
    Ok(created)
}

/// Public self-registration. New accounts are always active members.
pub async fn register_member(
    db: &DatabaseConnection,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    phone: Option<String>,
) -> Result<user::Model> {
    create_user(
        db,
        NewUser {
            first_name,
            last_name,
            email,
            password,
            phone,
            role: Role::Member,
            status: UserStatus::Active,
        },
    )
    .await
}

/// Verifies credentials and records the login time.
///
/// Unknown email and wrong password produce the same error.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let invalid = || Error::Unauthorized {
        message: "Invalid credentials".to_string(),
    };

    let found = get_user_by_email(db, email).await?.ok_or_else(invalid)?;
    if !auth::verify_password_async(password.to_string(), found.password_hash.clone()).await? {
        return Err(invalid());
    }

    let status: UserStatus = found.status.parse()?;
    if !status.can_sign_in() {
        return Err(Error::Forbidden {
            action: "sign in with a suspended or inactive account",
        });
    }

    let mut active: user::ActiveModel = found.into();
    active.last_login = Set(Some(Utc::now()));
    let updated = active.update(db).await?;
    debug!("User {} signed in", updated.id);
    Ok(updated)
}

/// All users, newest first.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The most recently registered users.
pub async fn recent_registrations(db: &DatabaseConnection, limit: u64) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of users whose status is `active`.
pub async fn count_active_users(db: &DatabaseConnection) -> Result<u64> {
    User::find()
        .filter(user::Column::Status.eq(UserStatus::Active.as_str()))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Admin edit of any user.
pub async fn update_user(
    db: &DatabaseConnection,
    user_id: i64,
    update: UserUpdate,
) -> Result<user::Model> {
    let existing = require_user(db, user_id).await?;
    let mut active: user::ActiveModel = existing.into();

    if let Some(first_name) = update.first_name {
        active.first_name = Set(require_text("First name", &first_name)?);
    }
    if let Some(last_name) = update.last_name {
        active.last_name = Set(require_text("Last name", &last_name)?);
    }
    if let Some(email) = update.email {
        let email = normalize_email(&email)?;
        ensure_email_free(db, &email, Some(user_id)).await?;
        active.email = Set(email);
    }
    if let Some(role) = update.role {
        active.role = Set(role.as_str().to_string());
    }
    if let Some(status) = update.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(phone) = update.phone {
        active.phone = Set(optional_text(phone));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!("Updated user_id {}", updated.id);
    Ok(updated)
}

/// Changes only the role of a user.
pub async fn set_role(db: &DatabaseConnection, user_id: i64, role: Role) -> Result<user::Model> {
    update_user(
        db,
        user_id,
        UserUpdate {
            role: Some(role),
            ..UserUpdate::default()
        },
    )
    .await
}

/// Self-service edit of names and phone number.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<user::Model> {
    update_user(
        db,
        user_id,
        UserUpdate {
            first_name: update.first_name,
            last_name: update.last_name,
            phone: update.phone.map(Some),
            ..UserUpdate::default()
        },
    )
    .await
}

/// Replaces the password after checking the current one.
pub async fn change_password(
    db: &DatabaseConnection,
    user_id: i64,
    current_password: &str,
    new_password: &str,
) -> Result<()> {
    let existing = require_user(db, user_id).await?;
    if !auth::verify_password_async(current_password.to_string(), existing.password_hash.clone())
        .await?
    {
        return Err(Error::validation("Current password is incorrect"));
    }
    validate_password(new_password)?;

    let mut active: user::ActiveModel = existing.into();
    active.password_hash = Set(auth::hash_password_async(new_password.to_string()).await?);
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    info!("Password changed for user_id {}", user_id);
    Ok(())
}

/// Deletes a user together with their contributions and announcements.
///
/// Investments they created are kept with `created_by` cleared. An admin cannot
/// delete their own account.
pub async fn delete_user(db: &DatabaseConnection, acting_user_id: i64, user_id: i64) -> Result<()> {
    if acting_user_id == user_id {
        return Err(Error::validation("Cannot delete your own account"));
    }

    let txn = db.begin().await?;
    require_user(&txn, user_id).await?;

    let contributions = Contribution::delete_many()
        .filter(contribution::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    Announcement::delete_many()
        .filter(announcement::Column::AuthorId.eq(user_id))
        .exec(&txn)
        .await?;
    Investment::update_many()
        .col_expr(investment::Column::CreatedBy, Expr::value(Option::<i64>::None))
        .filter(investment::Column::CreatedBy.eq(user_id))
        .exec(&txn)
        .await?;
    User::delete_by_id(user_id).exec(&txn).await?;

    txn.commit().await?;
    info!(
        "Deleted user_id {} and {} contributions",
        user_id, contributions.rows_affected
    );
    Ok(())
}

/// Creates the configured admin account unless a user with that email exists.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(db: &DatabaseConnection, admin: &AdminBootstrap) -> Result<bool> {
    if get_user_by_email(db, &admin.email).await?.is_some() {
        debug!("Admin account {} already present", admin.email);
        return Ok(false);
    }

    create_user(
        db,
        NewUser {
            first_name: admin.first_name.clone(),
            last_name: admin.last_name.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            phone: None,
            role: Role::Admin,
            status: UserStatus::Active,
        },
    )
    .await?;
    Ok(true)
}

/// Stored preferences, or the defaults if none were saved (or the stored JSON is unreadable).
pub async fn get_notification_preferences(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<NotificationPreferences> {
    let existing = require_user(db, user_id).await?;
    Ok(existing
        .notification_preferences
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default())
}

/// Saves preferences for a user.
pub async fn set_notification_preferences(
    db: &DatabaseConnection,
    user_id: i64,
    preferences: &NotificationPreferences,
) -> Result<NotificationPreferences> {
    let existing = require_user(db, user_id).await?;
    let encoded = serde_json::to_string(preferences)
        .map_err(|e| Error::validation(format!("Invalid notification preferences: {e}")))?;

    let mut active: user::ActiveModel = existing.into();
    active.notification_preferences = Set(Some(encoded));
    active.updated_at = Set(Utc::now());
    active.update(db).await?;
    Ok(preferences.clone())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_register_member_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let created = register_member(
            &db,
            "Ada".to_string(),
            "Mugisha".to_string(),
            "Ada@Family.test".to_string(),
            "secret1".to_string(),
            Some("  ".to_string()),
        )
        .await?;

        assert_eq!(created.email, "ada@family.test");
        assert_eq!(created.role, "member");
        assert_eq!(created.status, "active");
        assert!(created.phone.is_none());
        assert_ne!(created.password_hash, "secret1");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_member(&db, "dup@family.test").await?;

        let result = register_member(
            &db,
            "Other".to_string(),
            "Person".to_string(),
            "DUP@family.test".to_string(),
            "secret1".to_string(),
            None,
        )
        .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_register_rejects_short_password_and_bad_email() -> Result<()> {
        let db = setup_test_db().await?;

        let short = register_member(
            &db,
            "A".to_string(),
            "B".to_string(),
            "a@b.test".to_string(),
            "12345".to_string(),
            None,
        )
        .await;
        assert!(matches!(short, Err(Error::Validation { .. })));

        let bad_email = register_member(
            &db,
            "A".to_string(),
            "B".to_string(),
            "not-an-email".to_string(),
            "123456".to_string(),
            None,
        )
        .await;
        assert!(matches!(bad_email, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_authenticate_updates_last_login() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "login@family.test").await?;
        assert!(member.last_login.is_none());

        let signed_in = authenticate(&db, "login@family.test", TEST_PASSWORD).await?;
        assert_eq!(signed_in.id, member.id);
        assert!(signed_in.last_login.is_some());

        let wrong = authenticate(&db, "login@family.test", "wrong-password").await;
        assert!(matches!(wrong, Err(Error::Unauthorized { .. })));

        let unknown = authenticate(&db, "nobody@family.test", TEST_PASSWORD).await;
        assert!(matches!(unknown, Err(Error::Unauthorized { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_sign_in() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "blocked@family.test").await?;
        update_user(
            &db,
            member.id,
            UserUpdate {
                status: Some(UserStatus::Suspended),
                ..UserUpdate::default()
            },
        )
        .await?;

        let result = authenticate(&db, "blocked@family.test", TEST_PASSWORD).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_change_password() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "pw@family.test").await?;

        let wrong = change_password(&db, member.id, "nope", "newsecret").await;
        assert!(matches!(wrong, Err(Error::Validation { .. })));

        change_password(&db, member.id, TEST_PASSWORD, "newsecret").await?;
        assert!(authenticate(&db, "pw@family.test", "newsecret").await.is_ok());
        assert!(authenticate(&db, "pw@family.test", TEST_PASSWORD).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_email_conflict() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_member(&db, "taken@family.test").await?;
        let other = create_test_member(&db, "other@family.test").await?;

        let result = update_user(
            &db,
            other.id,
            UserUpdate {
                email: Some("taken@family.test".to_string()),
                ..UserUpdate::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Conflict { .. })));

        // Re-saving your own email is fine
        let same = update_user(
            &db,
            other.id,
            UserUpdate {
                email: Some("other@family.test".to_string()),
                ..UserUpdate::default()
            },
        )
        .await?;
        assert_eq!(same.email, "other@family.test");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user_cascades() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        let member = create_test_member(&db, "leaving@family.test").await?;
        create_completed_contribution(&db, member.id, 500.0).await?;
        let investment = insert_test_investment(&db, member.id, 100.0, "active").await?;

        let self_delete = delete_user(&db, admin.id, admin.id).await;
        assert!(matches!(self_delete, Err(Error::Validation { .. })));

        delete_user(&db, admin.id, member.id).await?;

        assert!(get_user_by_id(&db, member.id).await?.is_none());
        let remaining = Contribution::find()
            .filter(contribution::Column::UserId.eq(member.id))
            .count(&db)
            .await?;
        assert_eq!(remaining, 0);
        let kept = Investment::find_by_id(investment.id).one(&db).await?.unwrap();
        assert!(kept.created_by.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let bootstrap = AdminBootstrap {
            email: "root@family.test".to_string(),
            password: "admin123".to_string(),
            first_name: "Family".to_string(),
            last_name: "Admin".to_string(),
        };

        assert!(ensure_admin(&db, &bootstrap).await?);
        assert!(!ensure_admin(&db, &bootstrap).await?);

        let admin = get_user_by_email(&db, "root@family.test").await?.unwrap();
        assert_eq!(admin.role, "admin");
        Ok(())
    }

    #[tokio::test]
    async fn test_notification_preferences_default_then_saved() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "prefs@family.test").await?;

        let defaults = get_notification_preferences(&db, member.id).await?;
        assert_eq!(defaults, NotificationPreferences::default());

        let custom = NotificationPreferences {
            push_notifications: true,
            monthly_reports: false,
            ..NotificationPreferences::default()
        };
        set_notification_preferences(&db, member.id, &custom).await?;
        assert_eq!(get_notification_preferences(&db, member.id).await?, custom);
        Ok(())
    }

    #[test]
    fn test_role_and_status_parsing() {
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert!("owner".parse::<Role>().is_err());
        assert!(UserStatus::Pending.can_sign_in());
        assert!(!UserStatus::Inactive.can_sign_in());
        assert!("deleted".parse::<UserStatus>().is_err());
    }
}
