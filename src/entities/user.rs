//! User entity - A family member account.
//!
//! Role and status are stored as strings and parsed by `core::user`.
//! The password hash never leaves the core layer; API responses use `core::user::UserProfile`.

use sea_orm::entity::prelude::*;

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id password hash
    pub password_hash: String,
    /// `"admin"`, `"member"` or `"guest"`
    pub role: String,
    /// `"active"`, `"pending"`, `"suspended"` or `"inactive"`
    pub status: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Notification preferences as a JSON document, None until first saved
    pub notification_preferences: Option<String>,
    /// Last successful login
    pub last_login: Option<DateTimeUtc>,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user submits many contributions
    #[sea_orm(has_many = "super::contribution::Entity")]
    Contributions,
    /// One user creates many investments
    #[sea_orm(has_many = "super::investment::Entity")]
    Investments,
    /// One user authors many announcements
    #[sea_orm(has_many = "super::announcement::Entity")]
    Announcements,
}

impl Related<super::contribution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investments.def()
    }
}

impl Related<super::announcement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Announcements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
