//! Announcement entity - A message broadcast by an admin to the family.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Announcement database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    /// Unique identifier for the announcement
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Headline
    pub title: String,
    /// Body text
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// `"low"`, `"normal"`, `"medium"` or `"high"`
    pub priority: String,
    /// Hidden announcements are only listed for admins
    pub is_visible: bool,
    /// Admin who wrote it
    pub author_id: i64,
    /// When the announcement was created
    pub created_at: DateTimeUtc,
    /// When the announcement was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Announcement and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each announcement belongs to its author
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
