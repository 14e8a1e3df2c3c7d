//! Setting entity - Stores key-value pairs for family-wide configuration.
//! Used for meeting details, the monthly contribution amount and the
//! investment cap percentage. Typed access lives in `core::settings`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Setting database model - stores key-value configuration pairs
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Configuration key (e.g., `"maxInvestmentPercentage"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Configuration value stored as string
    pub value: String,
    /// Human-readable description
    pub description: Option<String>,
    /// When this setting was created
    pub created_at: DateTimeUtc,
    /// When this setting was last modified
    pub updated_at: DateTimeUtc,
}

/// `Setting` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
