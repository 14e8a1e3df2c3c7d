//! Investment entity - A tracked allocation of family funds.
//!
//! `roi` is stored denormalized; it is only ever written by `core::valuation`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Investment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "investments")]
pub struct Model {
    /// Unique identifier for the investment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// `"real_estate"`, `"stocks"`, `"small_business"`, `"fixed_income"`, `"forex"` or `"other"`
    #[serde(rename = "type")]
    pub investment_type: String,
    /// Free-text category
    pub category: String,
    /// Capital committed when the investment was created
    pub amount_invested: f64,
    /// Latest valuation
    pub current_value: f64,
    /// Projected yearly return, 0-100
    pub expected_return_rate: f64,
    /// Return on investment in percent, derived from `current_value` and `amount_invested`
    pub roi: f64,
    /// `"very_low"`, `"low"`, `"medium"`, `"high"` or `"very_high"`
    pub risk_level: String,
    /// `"active"`, `"sold"`, `"matured"` or `"under_performance"`
    pub status: String,
    /// Optional longer description
    pub description: Option<String>,
    /// Admin who created the investment, None once that user is deleted
    pub created_by: Option<i64>,
    /// When the investment was created
    pub created_at: DateTimeUtc,
    /// When the investment was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Investment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each investment was created by one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Creator,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
