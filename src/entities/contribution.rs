//! Contribution entity - Money a member has paid (or claims to have paid) into the family fund.
//!
//! Only rows with status `"completed"` count toward family totals and investment capacity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contribution database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "contributions")]
pub struct Model {
    /// Unique identifier for the contribution
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Amount contributed, never negative
    pub amount: f64,
    /// `"pending"`, `"approved"`, `"completed"` or `"rejected"`
    pub status: String,
    /// How the money was paid (e.g. `"bank_transfer"`, `"mobile_money"`)
    pub payment_method: String,
    /// External payment reference, unique when present
    #[sea_orm(unique)]
    pub transaction_id: Option<String>,
    /// Free-form notes from the member
    pub notes: Option<String>,
    /// Owning member
    pub user_id: i64,
    /// When the contribution was submitted
    pub created_at: DateTimeUtc,
    /// When the contribution was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Contribution and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each contribution belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
