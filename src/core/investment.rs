//! Investment records.
//!
//! Creation goes through the capacity check in the same database transaction as the
//! insert. After creation only descriptive fields are edited here; valuations go
//! through `core::valuation`, and the invested amount never changes.

use crate::{
    core::{
        capacity, optional_text, require_non_negative, require_text,
        user::MemberSummary,
    },
    entities::{Investment, User, investment, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

stored_enum! {
    /// Asset class of an investment.
    pub enum InvestmentType("investment type") {
        RealEstate => "real_estate",
        Stocks => "stocks",
        SmallBusiness => "small_business",
        FixedIncome => "fixed_income",
        Forex => "forex",
        Other => "other",
    }
}

stored_enum! {
    /// How risky an investment is judged to be.
    #[derive(Default)]
    pub enum RiskLevel("risk level") {
        VeryLow => "very_low",
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        VeryHigh => "very_high",
    }
}

stored_enum! {
    /// Where an investment is in its life.
    #[derive(Default)]
    pub enum InvestmentStatus("investment status") {
        /// Held; counted in portfolio statistics
        #[default]
        Active => "active",
        Sold => "sold",
        Matured => "matured",
        UnderPerformance => "under_performance",
    }
}

/// Input for a new investment.
#[derive(Debug, Clone)]
pub struct NewInvestment {
    /// Must not be blank
    pub name: String,
    /// Asset class
    pub investment_type: InvestmentType,
    /// Free-text grouping, e.g. `"Land"`
    pub category: String,
    /// Must be non-negative and fit under the investment cap
    pub amount_invested: f64,
    /// Annual percentage, 0-100
    pub expected_return_rate: f64,
    /// Defaults to `medium` at the route
    pub risk_level: RiskLevel,
    /// Defaults to `active` at the route
    pub status: InvestmentStatus,
    /// Optional free text
    pub description: Option<String>,
}

/// Descriptive fields an admin may change after creation; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct InvestmentUpdate {
    /// New display name
    pub name: Option<String>,
    /// New asset class
    pub investment_type: Option<InvestmentType>,
    /// New grouping
    pub category: Option<String>,
    /// Annual percentage, 0-100
    pub expected_return_rate: Option<f64>,
    /// New risk level
    pub risk_level: Option<RiskLevel>,
    /// New lifecycle status; only `active` rows count toward portfolio stats
    pub status: Option<InvestmentStatus>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

/// An investment with the admin who created it.
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentWithCreator {
    /// The row, flattened into the JSON object
    #[serde(flatten)]
    pub investment: investment::Model,
    /// `None` once the creating admin has been deleted
    pub creator: Option<MemberSummary>,
}

impl From<(investment::Model, Option<user::Model>)> for InvestmentWithCreator {
    fn from((investment, creator): (investment::Model, Option<user::Model>)) -> Self {
        Self {
            investment,
            creator: creator.as_ref().map(MemberSummary::from),
        }
    }
}

fn validate_return_rate(rate: f64) -> Result<f64> {
    if rate.is_finite() && (0.0..=100.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(Error::validation(
            "Expected return rate must be between 0 and 100",
        ))
    }
}

/// Creates an investment if it fits under the cap.
///
/// The capacity check and the insert share one transaction, so a rejected request
/// leaves nothing behind. `current_value` starts equal to `amount_invested` and
/// `roi` at 0. Concurrent callers must also be serialised by the caller (the API
/// holds a process-wide lock) because `SQLite` transactions do not stop two
/// readers from seeing the same headroom.
pub async fn create_investment(
    db: &DatabaseConnection,
    created_by: i64,
    new_investment: NewInvestment,
) -> Result<investment::Model> {
    let name = require_text("Name", &new_investment.name)?;
    let category = require_text("Category", &new_investment.category)?;
    let amount = require_non_negative("Amount invested", new_investment.amount_invested)?;
    let expected_return_rate = validate_return_rate(new_investment.expected_return_rate)?;

    let txn = db.begin().await?;
    capacity::validate_new_investment(&txn, amount).await?;

    let now = Utc::now();
    let created = investment::ActiveModel {
        name: Set(name),
        investment_type: Set(new_investment.investment_type.as_str().to_string()),
        category: Set(category),
        amount_invested: Set(amount),
        current_value: Set(amount),
        expected_return_rate: Set(expected_return_rate),
        roi: Set(0.0),
        risk_level: Set(new_investment.risk_level.as_str().to_string()),
        status: Set(new_investment.status.as_str().to_string()),
        description: Set(optional_text(new_investment.description)),
        created_by: Set(Some(created_by)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(
        "Created investment_id {} '{}' for {:.2} (created by user_id {})",
        created.id, created.name, created.amount_invested, created_by
    );
    Ok(created)
}

/// Retrieves an investment by id.
pub async fn get_investment_by_id<C>(db: &C, investment_id: i64) -> Result<Option<investment::Model>>
where
    C: ConnectionTrait,
{
    Investment::find_by_id(investment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an investment and its creator, or fails with `NotFound`.
pub async fn get_investment_with_creator(
    db: &DatabaseConnection,
    investment_id: i64,
) -> Result<InvestmentWithCreator> {
    Investment::find_by_id(investment_id)
        .find_also_related(User)
        .one(db)
        .await?
        .map(Into::into)
        .ok_or_else(|| Error::not_found("Investment", investment_id))
}

/// All investments, newest first, with their creators.
pub async fn list_investments(db: &DatabaseConnection) -> Result<Vec<InvestmentWithCreator>> {
    let rows = Investment::find()
        .find_also_related(User)
        .order_by_desc(investment::Column::CreatedAt)
        .order_by_desc(investment::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Applies an [`InvestmentUpdate`].
pub async fn update_investment(
    db: &DatabaseConnection,
    investment_id: i64,
    update: InvestmentUpdate,
) -> Result<investment::Model> {
    let existing = get_investment_by_id(db, investment_id)
        .await?
        .ok_or_else(|| Error::not_found("Investment", investment_id))?;

    let mut active: investment::ActiveModel = existing.into();
    if let Some(name) = update.name {
        active.name = Set(require_text("Name", &name)?);
    }
    if let Some(investment_type) = update.investment_type {
        active.investment_type = Set(investment_type.as_str().to_string());
    }
    if let Some(category) = update.category {
        active.category = Set(require_text("Category", &category)?);
    }
    if let Some(rate) = update.expected_return_rate {
        active.expected_return_rate = Set(validate_return_rate(rate)?);
    }
    if let Some(risk_level) = update.risk_level {
        active.risk_level = Set(risk_level.as_str().to_string());
    }
    if let Some(status) = update.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(description) = update.description {
        active.description = Set(optional_text(description));
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(db).await?;
    info!("Updated investment_id {}", investment_id);
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::capacity::remaining_capacity;
    use crate::test_utils::*;

    fn land(amount: f64) -> NewInvestment {
        NewInvestment {
            name: "Farm plot".to_string(),
            investment_type: InvestmentType::RealEstate,
            category: "Land".to_string(),
            amount_invested: amount,
            expected_return_rate: 12.0,
            risk_level: RiskLevel::default(),
            status: InvestmentStatus::default(),
            description: None,
        }
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(
            "small_business".parse::<InvestmentType>().ok(),
            Some(InvestmentType::SmallBusiness)
        );
        assert!("crypto".parse::<InvestmentType>().is_err());
        assert_eq!(RiskLevel::default().as_str(), "medium");
        assert_eq!(InvestmentStatus::default().as_str(), "active");
        assert_eq!(InvestmentStatus::ALL.len(), 4);
    }

    #[tokio::test]
    async fn test_create_within_capacity_initialises_value_and_roi() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        create_completed_contribution(&db, admin.id, 1_000_000.0).await?;
        insert_test_investment(&db, admin.id, 800_000.0, "active").await?;

        let created = create_investment(&db, admin.id, land(25_000.0)).await?;
        assert_eq!(created.current_value, 25_000.0);
        assert_eq!(created.roi, 0.0);
        assert_eq!(created.created_by, Some(admin.id));
        assert_eq!(created.risk_level, "medium");
        assert_eq!(remaining_capacity(&db).await?, 5_000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_over_capacity_inserts_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        create_completed_contribution(&db, admin.id, 1_000_000.0).await?;
        insert_test_investment(&db, admin.id, 800_000.0, "active").await?;

        let result = create_investment(&db, admin.id, land(40_000.0)).await;
        assert!(matches!(
            result,
            Err(Error::CapacityExceeded { remaining, .. }) if remaining == 30_000.0
        ));
        assert_eq!(Investment::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_remaining_capacity_never_increases_with_creations() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        create_completed_contribution(&db, admin.id, 10_000.0).await?;

        let mut previous = remaining_capacity(&db).await?;
        for amount in [1_000.0, 0.0, 2_500.0, 4_800.0] {
            create_investment(&db, admin.id, land(amount)).await?;
            let now = remaining_capacity(&db).await?;
            assert!(now <= previous);
            previous = now;
        }
        assert!(create_investment(&db, admin.id, land(1.0)).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;

        let negative = create_investment(&db, admin.id, land(-1.0)).await;
        assert!(matches!(negative, Err(Error::Validation { .. })));

        let bad_rate = create_investment(
            &db,
            admin.id,
            NewInvestment {
                expected_return_rate: 101.0,
                ..land(0.0)
            },
        )
        .await;
        assert!(matches!(bad_rate, Err(Error::Validation { .. })));

        let no_name = create_investment(
            &db,
            admin.id,
            NewInvestment {
                name: " ".to_string(),
                ..land(0.0)
            },
        )
        .await;
        assert!(matches!(no_name, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_get_include_creator() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        create_completed_contribution(&db, admin.id, 10_000.0).await?;
        let created = create_investment(&db, admin.id, land(100.0)).await?;

        let listed = list_investments(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].creator.as_ref().unwrap().id, admin.id);

        let fetched = get_investment_with_creator(&db, created.id).await?;
        assert_eq!(fetched.investment.name, "Farm plot");

        let missing = get_investment_with_creator(&db, 999).await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_descriptive_fields_only() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        create_completed_contribution(&db, admin.id, 10_000.0).await?;
        let created = create_investment(&db, admin.id, land(1_000.0)).await?;

        let updated = update_investment(
            &db,
            created.id,
            InvestmentUpdate {
                status: Some(InvestmentStatus::Sold),
                risk_level: Some(RiskLevel::Low),
                description: Some(Some("Sold to neighbour".to_string())),
                ..InvestmentUpdate::default()
            },
        )
        .await?;
        assert_eq!(updated.status, "sold");
        assert_eq!(updated.risk_level, "low");
        assert_eq!(updated.amount_invested, 1_000.0);
        assert_eq!(updated.current_value, 1_000.0);
        assert_eq!(updated.description.as_deref(), Some("Sold to neighbour"));
        Ok(())
    }
}
