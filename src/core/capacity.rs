//! Investment capacity.
//!
//! The family may invest up to `cap_percentage` of its completed contributions; the
//! rest is the emergency reserve. Capital committed to an investment stays counted
//! against the cap for good: [`total_committed`] includes sold, matured and
//! under-performing investments, whereas the live statistics in
//! `core::valuation` only look at active ones.

use crate::{
    core::{
        aggregate::{ContributionScope, total_completed},
        settings::FundSettings,
    },
    entities::{Investment, investment},
    errors::{Error, Result},
};
use sea_orm::{QuerySelect, prelude::*};
use serde::Serialize;
use tracing::debug;

/// The configured cap percentage, defaulting to 83.
pub async fn cap_percentage<C>(db: &C) -> Result<f64>
where
    C: ConnectionTrait,
{
    Ok(FundSettings::load(db).await?.cap_percentage)
}

/// Largest amount that may be committed to investments in total.
#[must_use]
pub fn investable_cap(total_contributions: f64, cap_percentage: f64) -> f64 {
    total_contributions * cap_percentage / 100.0
}

/// The share held back from investment.
#[must_use]
pub fn emergency_reserve(total_contributions: f64, cap_percentage: f64) -> f64 {
    total_contributions * (100.0 - cap_percentage) / 100.0
}

/// Capital committed to investments of any status.
pub async fn total_committed<C>(db: &C) -> Result<f64>
where
    C: ConnectionTrait,
{
    let amounts: Vec<f64> = Investment::find()
        .select_only()
        .column(investment::Column::AmountInvested)
        .into_tuple()
        .all(db)
        .await?;
    Ok(amounts.iter().sum())
}

/// Everything needed to reason about headroom, computed from one read of each source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacitySnapshot {
    /// Sum of completed contributions
    pub total_contributions: f64,
    /// Share of contributions that may be invested, 0-100
    pub cap_percentage: f64,
    /// `total_contributions * cap_percentage / 100`
    pub investable_cap: f64,
    /// The part of contributions that is never invested
    pub emergency_reserve: f64,
    /// `amount_invested` summed over active investments
    pub committed: f64,
    /// `investable_cap - committed`; negative if the cap was lowered below what is already invested
    pub remaining: f64,
}

impl CapacitySnapshot {
    /// Reads contributions, the cap setting and committed capital.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let total_contributions = total_completed(db, ContributionScope::Family).await?;
        let cap_percentage = cap_percentage(db).await?;
        let committed = total_committed(db).await?;
        let cap = investable_cap(total_contributions, cap_percentage);

        Ok(Self {
            total_contributions,
            cap_percentage,
            investable_cap: cap,
            emergency_reserve: emergency_reserve(total_contributions, cap_percentage),
            committed,
            remaining: cap - committed,
        })
    }

    /// Fails with [`Error::CapacityExceeded`] if `amount` does not fit in the remaining headroom.
    pub fn check(&self, amount: f64) -> Result<()> {
        if amount > self.remaining {
            return Err(Error::CapacityExceeded {
                requested: amount,
                cap_percentage: self.cap_percentage,
                remaining: self.remaining,
            });
        }
        Ok(())
    }
}

/// Headroom left under the cap.
pub async fn remaining_capacity<C>(db: &C) -> Result<f64>
where
    C: ConnectionTrait,
{
    Ok(CapacitySnapshot::load(db).await?.remaining)
}

/// Checks a prospective investment against the remaining capacity.
///
/// Run this on the same connection or transaction that will insert the row.
pub async fn validate_new_investment<C>(db: &C, amount: f64) -> Result<CapacitySnapshot>
where
    C: ConnectionTrait,
{
    let snapshot = CapacitySnapshot::load(db).await?;
    debug!(
        "Capacity check: requested={:.2}, remaining={:.2}, cap={}%",
        amount, snapshot.remaining, snapshot.cap_percentage
    );
    snapshot.check(amount)?;
    Ok(snapshot)
}
