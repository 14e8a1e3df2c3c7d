//! Valuations, ROI and portfolio statistics.
//!
//! [`update_current_value`] is the only code that writes `current_value` or `roi`
//! after creation, so the stored ROI always matches the latest valuation.

use crate::{
    core::{capacity::CapacitySnapshot, investment::InvestmentStatus, round2},
    entities::{Investment, investment},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Percentage gain of `current_value` over `amount_invested`, to two decimals.
///
/// `None` when nothing was invested, since the ratio is undefined.
#[must_use]
pub fn compute_roi(current_value: f64, amount_invested: f64) -> Option<f64> {
    (amount_invested > 0.0)
        .then(|| round2((current_value - amount_invested) / amount_invested * 100.0))
}

/// Reads a valuation from a JSON body field that may be a number or a numeric string.
pub fn parse_value(raw: Option<&Value>) -> Result<f64> {
    let invalid = |shown: String| Error::InvalidValue { value: shown };
    let value = match raw {
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| invalid(number.to_string()))?,
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(text.clone()))?,
        Some(other) => return Err(invalid(other.to_string())),
        None => return Err(invalid("missing".to_string())),
    };
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(value.to_string()));
    }
    Ok(value)
}

/// Records a new valuation and re-derives the ROI.
///
/// Fails with [`Error::InvalidValue`] for negative or non-finite values. When the
/// investment has nothing invested the ROI is left as it was.
pub async fn update_current_value(
    db: &DatabaseConnection,
    investment_id: i64,
    new_value: f64,
) -> Result<investment::Model> {
    if !new_value.is_finite() || new_value < 0.0 {
        return Err(Error::InvalidValue {
            value: new_value.to_string(),
        });
    }

    let existing = Investment::find_by_id(investment_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Investment", investment_id))?;
    let roi = compute_roi(new_value, existing.amount_invested);

    let mut active: investment::ActiveModel = existing.into();
    active.current_value = Set(new_value);
    if let Some(roi) = roi {
        active.roi = Set(roi);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    info!(
        "Revalued investment_id {} to {:.2} (roi {:.2}%)",
        investment_id, updated.current_value, updated.roi
    );
    Ok(updated)
}

/// Live performance of the portfolio plus the capacity figures it is judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStats {
    /// Sum of current values of active investments
    pub total_value: f64,
    /// Sum of invested amounts of active investments
    pub total_invested: f64,
    /// `(total_value - total_invested) / total_invested * 100`, 0 when nothing is invested
    #[serde(rename = "actualROI")]
    pub actual_roi: f64,
    /// Invested-amount weighted average of expected return rates
    pub expected_return: f64,
    /// Same figure as `expected_return`; older clients read this name
    pub annual_return: f64,
    /// Number of active investments
    pub active_investments: u64,
    /// The capacity figures, see [`crate::core::capacity::CapacitySnapshot`]
    pub total_contributions: f64,
    /// Largest amount that may be committed
    pub investment_cap: f64,
    /// Contributions kept out of investments
    pub emergency_fund: f64,
    /// Cap in force, 0-100
    pub cap_percentage: f64,
    /// Counts investments of every status, unlike the figures above
    pub remaining_capacity: f64,
}

/// Totals over active investments.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveSummary {
    /// Sum of `current_value`
    pub total_value: f64,
    /// Sum of `amount_invested`
    pub total_invested: f64,
    /// Portfolio ROI in percent
    pub actual_roi: f64,
    /// Weighted by `amount_invested`
    pub expected_return: f64,
    /// Number of active investments
    pub count: u64,
}

/// Aggregates active investments only; sold, matured and under-performing ones are left out.
#[must_use]
pub fn summarize_active(investments: &[investment::Model]) -> ActiveSummary {
    let active: Vec<&investment::Model> = investments
        .iter()
        .filter(|inv| inv.status == InvestmentStatus::Active.as_str())
        .collect();

    let total_value: f64 = active.iter().map(|inv| inv.current_value).sum();
    let total_invested: f64 = active.iter().map(|inv| inv.amount_invested).sum();
    let mut summary = ActiveSummary {
        total_value,
        total_invested,
        count: active.len() as u64,
        ..ActiveSummary::default()
    };
    if total_invested > 0.0 {
        summary.actual_roi = (total_value - total_invested) / total_invested * 100.0;
        summary.expected_return = active
            .iter()
            .map(|inv| inv.amount_invested / total_invested * inv.expected_return_rate)
            .sum();
    }
    summary
}

/// Portfolio statistics over active investments with the current capacity figures.
pub async fn portfolio_stats(db: &DatabaseConnection) -> Result<PortfolioStats> {
    let investments = Investment::find().all(db).await?;
    let active = summarize_active(&investments);
    let capacity = CapacitySnapshot::load(db).await?;

    Ok(PortfolioStats {
        total_value: active.total_value,
        total_invested: active.total_invested,
        actual_roi: active.actual_roi,
        expected_return: active.expected_return,
        annual_return: active.expected_return,
        active_investments: active.count,
        total_contributions: capacity.total_contributions,
        investment_cap: capacity.investable_cap,
        emergency_fund: capacity.emergency_reserve,
        cap_percentage: capacity.cap_percentage,
        remaining_capacity: capacity.remaining,
    })
}
