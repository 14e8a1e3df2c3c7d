//! Contribution totals.
//!
//! Every figure is summed fresh from `completed` rows. Pending, approved and
//! rejected contributions never reach any total here or anything derived from it
//! (capacity, dashboard, charts).

use crate::{
    core::contribution::ContributionStatus,
    entities::{Contribution, contribution},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use sea_orm::{QuerySelect, Select, prelude::*};
use serde::Serialize;

/// Whose contributions to add up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionScope {
    /// Every member
    Family,
    /// A single user
    Member(i64),
}

/// One bucket of the monthly chart series.
///
/// Serialised as `{"month": "Jan", "monthNumber": 1, "year": 2024, "amount": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// Calendar year of the bucket
    pub year: i32,
    /// 1-12
    pub month_number: u32,
    /// Short month name, e.g. `"Jan"`
    #[serde(rename = "month")]
    pub label: String,
    /// Completed contributions created in that month
    pub amount: f64,
}

fn completed_in(scope: ContributionScope) -> Select<Contribution> {
    let query = Contribution::find()
        .filter(contribution::Column::Status.eq(ContributionStatus::Completed.as_str()));
    match scope {
        ContributionScope::Family => query,
        ContributionScope::Member(user_id) => {
            query.filter(contribution::Column::UserId.eq(user_id))
        }
    }
}

async fn sum_amounts<C>(db: &C, query: Select<Contribution>) -> Result<f64>
where
    C: ConnectionTrait,
{
    let amounts: Vec<f64> = query
        .select_only()
        .column(contribution::Column::Amount)
        .into_tuple()
        .all(db)
        .await?;
    Ok(amounts.iter().sum())
}

/// Sum of completed contributions in `scope`; 0 when there are none.
pub async fn total_completed<C>(db: &C, scope: ContributionScope) -> Result<f64>
where
    C: ConnectionTrait,
{
    sum_amounts(db, completed_in(scope)).await
}

/// Sum of completed contributions in `scope` created at or after `since`.
pub async fn completed_since<C>(
    db: &C,
    scope: ContributionScope,
    since: DateTime<Utc>,
) -> Result<f64>
where
    C: ConnectionTrait,
{
    sum_amounts(
        db,
        completed_in(scope).filter(contribution::Column::CreatedAt.gte(since)),
    )
    .await
}

/// Growth of the running total against the amount added since the cut-off.
///
/// This compares the whole cumulative total with only the recent slice, so it is
/// not a month-over-month delta and inflates as history accumulates. The figure
/// is kept as-is because existing clients display it.
#[must_use]
pub fn growth_percentage(total: f64, since_total: f64) -> i64 {
    if since_total > 0.0 {
        // Percentages of real money totals are far inside i64 range
        #[allow(clippy::cast_possible_truncation)]
        let growth = (((total - since_total) / since_total) * 100.0).round() as i64;
        growth
    } else {
        0
    }
}

/// The same instant one calendar month earlier.
#[must_use]
pub fn one_month_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(1))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// [`growth_percentage`] for `scope`, using one calendar month before `now` as the cut-off.
pub async fn growth_since<C>(db: &C, scope: ContributionScope, now: DateTime<Utc>) -> Result<i64>
where
    C: ConnectionTrait,
{
    let total = total_completed(db, scope).await?;
    let recent = completed_since(db, scope, one_month_before(now)).await?;
    Ok(growth_percentage(total, recent))
}

/// Number of distinct members with at least one completed contribution.
pub async fn paid_member_count<C>(db: &C) -> Result<u64>
where
    C: ConnectionTrait,
{
    let payers: Vec<i64> = completed_in(ContributionScope::Family)
        .select_only()
        .column(contribution::Column::UserId)
        .distinct()
        .into_tuple()
        .all(db)
        .await?;
    Ok(payers.len() as u64)
}

/// `(year, month)` shifted back by `offset` calendar months.
fn shift_month(year: i32, month: u32, offset: u32) -> (i32, u32) {
    let index = i64::from(year) * 12 + i64::from(month) - 1 - i64::from(offset);
    // Year stays within chrono's range for any offset a chart asks for
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let shifted = (index.div_euclid(12) as i32, index.rem_euclid(12) as u32 + 1);
    shifted
}

fn month_start(year: i32, month: u32) -> Result<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::validation(format!("Month out of range: {year}-{month:02}")))
}

/// Completed totals for each of the last `months_back` calendar months, oldest first.
///
/// The current month is the last entry. Months without contributions report 0, so
/// the result always has exactly `months_back` entries.
pub async fn monthly_time_series<C>(
    db: &C,
    months_back: u32,
    now: DateTime<Utc>,
) -> Result<Vec<MonthlyTotal>>
where
    C: ConnectionTrait,
{
    if months_back == 0 {
        return Ok(Vec::new());
    }

    let mut series = Vec::with_capacity(months_back as usize);
    for offset in (0..months_back).rev() {
        let (year, month) = shift_month(now.year(), now.month(), offset);
        let label = month_start(year, month)?.format("%b").to_string();
        series.push(MonthlyTotal {
            year,
            month_number: month,
            label,
            amount: 0.0,
        });
    }

    let (first_year, first_month) = shift_month(now.year(), now.month(), months_back - 1);
    let (next_year, next_month) = shift_month(now.year(), now.month() + 1, 0);
    let window_start = month_start(first_year, first_month)?;
    let window_end = month_start(next_year, next_month)?;

    let rows: Vec<(f64, DateTime<Utc>)> = completed_in(ContributionScope::Family)
        .filter(contribution::Column::CreatedAt.gte(window_start))
        .filter(contribution::Column::CreatedAt.lt(window_end))
        .select_only()
        .column(contribution::Column::Amount)
        .column(contribution::Column::CreatedAt)
        .into_tuple()
        .all(db)
        .await?;

    for (amount, created_at) in rows {
        if let Some(bucket) = series
            .iter_mut()
            .find(|b| b.year == created_at.year() && b.month_number == created_at.month())
        {
            bucket.amount += amount;
        }
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    #[test]
    fn test_growth_percentage() {
        assert_eq!(growth_percentage(1_000.0, 0.0), 0);
        assert_eq!(growth_percentage(1_500.0, 500.0), 200);
        assert_eq!(growth_percentage(500.0, 500.0), 0);
        assert_eq!(growth_percentage(1_000.0, 300.0), 233);
    }

    #[test]
    fn test_shift_month_crosses_years() {
        assert_eq!(shift_month(2024, 3, 0), (2024, 3));
        assert_eq!(shift_month(2024, 3, 2), (2024, 1));
        assert_eq!(shift_month(2024, 3, 3), (2023, 12));
        assert_eq!(shift_month(2024, 1, 13), (2022, 12));
    }

    #[test]
    fn test_one_month_before_clamps_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let since = one_month_before(now);
        assert_eq!((since.year(), since.month(), since.day()), (2024, 2, 29));
    }

    #[tokio::test]
    async fn test_only_completed_contributions_count() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "member@family.test").await?;
        let now = Utc::now();

        insert_test_contribution(&db, member.id, 100.0, "completed", now).await?;
        insert_test_contribution(&db, member.id, 200.0, "pending", now).await?;
        insert_test_contribution(&db, member.id, 400.0, "approved", now).await?;
        insert_test_contribution(&db, member.id, 800.0, "rejected", now).await?;

        assert_eq!(total_completed(&db, ContributionScope::Family).await?, 100.0);
        assert_eq!(
            total_completed(&db, ContributionScope::Member(member.id)).await?,
            100.0
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_totals_are_zero_without_rows() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(total_completed(&db, ContributionScope::Family).await?, 0.0);
        assert_eq!(
            growth_since(&db, ContributionScope::Family, Utc::now()).await?,
            0
        );
        assert_eq!(paid_member_count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_member_scope_and_growth() -> Result<()> {
        let db = setup_test_db().await?;
        let ada = create_test_member(&db, "ada@family.test").await?;
        let bo = create_test_member(&db, "bo@family.test").await?;
        let now = Utc::now();
        let old = now - chrono::Duration::days(90);

        insert_test_contribution(&db, ada.id, 1_000.0, "completed", old).await?;
        insert_test_contribution(&db, ada.id, 500.0, "completed", now).await?;
        insert_test_contribution(&db, bo.id, 250.0, "completed", old).await?;

        assert_eq!(
            total_completed(&db, ContributionScope::Member(ada.id)).await?,
            1_500.0
        );
        assert_eq!(
            total_completed(&db, ContributionScope::Family).await?,
            1_750.0
        );

        // (1500 - 500) / 500
        assert_eq!(
            growth_since(&db, ContributionScope::Member(ada.id), now).await?,
            200
        );
        // Nothing recent for bo
        assert_eq!(
            growth_since(&db, ContributionScope::Member(bo.id), now).await?,
            0
        );
        assert_eq!(paid_member_count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_series_has_fixed_length_when_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap();

        let series = monthly_time_series(&db, 6, now).await?;
        assert_eq!(series.len(), 6);
        assert!(series.iter().all(|m| m.amount == 0.0));

        let labels: Vec<&str> = series.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!((series[0].year, series[0].month_number), (2023, 9));
        assert_eq!((series[5].year, series[5].month_number), (2024, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_monthly_series_buckets_completed_amounts() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_member(&db, "member@family.test").await?;
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap();

        let in_january = Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap();
        let in_february = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let too_old = Utc.with_ymd_and_hms(2023, 8, 31, 23, 59, 0).unwrap();

        insert_test_contribution(&db, member.id, 100.0, "completed", in_january).await?;
        insert_test_contribution(&db, member.id, 50.0, "completed", in_january).await?;
        insert_test_contribution(&db, member.id, 70.0, "completed", in_february).await?;
        insert_test_contribution(&db, member.id, 999.0, "pending", in_february).await?;
        insert_test_contribution(&db, member.id, 999.0, "completed", too_old).await?;

        let series = monthly_time_series(&db, 6, now).await?;
        let amounts: Vec<f64> = series.iter().map(|m| m.amount).collect();
        assert_eq!(amounts, [0.0, 0.0, 0.0, 0.0, 150.0, 70.0]);
        Ok(())
    }
}
