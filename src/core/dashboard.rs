//! The dashboard view: a per-user summary with a family overview for admins.

use crate::{
    core::{
        aggregate::{self, ContributionScope, MonthlyTotal},
        contribution::{self, ContributionStatus},
        policy,
        settings::{MeetingSettings, NextMeeting},
        user::{self, Actor, UserProfile},
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::time::Duration;

/// Months shown in the contribution chart.
pub const CHART_MONTHS: u32 = 6;
const RECENT_ACTIVITY_LIMIT: u64 = 5;
const RECENT_REGISTRATIONS_LIMIT: u64 = 3;

/// Request-independent inputs to [`build_dashboard`].
#[derive(Debug, Clone, Copy)]
pub struct DashboardContext<'a> {
    /// Clock reading shared by every figure on the page
    pub now: DateTime<Utc>,
    /// Currency code used in activity messages
    pub currency: &'a str,
    /// How long the service has been running
    pub uptime: Duration,
}

/// A line in the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    /// Id of the completed contribution behind the entry
    pub id: i64,
    /// e.g. "Ada Byron contributed RWF 5,000"
    pub message: String,
    /// When the contribution was submitted
    pub timestamp: DateTime<Utc>,
    /// Always `"contribution"` for now
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Liveness summary shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    /// `"connected"` once the dashboard queries have succeeded
    pub database: &'static str,
    /// `"active"` whenever a response is produced
    pub api: &'static str,
    /// Seconds since the process started
    pub uptime_seconds: u64,
}

/// Everything the dashboard page shows.
///
/// Admin-only fields are zero or empty for everybody else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Caller's completed contributions, all time
    pub my_contributions: f64,
    /// Caller figure from [`crate::core::aggregate::growth_since`]
    pub my_contributions_growth: i64,
    /// Family-wide completed contributions, all time
    pub family_fund: f64,
    /// Family-wide figure from [`crate::core::aggregate::growth_since`]
    pub family_fund_growth: i64,
    /// Active users
    pub total_members: u64,
    /// Members with at least one completed contribution
    pub paid_count: u64,
    /// `paid_count` as a whole percentage of `total_members`
    pub payment_progress: i64,
    /// `None` when no meeting date is set
    pub next_meeting: Option<NextMeeting>,
    /// Newest completed contributions
    pub recent_activity: Vec<ActivityItem>,
    /// Admin only: contributions awaiting review
    pub pending_approvals: u64,
    /// Admin only: contribution rows of every status
    pub total_contributions: u64,
    /// Admin only: newest accounts
    pub recent_registrations: Vec<UserProfile>,
    /// Admin only: completed amounts for the last [`CHART_MONTHS`] months, oldest first
    pub contribution_data: Vec<MonthlyTotal>,
    /// Admin only
    pub system_health: Option<SystemHealth>,
}

/// Formats an amount with thousands separators, keeping cents only when present.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let cents_total = (amount.abs() * 100.0).round();
    // Display only; amounts beyond u64 cents are not money this service handles
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents_total = cents_total as u64;
    let (whole, cents) = (cents_total / 100, cents_total % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents_total > 0 { "-" } else { "" };
    if cents == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{cents:02}")
    }
}

/// Whole percentage of members who have paid; 0 when there are no members.
#[must_use]
pub fn payment_progress(paid_count: u64, total_members: u64) -> i64 {
    if total_members == 0 {
        return 0;
    }
    // Both counts are row counts, far below f64's exact integer range
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let progress = (paid_count as f64 / total_members as f64 * 100.0).round() as i64;
    progress
}

/// Builds the dashboard for `actor`.
pub async fn build_dashboard(
    db: &DatabaseConnection,
    actor: &Actor,
    ctx: DashboardContext<'_>,
) -> Result<Dashboard> {
    let mine = ContributionScope::Member(actor.id);
    let my_contributions = aggregate::total_completed(db, mine).await?;
    let my_contributions_growth = aggregate::growth_since(db, mine, ctx.now).await?;
    let family_fund = aggregate::total_completed(db, ContributionScope::Family).await?;
    let family_fund_growth =
        aggregate::growth_since(db, ContributionScope::Family, ctx.now).await?;

    let total_members = user::count_active_users(db).await?;
    let paid_count = aggregate::paid_member_count(db).await?;
    let next_meeting = MeetingSettings::load(db).await?.next_meeting();

    let recent_activity = contribution::recent_completed(db, RECENT_ACTIVITY_LIMIT)
        .await?
        .into_iter()
        .map(|row| {
            let who = row.user.as_ref().map_or_else(
                || "A former member".to_string(),
                |u| format!("{} {}", u.first_name, u.last_name),
            );
            ActivityItem {
                id: row.contribution.id,
                message: format!(
                    "{who} contributed {} {}",
                    ctx.currency,
                    format_amount(row.contribution.amount)
                ),
                timestamp: row.contribution.created_at,
                kind: "contribution",
            }
        })
        .collect();

    let mut dashboard = Dashboard {
        my_contributions,
        my_contributions_growth,
        family_fund,
        family_fund_growth,
        total_members,
        paid_count,
        payment_progress: payment_progress(paid_count, total_members),
        next_meeting,
        recent_activity,
        pending_approvals: 0,
        total_contributions: 0,
        recent_registrations: Vec::new(),
        contribution_data: Vec::new(),
        system_health: None,
    };

    if policy::can_view_family_overview(actor) {
        dashboard.pending_approvals =
            contribution::count_contributions(db, Some(ContributionStatus::Pending)).await?;
        dashboard.total_contributions = contribution::count_contributions(db, None).await?;
        dashboard.recent_registrations = user::recent_registrations(db, RECENT_REGISTRATIONS_LIMIT)
            .await?
            .iter()
            .map(UserProfile::from)
            .collect();
        dashboard.contribution_data =
            aggregate::monthly_time_series(db, CHART_MONTHS, ctx.now).await?;
        dashboard.system_health = Some(SystemHealth {
            database: "connected",
            api: "active",
            uptime_seconds: ctx.uptime.as_secs(),
        });
    }

    Ok(dashboard)
}
