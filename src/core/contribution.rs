//! Contribution business logic - submission, review and the status lifecycle.
//!
//! A contribution starts `pending`. An admin either rejects it or approves it, and
//! an approved contribution is later marked `completed` once the money has arrived.
//! `rejected` and `completed` are terminal. Family totals are always summed from the
//! current rows (see `core::aggregate`), so a status change needs no follow-up work.

use crate::{
    core::{
        optional_text, policy, require_text,
        user::{Actor, MemberSummary},
    },
    entities::{Contribution, User, contribution},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::{debug, info};

/// Where a contribution is in its review lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionStatus {
    /// Submitted by a member, not yet reviewed
    Pending,
    /// Accepted by an admin, awaiting settlement
    Approved,
    /// Money received; counts toward family totals
    Completed,
    /// Refused by an admin
    Rejected,
}

impl ContributionStatus {
    /// Every status, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Approved,
        Self::Completed,
        Self::Rejected,
    ];

    /// Persisted representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// No transition leaves a terminal status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// `pending -> approved | rejected`, `approved -> completed`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Completed)
        )
    }
}

impl FromStr for ContributionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidStatus {
                status: s.to_string(),
            })
    }
}

impl fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a requested transition. Both ends must already be parsed.
pub fn check_transition(from: ContributionStatus, to: ContributionStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

/// Input for a member submitting a contribution.
#[derive(Debug, Clone)]
pub struct NewContribution {
    /// Must be positive
    pub amount: f64,
    /// Free text such as `"bank_transfer"`; must not be blank
    pub payment_method: String,
    /// External payment reference; unique across contributions when present
    pub transaction_id: Option<String>,
    /// Optional member remark
    pub notes: Option<String>,
}

/// A contribution with the member who made it.
#[derive(Debug, Clone, Serialize)]
pub struct ContributionWithMember {
    /// The row, flattened into the JSON object
    #[serde(flatten)]
    pub contribution: contribution::Model,
    /// `None` once the member has been deleted
    pub user: Option<MemberSummary>,
}

impl From<(contribution::Model, Option<crate::entities::user::Model>)> for ContributionWithMember {
    fn from((contribution, user): (contribution::Model, Option<crate::entities::user::Model>)) -> Self {
        Self {
            contribution,
            user: user.as_ref().map(MemberSummary::from),
        }
    }
}

/// Records a new `pending` contribution for `user_id`.
///
/// The amount must be a positive finite number and a payment method is required.
/// A transaction id, when given, must not already be on file.
pub async fn create_contribution(
    db: &DatabaseConnection,
    user_id: i64,
    new_contribution: NewContribution,
) -> Result<contribution::Model> {
    let amount = new_contribution.amount;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::validation("Amount must be a positive number"));
    }
    let payment_method = require_text("Payment method", &new_contribution.payment_method)?;
    let transaction_id = optional_text(new_contribution.transaction_id);

    if let Some(reference) = &transaction_id {
        let duplicate = Contribution::find()
            .filter(contribution::Column::TransactionId.eq(reference.as_str()))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(Error::Conflict {
                message: "Transaction ID must be unique".to_string(),
            });
        }
    }

    let now = Utc::now();
    let model = contribution::ActiveModel {
        amount: Set(amount),
        status: Set(ContributionStatus::Pending.as_str().to_string()),
        payment_method: Set(payment_method),
        transaction_id: Set(transaction_id),
        notes: Set(optional_text(new_contribution.notes)),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(
        "Created contribution_id {} for user_id {}: amount={:.2}, method={}",
        created.id, user_id, created.amount, created.payment_method
    );
    Ok(created)
}

/// Retrieves a contribution by id.
pub async fn get_contribution_by_id(
    db: &DatabaseConnection,
    contribution_id: i64,
) -> Result<Option<contribution::Model>> {
    Contribution::find_by_id(contribution_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists contributions newest first, with the member attached.
///
/// `owner` restricts the list to one member; `status` to one lifecycle state.
pub async fn list_contributions(
    db: &DatabaseConnection,
    owner: Option<i64>,
    status: Option<ContributionStatus>,
) -> Result<Vec<ContributionWithMember>> {
    let mut query = Contribution::find();
    if let Some(user_id) = owner {
        query = query.filter(contribution::Column::UserId.eq(user_id));
    }
    if let Some(status) = status {
        query = query.filter(contribution::Column::Status.eq(status.as_str()));
    }

    let rows = query
        .find_also_related(User)
        .order_by_desc(contribution::Column::CreatedAt)
        .order_by_desc(contribution::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// The most recent completed contributions, for the activity feed.
pub async fn recent_completed(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<Vec<ContributionWithMember>> {
    let rows = Contribution::find()
        .filter(contribution::Column::Status.eq(ContributionStatus::Completed.as_str()))
        .find_also_related(User)
        .order_by_desc(contribution::Column::CreatedAt)
        .order_by_desc(contribution::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Counts contributions, optionally in a single status.
pub async fn count_contributions(
    db: &DatabaseConnection,
    status: Option<ContributionStatus>,
) -> Result<u64> {
    let mut query = Contribution::find();
    if let Some(status) = status {
        query = query.filter(contribution::Column::Status.eq(status.as_str()));
    }
    query.count(db).await.map_err(Into::into)
}

/// Moves a contribution to `target_status`.
///
/// An unknown target fails with [`Error::InvalidStatus`] before the row is looked up;
/// a known target that the lifecycle does not allow from the current status fails
/// with [`Error::InvalidTransition`]. The write only applies while the row still
/// holds the status the transition was checked against, so of two racing reviews
/// exactly one wins and the other gets [`Error::InvalidTransition`]. Callers must
/// have checked `policy::can_review_contributions` first.
pub async fn update_contribution_status(
    db: &DatabaseConnection,
    contribution_id: i64,
    target_status: &str,
) -> Result<contribution::Model> {
    let target: ContributionStatus = target_status.parse()?;

    let existing = get_contribution_by_id(db, contribution_id)
        .await?
        .ok_or_else(|| Error::not_found("Contribution", contribution_id))?;
    let current: ContributionStatus = existing.status.parse()?;
    check_transition(current, target)?;

    let result = Contribution::update_many()
        .col_expr(contribution::Column::Status, Expr::value(target.as_str()))
        .col_expr(contribution::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(contribution::Column::Id.eq(contribution_id))
        .filter(contribution::Column::Status.eq(current.as_str()))
        .exec(db)
        .await?;

    let updated = get_contribution_by_id(db, contribution_id)
        .await?
        .ok_or_else(|| Error::not_found("Contribution", contribution_id))?;
    if result.rows_affected == 0 {
        debug!(
            "Contribution_id {} changed to {} before {} could be applied",
            contribution_id, updated.status, target
        );
        return Err(Error::InvalidTransition {
            from: updated.status,
            to: target.to_string(),
        });
    }

    info!(
        "Contribution_id {} moved from {} to {}",
        contribution_id, current, target
    );
    Ok(updated)
}

/// Deletes a contribution if `policy::can_delete_contribution` allows it.
///
/// Members may only withdraw their own contributions that never counted toward
/// family totals; completed rows are removed by admins alone.
pub async fn delete_contribution(
    db: &DatabaseConnection,
    actor: &Actor,
    contribution_id: i64,
) -> Result<()> {
    let existing = get_contribution_by_id(db, contribution_id)
        .await?
        .ok_or_else(|| Error::not_found("Contribution", contribution_id))?;
    policy::require(
        policy::can_delete_contribution(actor, &existing),
        "delete this contribution",
    )?;

    existing.delete(db).await?;
    info!(
        "Deleted contribution_id {} (requested by user_id {})",
        contribution_id, actor.id
    );
    Ok(())
}
