//! Authorization policy.
//!
//! Every role check in the service goes through this module so the rules live in
//! one place. Handlers call [`require`] with the outcome of one of the `can_*`
//! predicates; core functions that need the target row (e.g. deleting a
//! contribution) consult the same predicates themselves.

use crate::{
    core::{contribution::ContributionStatus, user::Actor},
    entities::contribution,
    errors::{Error, Result},
};

/// Turns a policy decision into `Ok(())` or [`Error::Forbidden`].
pub fn require(allowed: bool, action: &'static str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(Error::Forbidden { action })
    }
}

/// Approving, rejecting and completing contributions.
#[must_use]
pub const fn can_review_contributions(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Whether `actor` may see every member's contributions rather than only their own.
#[must_use]
pub const fn can_list_all_contributions(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Admins may delete any contribution. Owners may withdraw their own while it is
/// still `pending` or was `rejected`; approved and completed money stays on file.
#[must_use]
pub fn can_delete_contribution(actor: &Actor, target: &contribution::Model) -> bool {
    if actor.is_admin() {
        return true;
    }
    target.user_id == actor.id
        && matches!(
            target.status.parse::<ContributionStatus>(),
            Ok(ContributionStatus::Pending | ContributionStatus::Rejected)
        )
}

/// Creating investments and revaluing them.
#[must_use]
pub const fn can_manage_investments(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Reading and writing the settings table, including meeting details.
#[must_use]
pub const fn can_manage_settings(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Writing announcements and seeing hidden ones.
#[must_use]
pub const fn can_manage_announcements(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Creating, editing and deleting other users.
#[must_use]
pub const fn can_manage_users(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Pending approvals, registrations, monthly series and system health on the dashboard.
#[must_use]
pub const fn can_view_family_overview(actor: &Actor) -> bool {
    actor.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::{Role, UserStatus};
    use chrono::Utc;

    fn actor(id: i64, role: Role) -> Actor {
        Actor {
            id,
            role,
            status: UserStatus::Active,
        }
    }

    fn contribution_owned_by(user_id: i64, status: &str) -> contribution::Model {
        let now = Utc::now();
        contribution::Model {
            id: 1,
            amount: 100.0,
            status: status.to_string(),
            payment_method: "cash".to_string(),
            transaction_id: None,
            notes: None,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_admin_only_capabilities() {
        let admin = actor(1, Role::Admin);
        let member = actor(2, Role::Member);
        let guest = actor(3, Role::Guest);

        assert!(can_review_contributions(&admin));
        assert!(!can_review_contributions(&member));
        assert!(can_manage_investments(&admin));
        assert!(!can_manage_investments(&guest));
        assert!(!can_manage_settings(&member));
        assert!(!can_manage_users(&member));
        assert!(!can_view_family_overview(&guest));
    }

    #[test]
    fn test_contribution_deletion_by_owner_or_admin() {
        let own = contribution_owned_by(2, "pending");
        assert!(can_delete_contribution(&actor(2, Role::Member), &own));
        assert!(!can_delete_contribution(&actor(3, Role::Member), &own));
        assert!(can_delete_contribution(&actor(1, Role::Admin), &own));
    }

    #[test]
    fn test_owner_cannot_delete_counted_money() {
        let owner = actor(2, Role::Member);
        assert!(can_delete_contribution(&owner, &contribution_owned_by(2, "rejected")));
        assert!(!can_delete_contribution(&owner, &contribution_owned_by(2, "approved")));
        assert!(!can_delete_contribution(&owner, &contribution_owned_by(2, "completed")));
        assert!(can_delete_contribution(
            &actor(1, Role::Admin),
            &contribution_owned_by(2, "completed")
        ));
    }

    #[test]
    fn test_require_maps_denial_to_forbidden() {
        assert!(require(true, "anything").is_ok());
        assert!(matches!(
            require(false, "create investments"),
            Err(Error::Forbidden {
                action: "create investments"
            })
        ));
    }
}
