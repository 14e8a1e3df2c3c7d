//! Announcements broadcast by admins to the family.

use crate::{
    core::{
        policy, require_text,
        user::{Actor, MemberSummary},
    },
    entities::{Announcement, User, announcement, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use tracing::info;

stored_enum! {
    /// How prominently an announcement is shown.
    #[derive(Default)]
    pub enum Priority("priority") {
        Low => "low",
        #[default]
        Normal => "normal",
        Medium => "medium",
        High => "high",
    }
}

/// Input for a new announcement.
#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    /// Must not be blank
    pub title: String,
    /// Body text; must not be blank
    pub content: String,
    /// Defaults to `normal` at the route
    pub priority: Priority,
    /// Hidden announcements are listed to admins only
    pub is_visible: bool,
}

/// Partial edit; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementUpdate {
    /// New title
    pub title: Option<String>,
    /// New body text
    pub content: Option<String>,
    /// New priority
    pub priority: Option<Priority>,
    /// Show or hide for members
    pub is_visible: Option<bool>,
}

/// An announcement with its author.
#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementWithAuthor {
    /// The row, flattened into the JSON object
    #[serde(flatten)]
    pub announcement: announcement::Model,
    /// `None` once the author has been deleted
    pub author: Option<MemberSummary>,
}

impl From<(announcement::Model, Option<user::Model>)> for AnnouncementWithAuthor {
    fn from((announcement, author): (announcement::Model, Option<user::Model>)) -> Self {
        Self {
            announcement,
            author: author.as_ref().map(MemberSummary::from),
        }
    }
}

/// Publishes an announcement written by `author_id`.
pub async fn create_announcement(
    db: &DatabaseConnection,
    author_id: i64,
    new_announcement: NewAnnouncement,
) -> Result<announcement::Model> {
    let now = Utc::now();
    let created = announcement::ActiveModel {
        title: Set(require_text("Title", &new_announcement.title)?),
        content: Set(require_text("Content", &new_announcement.content)?),
        priority: Set(new_announcement.priority.as_str().to_string()),
        is_visible: Set(new_announcement.is_visible),
        author_id: Set(author_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        "Created announcement_id {} '{}' ({})",
        created.id, created.title, created.priority
    );
    Ok(created)
}

/// Announcements visible to `actor`, newest first.
pub async fn list_announcements(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<AnnouncementWithAuthor>> {
    let mut query = Announcement::find();
    if !policy::can_manage_announcements(actor) {
        query = query.filter(announcement::Column::IsVisible.eq(true));
    }

    let rows = query
        .find_also_related(User)
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

async fn require_announcement(
    db: &DatabaseConnection,
    announcement_id: i64,
) -> Result<announcement::Model> {
    Announcement::find_by_id(announcement_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Announcement", announcement_id))
}

/// Edits an announcement.
pub async fn update_announcement(
    db: &DatabaseConnection,
    announcement_id: i64,
    update: AnnouncementUpdate,
) -> Result<announcement::Model> {
    let existing = require_announcement(db, announcement_id).await?;

    let mut active: announcement::ActiveModel = existing.into();
    if let Some(title) = update.title {
        active.title = Set(require_text("Title", &title)?);
    }
    if let Some(content) = update.content {
        active.content = Set(require_text("Content", &content)?);
    }
    if let Some(priority) = update.priority {
        active.priority = Set(priority.as_str().to_string());
    }
    if let Some(is_visible) = update.is_visible {
        active.is_visible = Set(is_visible);
    }
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Shows or hides an announcement.
pub async fn set_visibility(
    db: &DatabaseConnection,
    announcement_id: i64,
    is_visible: bool,
) -> Result<announcement::Model> {
    update_announcement(
        db,
        announcement_id,
        AnnouncementUpdate {
            is_visible: Some(is_visible),
            ..AnnouncementUpdate::default()
        },
    )
    .await
}

/// Deletes an announcement.
pub async fn delete_announcement(db: &DatabaseConnection, announcement_id: i64) -> Result<()> {
    let existing = require_announcement(db, announcement_id).await?;
    existing.delete(db).await?;
    info!("Deleted announcement_id {}", announcement_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn notice(title: &str, is_visible: bool) -> NewAnnouncement {
        NewAnnouncement {
            title: title.to_string(),
            content: "Bring the receipts".to_string(),
            priority: Priority::default(),
            is_visible,
        }
    }

    #[tokio::test]
    async fn test_hidden_announcements_only_for_admins() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        let member = create_test_member(&db, "member@family.test").await?;

        create_announcement(&db, admin.id, notice("Public", true)).await?;
        create_announcement(&db, admin.id, notice("Draft", false)).await?;

        let for_admin = list_announcements(&db, &actor_for(&admin)?).await?;
        assert_eq!(for_admin.len(), 2);

        let for_member = list_announcements(&db, &actor_for(&member)?).await?;
        assert_eq!(for_member.len(), 1);
        assert_eq!(for_member[0].announcement.title, "Public");
        assert_eq!(for_member[0].author.as_ref().unwrap().id, admin.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_visibility_toggle_and_update() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;
        let created = create_announcement(&db, admin.id, notice("Draft", false)).await?;
        assert_eq!(created.priority, "normal");

        let shown = set_visibility(&db, created.id, true).await?;
        assert!(shown.is_visible);

        let edited = update_announcement(
            &db,
            created.id,
            AnnouncementUpdate {
                priority: Some(Priority::High),
                ..AnnouncementUpdate::default()
            },
        )
        .await?;
        assert_eq!(edited.priority, "high");
        assert_eq!(edited.title, "Draft");
        Ok(())
    }

    #[tokio::test]
    async fn test_validation_and_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "admin@family.test").await?;

        let blank = create_announcement(&db, admin.id, notice("  ", true)).await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        assert!(matches!(
            delete_announcement(&db, 42).await,
            Err(Error::NotFound { .. })
        ));
        assert!("urgent".parse::<Priority>().is_err());
        Ok(())
    }
}
