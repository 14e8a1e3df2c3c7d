//! Family-wide settings.
//!
//! Values live in the `settings` table as strings keyed by name. Calculations never
//! read raw strings: they go through [`FundSettings`] and [`MeetingSettings`], which
//! parse once and fall back to documented defaults.

use crate::{
    entities::{Setting, setting},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Title of the next meeting; blank falls back to [`DEFAULT_MEETING_TITLE`]
pub const NEXT_MEETING_TITLE: &str = "nextMeetingTitle";
/// Meeting date as `YYYY-MM-DD`; blank means no meeting is scheduled
pub const NEXT_MEETING_DATE: &str = "nextMeetingDate";
/// Meeting time as `HH:MM`
pub const NEXT_MEETING_TIME: &str = "nextMeetingTime";
/// Free-text meeting place
pub const NEXT_MEETING_LOCATION: &str = "nextMeetingLocation";
/// Free-text agenda; the only meeting key that may be deleted
pub const NEXT_MEETING_AGENDA: &str = "nextMeetingAgenda";
/// Expected monthly amount per member, as a decimal string
pub const MONTHLY_CONTRIBUTION: &str = "monthlyContribution";
/// Display name of the family
pub const FAMILY_NAME: &str = "familyName";
/// Investment cap as a percentage of completed contributions, 0-100
pub const MAX_INVESTMENT_PERCENTAGE: &str = "maxInvestmentPercentage";

/// Keys that can be edited but never deleted.
pub const ESSENTIAL_KEYS: [&str; 6] = [
    NEXT_MEETING_TITLE,
    NEXT_MEETING_DATE,
    NEXT_MEETING_TIME,
    NEXT_MEETING_LOCATION,
    MONTHLY_CONTRIBUTION,
    FAMILY_NAME,
];

/// Share of completed contributions that may be invested when no valid value is stored.
pub const DEFAULT_CAP_PERCENTAGE: f64 = 83.0;
/// Shown when the meeting title setting is blank
pub const DEFAULT_MEETING_TITLE: &str = "Family Meeting";
/// Shown when the meeting time setting is blank
pub const DEFAULT_MEETING_TIME: &str = "15:00";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A row written by [`seed_default_settings`] when its key is missing.
#[derive(Debug, Clone, Copy)]
pub struct DefaultSetting {
    /// Setting key
    pub key: &'static str,
    /// Initial value; may be blank
    pub value: &'static str,
    /// Human-readable purpose
    pub description: &'static str,
}

/// Seeded on startup; existing rows are never overwritten
pub const DEFAULT_SETTINGS: [DefaultSetting; 8] = [
    DefaultSetting {
        key: NEXT_MEETING_TITLE,
        value: "",
        description: "Title of the next family meeting",
    },
    DefaultSetting {
        key: NEXT_MEETING_DATE,
        value: "",
        description: "Date of the next family meeting",
    },
    DefaultSetting {
        key: NEXT_MEETING_TIME,
        value: "",
        description: "Time of the next family meeting",
    },
    DefaultSetting {
        key: NEXT_MEETING_LOCATION,
        value: "",
        description: "Location of the next family meeting",
    },
    DefaultSetting {
        key: NEXT_MEETING_AGENDA,
        value: "",
        description: "Agenda for the next family meeting",
    },
    DefaultSetting {
        key: MONTHLY_CONTRIBUTION,
        value: "0",
        description: "Monthly contribution amount",
    },
    DefaultSetting {
        key: FAMILY_NAME,
        value: "Our Family",
        description: "Family name",
    },
    DefaultSetting {
        key: MAX_INVESTMENT_PERCENTAGE,
        value: "83",
        description: "Maximum percentage of contributions that can be invested",
    },
];

/// Whether `key` is protected from deletion.
#[must_use]
pub fn is_essential(key: &str) -> bool {
    ESSENTIAL_KEYS.contains(&key)
}

/// Parses a stored cap percentage, falling back to [`DEFAULT_CAP_PERCENTAGE`].
///
/// Absent, unparseable, non-finite and out-of-range values all fall back.
#[must_use]
pub fn parse_cap_percentage(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|pct| pct.is_finite() && (0.0..=100.0).contains(pct))
        .unwrap_or(DEFAULT_CAP_PERCENTAGE)
}

/// Strict check applied when a cap percentage is written.
fn validate_cap_percentage(value: &str) -> Result<()> {
    match value.trim().parse::<f64>() {
        Ok(pct) if pct.is_finite() && (0.0..=100.0).contains(&pct) => Ok(()),
        _ => Err(Error::validation(format!(
            "{MAX_INVESTMENT_PERCENTAGE} must be a number between 0 and 100"
        ))),
    }
}

fn validate_value(key: &str, value: &str) -> Result<()> {
    match key {
        MAX_INVESTMENT_PERCENTAGE => validate_cap_percentage(value),
        NEXT_MEETING_DATE if !value.trim().is_empty() => parse_meeting_date(value).map(|_| ()),
        NEXT_MEETING_TIME if !value.trim().is_empty() => parse_meeting_time(value).map(|_| ()),
        _ => Ok(()),
    }
}

fn parse_meeting_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation(format!("Meeting date must be YYYY-MM-DD, got '{value}'")))
}

fn parse_meeting_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| Error::validation(format!("Meeting time must be HH:MM, got '{value}'")))
}

/// Looks up a setting row by key.
pub async fn get_setting<C>(db: &C, key: &str) -> Result<Option<setting::Model>>
where
    C: ConnectionTrait,
{
    Setting::find()
        .filter(setting::Column::Key.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// The raw value stored under `key`, if any.
pub async fn get_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    Ok(get_setting(db, key).await?.map(|s| s.value))
}

/// All settings ordered by key.
pub async fn list_settings(db: &DatabaseConnection) -> Result<Vec<setting::Model>> {
    Setting::find()
        .order_by_asc(setting::Column::Key)
        .all(db)
        .await
        .map_err(Into::into)
}

/// A setting as listed in the keyed map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingEntry {
    /// Row id
    pub id: i64,
    /// Raw stored value
    pub value: String,
    /// Human-readable purpose
    pub description: Option<String>,
}

/// Settings keyed by name.
#[must_use]
pub fn settings_by_key(settings: Vec<setting::Model>) -> BTreeMap<String, SettingEntry> {
    settings
        .into_iter()
        .map(|s| {
            (
                s.key,
                SettingEntry {
                    id: s.id,
                    value: s.value,
                    description: s.description,
                },
            )
        })
        .collect()
}

/// Inserts or updates `key`.
///
/// A new row without a description gets a placeholder; an existing row keeps its
/// description unless a new one is given.
pub async fn set_setting<C>(
    db: &C,
    key: &str,
    value: &str,
    description: Option<String>,
) -> Result<setting::Model>
where
    C: ConnectionTrait,
{
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::validation("Setting key is required"));
    }
    validate_value(key, value)?;

    let now = Utc::now();
    let saved = if let Some(existing) = get_setting(db, key).await? {
        let mut active: setting::ActiveModel = existing.into();
        active.value = Set(value.to_string());
        if let Some(description) = description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            description: Set(Some(
                description.unwrap_or_else(|| format!("Setting for {key}")),
            )),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    info!("Setting {} = {:?}", saved.key, saved.value);
    Ok(saved)
}

/// Creates a new setting. Key and value are both required and the key must be new.
pub async fn create_setting(
    db: &DatabaseConnection,
    key: &str,
    value: &str,
    description: Option<String>,
) -> Result<setting::Model> {
    if key.trim().is_empty() || value.is_empty() {
        return Err(Error::validation("Key and value are required"));
    }
    if get_setting(db, key.trim()).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Setting with key '{}' already exists", key.trim()),
        });
    }
    set_setting(db, key, value, description).await
}

/// Updates an existing setting.
pub async fn update_setting(
    db: &DatabaseConnection,
    key: &str,
    value: &str,
    description: Option<String>,
) -> Result<setting::Model> {
    if get_setting(db, key).await?.is_none() {
        return Err(Error::NotFound {
            entity: "Setting",
            id: key.to_string(),
        });
    }
    set_setting(db, key, value, description).await
}

/// Deletes a non-essential setting.
pub async fn delete_setting(db: &DatabaseConnection, key: &str) -> Result<()> {
    if is_essential(key) {
        return Err(Error::ProtectedKey {
            key: key.to_string(),
        });
    }

    let existing = get_setting(db, key).await?.ok_or_else(|| Error::NotFound {
        entity: "Setting",
        id: key.to_string(),
    })?;
    existing.delete(db).await?;
    info!("Deleted setting {}", key);
    Ok(())
}

/// Writes every entry of [`DEFAULT_SETTINGS`] whose key is absent.
///
/// Existing values are never touched. Returns how many rows were created.
pub async fn seed_default_settings(db: &DatabaseConnection) -> Result<usize> {
    let mut created = 0;
    for default in DEFAULT_SETTINGS {
        if get_setting(db, default.key).await?.is_some() {
            continue;
        }
        set_setting(
            db,
            default.key,
            default.value,
            Some(default.description.to_string()),
        )
        .await?;
        created += 1;
    }

    if created > 0 {
        info!("Seeded {} default settings", created);
    } else {
        debug!("Default settings already present");
    }
    Ok(created)
}

/// Money-related settings, parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundSettings {
    /// Display name of the family; blank when unset
    pub family_name: String,
    /// Expected contribution per member per month; 0 when unset or unparseable
    pub monthly_contribution: f64,
    /// Investable share of completed contributions, 0-100
    pub cap_percentage: f64,
}

impl FundSettings {
    /// Reads and parses the fund settings, applying defaults for anything missing.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        let family_name = get_value(db, FAMILY_NAME)
            .await?
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Our Family".to_string());
        let monthly_contribution = get_value(db, MONTHLY_CONTRIBUTION)
            .await?
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|amount| amount.is_finite() && *amount >= 0.0)
            .unwrap_or(0.0);
        let cap_percentage =
            parse_cap_percentage(get_value(db, MAX_INVESTMENT_PERCENTAGE).await?.as_deref());

        Ok(Self {
            family_name,
            monthly_contribution,
            cap_percentage,
        })
    }
}

/// The raw meeting fields. Blank strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSettings {
    /// Meeting title
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, 24-hour
    pub time: String,
    /// Where the family meets
    pub location: String,
    /// What will be discussed
    pub agenda: String,
}

/// A scheduled meeting, derived from [`MeetingSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextMeeting {
    /// Stored title, or [`DEFAULT_MEETING_TITLE`]
    pub title: String,
    /// Parsed meeting date
    pub date: NaiveDate,
    /// Stored time, or [`DEFAULT_MEETING_TIME`]
    pub time: String,
    /// `date` and `time` combined
    pub starts_at: NaiveDateTime,
    /// `None` when blank
    pub location: Option<String>,
    /// `None` when blank
    pub agenda: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl MeetingSettings {
    /// Reads the meeting keys; missing keys read as blank.
    pub async fn load<C>(db: &C) -> Result<Self>
    where
        C: ConnectionTrait,
    {
        Ok(Self {
            title: get_value(db, NEXT_MEETING_TITLE).await?.unwrap_or_default(),
            date: get_value(db, NEXT_MEETING_DATE).await?.unwrap_or_default(),
            time: get_value(db, NEXT_MEETING_TIME).await?.unwrap_or_default(),
            location: get_value(db, NEXT_MEETING_LOCATION)
                .await?
                .unwrap_or_default(),
            agenda: get_value(db, NEXT_MEETING_AGENDA).await?.unwrap_or_default(),
        })
    }

    /// The scheduled meeting, or `None` when no valid date is set.
    ///
    /// A blank or malformed time falls back to [`DEFAULT_MEETING_TIME`].
    #[must_use]
    pub fn next_meeting(&self) -> Option<NextMeeting> {
        let date = parse_meeting_date(&self.date).ok()?;
        let (time, clock) = match parse_meeting_time(&self.time) {
            Ok(clock) => (self.time.trim().to_string(), clock),
            Err(_) => (
                DEFAULT_MEETING_TIME.to_string(),
                NaiveTime::from_hms_opt(15, 0, 0)?,
            ),
        };

        Some(NextMeeting {
            title: non_blank(&self.title).unwrap_or_else(|| DEFAULT_MEETING_TITLE.to_string()),
            date,
            time,
            starts_at: date.and_time(clock),
            location: non_blank(&self.location),
            agenda: non_blank(&self.agenda),
        })
    }
}

/// Partial update of the meeting fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct MeetingUpdate {
    /// New title
    pub title: Option<String>,
    /// `YYYY-MM-DD`, or blank to clear
    pub date: Option<String>,
    /// `HH:MM`, or blank to clear
    pub time: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New agenda
    pub agenda: Option<String>,
}

/// Applies a [`MeetingUpdate`] atomically and returns the resulting fields.
pub async fn update_meeting(
    db: &DatabaseConnection,
    update: MeetingUpdate,
) -> Result<MeetingSettings> {
    let fields = [
        (NEXT_MEETING_TITLE, update.title),
        (NEXT_MEETING_DATE, update.date),
        (NEXT_MEETING_TIME, update.time),
        (NEXT_MEETING_LOCATION, update.location),
        (NEXT_MEETING_AGENDA, update.agenda),
    ];

    let txn = db.begin().await?;
    for (key, value) in fields {
        if let Some(value) = value {
            set_setting(&txn, key, value.trim(), None).await?;
        }
    }
    let meeting = MeetingSettings::load(&txn).await?;
    txn.commit().await?;
    Ok(meeting)
}
