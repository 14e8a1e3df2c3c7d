//! Core business logic - framework-agnostic ledger operations.
//!
//! Nothing in here knows about HTTP. Every function takes a database connection
//! (or transaction) and returns [`crate::errors::Result`], so the same rules back
//! the API handlers and the tests.

/// Declares a fieldless enum persisted as a string column.
///
/// Generates `ALL`, `as_str`, `FromStr` (unknown text is a validation error naming
/// `$what`) and `Display`.
macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($what:literal) {
            $($(#[$variant_meta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Persisted representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::Error;

            fn from_str(s: &str) -> crate::errors::Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| crate::errors::Error::validation(format!("Invalid {}: {s}", $what)))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Contribution totals, growth and monthly series
pub mod aggregate;
/// Announcements broadcast to the family
pub mod announcement;
/// Password hashing and bearer tokens
pub mod auth;
/// Investment capacity under the configured cap
pub mod capacity;
/// Contributions and their status lifecycle
pub mod contribution;
/// Aggregated dashboard view
pub mod dashboard;
/// Investment records
pub mod investment;
/// Who may do what
pub mod policy;
/// Key-value settings with typed accessors
pub mod settings;
/// Accounts, profiles and administration of users
pub mod user;
/// ROI and portfolio statistics
pub mod valuation;

use crate::errors::{Error, Result};

/// Trims `value` and rejects it if nothing is left.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Treats blank optional text as absent.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects NaN, infinities and negative amounts.
pub(crate) fn require_non_negative(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// Rounds to two decimal places, the precision money and percentages are reported with.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
