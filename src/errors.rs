//! Unified error type for the family fund service.
//!
//! Every core operation returns [`Result`]; the HTTP layer maps each variant to a
//! status code in `api::response`.

use thiserror::Error;

/// Every failure a core operation or handler can report
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or out-of-range input
    #[error("{message}")]
    Validation {
        /// Shown to the client as-is
        message: String,
    },

    /// A new investment would push committed capital past the cap
    #[error(
        "Investment amount ({requested}) exceeds available capacity. Only {remaining} remaining within the {cap_percentage}% cap."
    )]
    CapacityExceeded {
        /// Amount the caller tried to invest
        requested: f64,
        /// Cap in force, 0-100
        cap_percentage: f64,
        /// Headroom left under the cap
        remaining: f64,
    },

    /// A status string outside the known set
    #[error("Invalid status value: {status}")]
    InvalidStatus {
        /// The rejected input
        status: String,
    },

    /// A known status the lifecycle does not allow from the current one
    #[error("Cannot move a contribution from '{from}' to '{to}'")]
    InvalidTransition {
        /// Status the row holds
        from: String,
        /// Status that was requested
        to: String,
    },

    /// A missing or non-numeric valuation
    #[error("Invalid or missing value: {value}")]
    InvalidValue {
        /// The rejected input, rendered as text
        value: String,
    },

    /// No row with the given id or key
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of row, e.g. `"Contribution"`
        entity: &'static str,
        /// Id or setting key that was looked up
        id: String,
    },

    /// Missing, bad or expired credentials
    #[error("{message}")]
    Unauthorized {
        /// Shown to the client as-is
        message: String,
    },

    /// Authenticated, but the role does not allow the action
    #[error("Access denied: not permitted to {action}")]
    Forbidden {
        /// What the caller tried to do, e.g. `"manage users"`
        action: &'static str,
    },

    /// Attempt to delete one of the essential settings
    #[error("Cannot delete essential setting '{key}'")]
    ProtectedKey {
        /// The essential key
        key: String,
    },

    /// Duplicate email, transaction id or setting key
    #[error("{message}")]
    Conflict {
        /// Shown to the client as-is
        message: String,
    },

    /// Invalid or missing configuration at startup
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// Any SeaORM failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A response body failed to serialise
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bearer token could not be issued or verified
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Argon2 failure or a lost hashing task
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Underlying error text
        message: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] keyed by a numeric id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<password_hash::Error> for Error {
    fn from(value: password_hash::Error) -> Self {
        Self::PasswordHash {
            message: value.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
