use crate::errors::Error;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use tracing::error;

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidValue { .. }
            | Self::CapacityExceeded { .. }
            | Self::ProtectedKey { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Serialization(_)
            | Self::PasswordHash { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else if let Self::Token(_) = &self {
            "Invalid or expired token".to_string()
        } else {
            self.to_string()
        };

        let mut body = json!({ "success": false, "error": message });
        if let Self::CapacityExceeded {
            requested,
            cap_percentage,
            remaining,
        } = self
        {
            body["requested"] = json!(requested);
            body["capPercentage"] = json!(cap_percentage);
            body["remaining"] = json!(remaining);
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// `Path` extractor whose rejections use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

/// `Query` extractor whose rejections use the error envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

/// Builds `{"success": true, ...fields}` from a JSON object.
///
/// Anything other than an object is placed under `"data"`.
#[must_use]
pub fn success(fields: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    match fields {
        Value::Object(map) => body.extend(map),
        other => {
            body.insert("data".to_string(), other);
        }
    }
    Json(Value::Object(body))
}

/// Handler result type.
pub type ApiResult<T = Json<Value>> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidTransition {
                from: "rejected".to_string(),
                to: "completed".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::ProtectedKey {
                key: "familyName".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Forbidden { action: "x" }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::Database(sea_orm::DbErr::Custom("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_success_merges_fields() {
        let Json(body) = success(json!({ "count": 2 }));
        assert_eq!(body, json!({ "success": true, "count": 2 }));

        let Json(wrapped) = success(json!([1, 2]));
        assert_eq!(wrapped, json!({ "success": true, "data": [1, 2] }));
    }
}
