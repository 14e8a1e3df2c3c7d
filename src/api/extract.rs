use crate::{
    api::AppState,
    core::user::{self, Actor},
    entities::user as user_entity,
    errors::Error,
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

/// The authenticated caller.
///
/// The token only names the user; role and status come from the row loaded for
/// this request, so a demotion or suspension applies to tokens already issued.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity and role used for policy checks
    pub actor: Actor,
    /// The freshly loaded row
    pub user: user_entity::Model,
}

fn bearer_token(parts: &Parts) -> Result<&str, Error> {
    let missing = || Error::Unauthorized {
        message: "Access denied. No token provided.".to_string(),
    };
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(missing)?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(missing)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.keys.verify(token)?;

        let found = user::get_user_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| Error::Unauthorized {
                message: "Invalid token.".to_string(),
            })?;
        let actor = Actor::from_model(&found)?;
        if !actor.status.can_sign_in() {
            debug!("Rejected token for user_id {} ({})", found.id, found.status);
            return Err(Error::Forbidden {
                action: "use a suspended or inactive account",
            });
        }

        Ok(Self {
            actor,
            user: found,
        })
    }
}
