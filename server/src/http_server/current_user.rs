use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use db::users::User;
use uuid::Uuid;

use super::errors::ApiError;
use crate::AppState;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_TOKEN: &str = "Invalid token.";

/// The authenticated caller. Rejects with 401 when there is no valid token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The caller if they sent a token. A token that is present but unknown still rejects.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

/// Reads `Authorization: Token <uuid>` (or `Bearer <uuid>`).
fn token_from_headers(headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    let Some(header) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| ApiError::AuthorizationRequired(INVALID_TOKEN))?;
    let token = value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .ok_or(ApiError::AuthorizationRequired(INVALID_TOKEN))?;

    Uuid::parse_str(token.trim())
        .map(Some)
        .map_err(|_| ApiError::AuthorizationRequired(INVALID_TOKEN))
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers)? else {
            return Ok(Self(None));
        };

        let user = state
            .store
            .user_by_token(token)
            .await?
            .ok_or(ApiError::AuthorizationRequired(INVALID_TOKEN))?;

        Ok(Self(Some(user)))
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;

        user.map(Self)
            .ok_or(ApiError::AuthorizationRequired(MISSING_CREDENTIALS))
    }
}
