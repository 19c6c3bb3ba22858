//! Request extractors for sessions and owners.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use cloudfiles::perms::Session;
use cloudfiles::OwnerId;

use crate::error::ApiError;
use crate::state::AppState;

/// The session carried by the request's cookies. Never rejects: requests
/// without a valid cookie get a new anonymous session.
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok());

        Ok(CurrentSession(state.gate.session(headers)))
    }
}

/// The owner of an authorized session. Rejects with 401 before the handler
/// runs when the session is not authorized.
pub struct AuthorizedOwner(pub OwnerId);

impl FromRequestParts<AppState> for AuthorizedOwner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match CurrentSession::from_request_parts(parts, state).await {
            Ok(CurrentSession(session)) => session,
            Err(never) => match never {},
        };

        if !state.gate.check_authorized(&session) {
            return Err(ApiError::unauthorized());
        }

        state
            .gate
            .owner(&session)
            .map(AuthorizedOwner)
            .ok_or_else(ApiError::unauthorized)
    }
}
