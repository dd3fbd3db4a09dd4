//! Session gate for routes that act on behalf of a user

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use uuid::Uuid;

use crate::{error::SimulatorError, state::AppState};

/// Identity resolved from the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub external: bool,
}

/// Reject requests without a valid `Authorization: Bearer` session and
/// expose the [`CurrentUser`] to handlers through request extensions
pub async fn require_session(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, SimulatorError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(SimulatorError::Unauthorized)?;
    let claims = state.sessions.validate(bearer.token())?;

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        external: claims.external,
    });

    Ok(next.run(req).await)
}
