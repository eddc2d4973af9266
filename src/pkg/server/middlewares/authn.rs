use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    conf::settings,
    pkg::{
        internal::{adaptors::admins::selectors::AdminSelector, auth},
        server::state::AppState,
    },
    prelude::{Error, Result},
};

/// Requires a valid admin bearer token; the resolved admin is attached as a
/// request extension for the handler.
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("Not authorized, no token".to_string()))?;
    let token = auth::bearer_token(header)?;
    let claims = auth::verify_token(token, &settings.jwt_secret)?;

    let admin = AdminSelector::new(&state.db_pool)
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| {
            tracing::warn!("token valid but admin {} no longer exists", claims.sub);
            Error::Unauthorized("Not authorized".to_string())
        })?;

    request.extensions_mut().insert(Arc::new(admin));
    Ok(next.run(request).await)
}
