use std::sync::Arc;

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    conf::settings,
    pkg::{
        internal::{
            adaptors::admins::{
                mutators::AdminMutator,
                selectors::AdminSelector,
                spec::{AdminEntry, LoginInput, RegisterAdminInput},
            },
            auth,
        },
        server::state::AppState,
    },
    prelude::{Error, Result},
};

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterAdminInput>,
) -> Result<impl IntoResponse> {
    input.validate()?;
    let selector = AdminSelector::new(&state.db_pool);
    if selector.get_by_email(&input.email).await?.is_some() {
        return Err(Error::Validation("Admin already exists".to_string()));
    }
    let admin = AdminMutator::new(&state.db_pool).create(input).await?;
    tracing::info!("registered admin {}", admin.email);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Admin registered successfully",
            "data": admin,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse> {
    let admin = AdminSelector::new(&state.db_pool)
        .get_by_email(&input.email)
        .await?
        .filter(|admin| auth::verify_password(&input.password, &admin.password))
        .ok_or_else(|| Error::Validation("Invalid email or password".to_string()))?;

    let token = auth::generate_token(admin.id, &settings.jwt_secret, settings.jwt_expiry_days)?;
    tracing::info!("admin {} logged in", admin.email);
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "admin": admin,
    })))
}

pub async fn profile(
    Extension(admin): Extension<Arc<AdminEntry>>,
) -> Result<impl IntoResponse> {
    Ok(Json(json!({ "success": true, "data": &*admin })))
}
