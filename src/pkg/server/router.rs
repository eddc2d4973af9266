use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use super::handlers::{admin, applications, companies, probes, students};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;

    let admin_routes = Router::new()
        .route(
            "/profile",
            get(admin::profile)
                .layer(from_fn_with_state(state.clone(), authn::authenticate)),
        )
        .route("/register", post(admin::register))
        .route("/login", post(admin::login));

    let student_routes = Router::new()
        .route("/", post(students::create).get(students::list))
        .route("/stats", get(students::stats))
        .route("/company-selections", get(students::company_selections))
        .route("/status-distribution", get(students::status_distribution))
        .route("/usn/{usn}", get(students::get_by_usn))
        .route("/b-update", put(students::bulk_update))
        .route(
            "/{id}",
            get(students::get_by_id)
                .put(students::update)
                .delete(students::delete),
        );

    let company_routes = Router::new()
        .route("/", post(companies::create).get(companies::list))
        .route(
            "/{id}",
            get(companies::get_by_id)
                .put(companies::update)
                .delete(companies::delete),
        );

    let application_routes = Router::new()
        .route("/", post(applications::create).get(applications::list))
        .route(
            "/{id}",
            get(applications::get_by_id)
                .put(applications::update)
                .delete(applications::delete),
        );

    let app = Router::new()
        .route(
            "/",
            get(|| async { Json(json!({ "success": true, "message": "API is running" })) }),
        )
        .route("/healthz", get(probes::healthz))
        .route("/livez", get(probes::livez))
        .nest("/api/admin", admin_routes)
        .nest("/api/students", student_routes)
        .nest("/api/companies", company_routes)
        .nest("/api/applications", application_routes)
        .layer(CorsLayer::permissive())
        .with_state(state);

    Ok(app)
}
