//! Route table

use crate::server::handlers::{
    auth_callback, create_submission, get_submission, healthcheck, list_submissions,
    request_auth_code, update_submission,
};
use crate::server::host::AppState;
use axum::{Router, routing::get};

/// Build the versioned API routes
///
/// - GET /healthcheck - Liveness probe
/// - GET /submissions - List submissions (admin)
/// - POST /submissions - Create a submission
/// - GET /submissions/{id} - Get a submission (admin)
/// - PUT /submissions/{id} - Replace a submission (admin)
/// - GET /auth - Redirect to the identity provider
/// - GET /auth-callback - Exchange the authorization code for an admin token
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route(
            "/submissions",
            get(list_submissions).post(create_submission),
        )
        .route(
            "/submissions/{id}",
            get(get_submission).put(update_submission),
        )
        .route("/auth", get(request_auth_code))
        .route("/auth-callback", get(auth_callback))
        .with_state(state)
}
