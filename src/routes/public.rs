use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are unauthenticated and accessible to any client.
/// These cover the identity gateway (registration, login) and the household /
/// collection-request resources, whose read and create operations the
/// upstream API exposes without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Self-registration for ordinary users. Duplicate usernames are rejected.
        .route("/register", post(handlers::register_user))
        // POST /login
        // Exchanges user credentials for a bearer token.
        .route("/login", post(handlers::login_user))
        // GET /users/{id}
        // Public read of a single user record (no digest in the response).
        .route("/users/{user_id}", get(handlers::get_user))
        // GET/POST /households
        // Lists all households / creates one. The (area, address) pair is unique.
        .route(
            "/households",
            get(handlers::list_households).post(handlers::create_household),
        )
        // GET /households/{id}
        .route("/households/{household_id}", get(handlers::get_household))
        // POST /requests
        // Files a collection request; the household reference is FK-enforced.
        .route("/requests", post(handlers::create_request))
        // GET /requests/{id}
        .route("/requests/{request_id}", get(handlers::get_request))
}
