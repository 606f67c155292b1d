use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Defines the routes nested under `/admin`. Registration and login are open
/// (an admin has no token yet); everything else requires a bearer token whose
/// subject resolves against the *admin* credential space. That check lives in
/// the `AuthAdmin` extractor on each gated handler, so a token minted for an
/// ordinary user never passes, and a token for a deleted admin yields 404.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /admin/register
        // Creates an administrator account. Admin usernames are unique among admins.
        .route("/register", post(handlers::register_admin))
        // POST /admin/login
        // Exchanges admin credentials for a bearer token.
        .route("/login", post(handlers::login_admin))
        // GET/POST /admin/users
        // Token-gated listing and creation of user records.
        .route(
            "/users",
            get(handlers::list_users).post(handlers::admin_create_user),
        )
        // GET/PUT/DELETE /admin/users/{id}
        // Token-gated single-user read, partial update, and irreversible delete.
        .route(
            "/users/{user_id}",
            get(handlers::admin_get_user)
                .put(handlers::admin_update_user)
                .delete(handlers::admin_delete_user),
        )
}
