use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Rows (Mapped to Database) ---

/// User
///
/// Canonical user identity record from the `users` table. The `password`
/// field holds the Argon2id digest, never a plaintext. This struct is
/// internal to the repository and handlers; responses go through
/// `UserResponse`, which carries no digest at all.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    // Present when the record was created or updated through the admin
    // endpoints; self-registration does not supply one.
    pub email: Option<String>,
}

/// Admin
///
/// Administrator identity record from the `admins` table. Admins authenticate
/// in a credential space entirely separate from users: the same username may
/// exist in both tables without conflict.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Household
///
/// A physical/administrative unit identified by its (area, address) pair,
/// which is unique at the schema level. Owns zero or more collection requests.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Household {
    pub id: i64,
    pub area: String,
    pub address: String,
}

/// CollectionRequest
///
/// A single resource request tied to exactly one household via a schema-level
/// foreign key. `status` is always present; it defaults to "pending" at
/// creation when the client omits it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CollectionRequest {
    pub id: i64,
    pub amount: i64,
    pub status: String,
    pub household_id: i64,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /register).
/// The password only ever exists in memory long enough to be hashed; it is
/// never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for both login endpoints (POST /login, POST /admin/login).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// RegisterAdminRequest
///
/// Input payload for administrator registration (POST /admin/register).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterAdminRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// AdminCreateUserRequest
///
/// Input payload for admin-driven user creation (POST /admin/users).
/// Unlike self-registration, an admin may attach an email to the record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminCreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// UpdateUserRequest
///
/// Partial update payload for PUT /admin/users/{id}. Every field is optional;
/// only the provided ones are written. In particular, an absent password
/// leaves the stored digest untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// CreateHouseholdRequest
///
/// Input payload for POST /households.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateHouseholdRequest {
    pub area: String,
    pub address: String,
}

fn default_status() -> String {
    "pending".to_string()
}

/// CreateCollectionRequest
///
/// Input payload for POST /requests. A missing `status` defaults to
/// "pending" so the stored row always carries one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCollectionRequest {
    pub amount: i64,
    #[serde(default = "default_status")]
    pub status: String,
    pub household_id: i64,
}

// --- Response Schemas (Output) ---

/// UserResponse
///
/// The outward-facing shape of a user record. Deliberately a separate type
/// from `User` so the password digest cannot be echoed by construction.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// TokenResponse
///
/// Output of a successful login: the bearer token the client presents in the
/// `Authorization` header from then on.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub access_token: String,
}

/// MessageResponse
///
/// Plain confirmation body used by registration and deletion endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
