use crate::{
    AppState,
    auth::{AuthAdmin, issue_token},
    error::{ApiError, ApiResult},
    models::{
        AdminCreateUserRequest, CollectionRequest, CreateCollectionRequest,
        CreateHouseholdRequest, Household, LoginRequest, MessageResponse, RegisterAdminRequest,
        RegisterUserRequest, TokenResponse, UpdateUserRequest, UserResponse,
    },
    password::{fallback_digest, hash_password, verify_password},
    repository::UserChanges,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Rejects empty or whitespace-only credential fields before anything touches
/// the storage layer.
fn require_field(value: &str, name: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("'{name}' must not be empty")));
    }
    Ok(())
}

// --- Public Handlers: Users ---

/// register_user
///
/// [Public Route] Self-registration for ordinary users.
///
/// The digest is computed before the insert opens its transaction, and the
/// duplicate check happens twice: a pre-check for the friendly message, and
/// the unique index for correctness under concurrent registrations.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    require_field(&payload.username, "username")?;
    require_field(&payload.password, "password")?;

    if state
        .repo
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let digest = hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(&payload.username, &digest, None)
        .await?;

    tracing::info!("User {} created successfully.", user.username);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// login_user
///
/// [Public Route] Exchanges user credentials for a bearer token.
///
/// When the username does not exist we still verify against a placeholder
/// digest, so a failed lookup and a failed verification cost the same time.
/// Either way the client sees the identical generic 401.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let user = state.repo.find_user_by_username(&payload.username).await?;

    let digest = user
        .as_ref()
        .map(|u| u.password.as_str())
        .unwrap_or_else(|| fallback_digest());
    let verified = verify_password(&payload.password, digest).unwrap_or(false);

    match user {
        Some(user) if verified => {
            let access_token = issue_token(user.id, &state.config)?;
            tracing::info!("User {} logged in successfully.", user.username);
            Ok((StatusCode::CREATED, Json(TokenResponse { access_token })))
        }
        _ => {
            tracing::warn!("Invalid login attempt for username: {}", payload.username);
            Err(ApiError::InvalidCredentials)
        }
    }
}

/// get_user
///
/// [Public Route] Retrieves a single user by id. This endpoint carries no
/// authentication, matching the upstream API surface; the response type
/// contains no password digest.
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    match state.repo.get_user(user_id).await? {
        Some(user) => Ok(Json(user.into())),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

// --- Public Handlers: Households ---

/// list_households
///
/// [Public Route] Lists every household. Ordering is by id and carries no
/// semantic meaning.
#[utoipa::path(
    get,
    path = "/households",
    responses((status = 200, description = "Households", body = [Household]))
)]
pub async fn list_households(State(state): State<AppState>) -> ApiResult<Json<Vec<Household>>> {
    let households = state.repo.list_households().await?;
    Ok(Json(households))
}

/// create_household
///
/// [Public Route] Creates a household. The (area, address) pair is unique at
/// the schema level; a duplicate surfaces as 400 with the historical message.
#[utoipa::path(
    post,
    path = "/households",
    request_body = CreateHouseholdRequest,
    responses(
        (status = 201, description = "Created", body = Household),
        (status = 400, description = "Duplicate area/address pair")
    )
)]
pub async fn create_household(
    State(state): State<AppState>,
    Json(payload): Json<CreateHouseholdRequest>,
) -> ApiResult<(StatusCode, Json<Household>)> {
    require_field(&payload.area, "area")?;
    require_field(&payload.address, "address")?;

    match state
        .repo
        .create_household(&payload.area, &payload.address)
        .await
    {
        Ok(household) => Ok((StatusCode::CREATED, Json(household))),
        Err(ApiError::Conflict(_)) => Err(ApiError::BadRequest(
            "A household with the same area and address already exists.".to_string(),
        )),
        Err(e) => Err(e),
    }
}

/// get_household
///
/// [Public Route] Retrieves a single household by id.
#[utoipa::path(
    get,
    path = "/households/{household_id}",
    params(("household_id" = i64, Path, description = "Household ID")),
    responses(
        (status = 200, description = "Found", body = Household),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_household(
    State(state): State<AppState>,
    Path(household_id): Path<i64>,
) -> ApiResult<Json<Household>> {
    match state.repo.get_household(household_id).await? {
        Some(household) => Ok(Json(household)),
        None => Err(ApiError::NotFound("Household not found".to_string())),
    }
}

// --- Public Handlers: Collection Requests ---

/// create_request
///
/// [Public Route] Files a collection request against a household. The
/// household reference is enforced by the schema-level foreign key, so a
/// missing household yields 404 and never a dangling row.
#[utoipa::path(
    post,
    path = "/requests",
    request_body = CreateCollectionRequest,
    responses(
        (status = 201, description = "Created", body = CollectionRequest),
        (status = 404, description = "Unknown household")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<CreateCollectionRequest>,
) -> ApiResult<(StatusCode, Json<CollectionRequest>)> {
    require_field(&payload.status, "status")?;

    let request = state
        .repo
        .create_request(payload.amount, &payload.status, payload.household_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// get_request
///
/// [Public Route] Retrieves a single collection request by id.
#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(("request_id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Found", body = CollectionRequest),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> ApiResult<Json<CollectionRequest>> {
    match state.repo.get_request(request_id).await? {
        Some(request) => Ok(Json(request)),
        None => Err(ApiError::NotFound("Request not found".to_string())),
    }
}

// --- Admin Handlers ---

/// register_admin
///
/// [Public Route] Administrator self-registration. Admin usernames live in
/// their own uniqueness domain, entirely separate from user usernames.
#[utoipa::path(
    post,
    path = "/admin/register",
    request_body = RegisterAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = MessageResponse),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register_admin(
    State(state): State<AppState>,
    Json(payload): Json<RegisterAdminRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    require_field(&payload.username, "username")?;
    require_field(&payload.password, "password")?;
    require_field(&payload.email, "email")?;

    if state
        .repo
        .find_admin_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Admin already exists".to_string()));
    }

    let digest = hash_password(&payload.password)?;
    let admin = state
        .repo
        .create_admin(&payload.username, &digest, &payload.email)
        .await?;

    tracing::info!("Admin {} created successfully.", admin.username);
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Admin created successfully".to_string(),
        }),
    ))
}

/// login_admin
///
/// [Public Route] Exchanges admin credentials for a bearer token. Structurally
/// identical to `login_user`, but looks up the admin credential space.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_admin(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let admin = state
        .repo
        .find_admin_by_username(&payload.username)
        .await?;

    let digest = admin
        .as_ref()
        .map(|a| a.password.as_str())
        .unwrap_or_else(|| fallback_digest());
    let verified = verify_password(&payload.password, digest).unwrap_or(false);

    match admin {
        Some(admin) if verified => {
            let access_token = issue_token(admin.id, &state.config)?;
            tracing::info!("Admin {} logged in successfully.", admin.username);
            Ok((StatusCode::CREATED, Json(TokenResponse { access_token })))
        }
        _ => {
            tracing::warn!(
                "Invalid login attempt for admin username: {}",
                payload.username
            );
            Err(ApiError::InvalidCredentials)
        }
    }
}

/// list_users
///
/// [Admin Route] Lists every user record. The `AuthAdmin` extractor has
/// already proven the bearer token valid and its subject an existing admin.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Admin not found")
    )
)]
pub async fn list_users(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// admin_create_user
///
/// [Admin Route] Creates a user on behalf of an administrator. Same duplicate
/// semantics as self-registration, but the record may carry an email.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = AdminCreateUserRequest,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 409, description = "Username taken")
    )
)]
pub async fn admin_create_user(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    require_field(&payload.username, "username")?;
    require_field(&payload.password, "password")?;

    if state
        .repo
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let digest = hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(&payload.username, &digest, payload.email.as_deref())
        .await?;

    tracing::info!(
        "User {} created successfully by admin {}.",
        user.username,
        admin.username
    );
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// admin_get_user
///
/// [Admin Route] Retrieves a single user record by id.
#[utoipa::path(
    get,
    path = "/admin/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_get_user(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    match state.repo.get_user(user_id).await? {
        Some(user) => Ok(Json(user.into())),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

/// admin_update_user
///
/// [Admin Route] Partial update of a user record. A provided password is
/// re-hashed; an absent one leaves the stored digest untouched. Renaming a
/// user onto a taken username resolves to 409 via the unique index.
#[utoipa::path(
    put,
    path = "/admin/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Username taken")
    )
)]
pub async fn admin_update_user(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let password = match payload.password.as_deref() {
        Some(plaintext) => Some(hash_password(plaintext)?),
        None => None,
    };

    let changes = UserChanges {
        username: payload.username,
        password,
        email: payload.email,
    };

    match state.repo.update_user(user_id, changes).await? {
        Some(user) => {
            tracing::info!(
                "User {} updated successfully by admin {}.",
                user.username,
                admin.username
            );
            Ok(Json(user.into()))
        }
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

/// admin_delete_user
///
/// [Admin Route] Deletes a user record. Irreversible; there is no soft
/// delete. A missing id is 404, never a 500.
#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_user(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if state.repo.delete_user(user_id).await? {
        tracing::info!("User {} deleted by admin {}.", user_id, admin.username);
        Ok(Json(MessageResponse {
            message: "User deleted successfully".to_string(),
        }))
    } else {
        Err(ApiError::NotFound("User not found".to_string()))
    }
}
