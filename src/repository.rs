use crate::{
    error::ApiError,
    models::{Admin, CollectionRequest, Household, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// UserChanges
///
/// The partial-update shape for `update_user`. `None` means "keep the stored
/// value"; the password arrives here already hashed, the repository never
/// sees a plaintext.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations: the
/// credential store for both principal types plus the household/request
/// resource store. Handlers interact with the data layer exclusively through
/// this trait, which keeps them testable against an in-memory implementation.
///
/// Uniqueness and referential integrity are ultimately the schema's job; the
/// implementations translate constraint violations into the `ApiError`
/// taxonomy (`Conflict` for duplicates, `NotFound` for a missing parent row),
/// so a race between an application pre-check and the commit still resolves
/// to the same error a pre-check would have produced.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User credential space ---
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    // Fails with Conflict if the username is already taken.
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, ApiError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    // Partial update; returns None when the id does not exist.
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, ApiError>;
    // Returns false when the id does not exist.
    async fn delete_user(&self, id: i64) -> Result<bool, ApiError>;

    // --- Admin credential space (independent from users) ---
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, ApiError>;
    async fn create_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Admin, ApiError>;
    async fn get_admin(&self, id: i64) -> Result<Option<Admin>, ApiError>;

    // --- Households ---
    async fn list_households(&self) -> Result<Vec<Household>, ApiError>;
    // Fails with Conflict if the (area, address) pair already exists.
    async fn create_household(&self, area: &str, address: &str) -> Result<Household, ApiError>;
    async fn get_household(&self, id: i64) -> Result<Option<Household>, ApiError>;

    // --- Collection requests ---
    // Fails with NotFound if household_id references no existing household;
    // the schema-level foreign key enforces this even under concurrency.
    async fn create_request(
        &self,
        amount: i64,
        status: &str,
        household_id: i64,
    ) -> Result<CollectionRequest, ApiError>;
    async fn get_request(&self, id: i64) -> Result<Option<CollectionRequest>, ApiError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Every mutation runs inside its own transaction: a failed write rolls back
/// (on drop) and leaves no partial state visible to other requests.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, email FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// create_user
    ///
    /// The unique index on `users.username` is the real guard here; the
    /// handler-level pre-check only exists for the friendlier error message.
    async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, email) VALUES ($1, $2, $3) \
             RETURNING id, username, password, email",
        )
        .bind(username)
        .bind(password)
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("User already exists.".to_string()),
            other => other,
        })?;

        tx.commit().await.map_err(ApiError::from)?;
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, password, email FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// update_user
    ///
    /// Uses COALESCE so only the provided fields are written; in particular an
    /// absent password leaves the stored digest byte-for-byte unchanged.
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let user = sqlx::query_as::<_, User>(
            "UPDATE users \
             SET username = COALESCE($2, username), \
                 password = COALESCE($3, password), \
                 email = COALESCE($4, email) \
             WHERE id = $1 \
             RETURNING id, username, password, email",
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.password)
        .bind(changes.email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("User already exists.".to_string()),
            other => other,
        })?;

        tx.commit().await.map_err(ApiError::from)?;
        Ok(user)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(ApiError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, ApiError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password, email FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn create_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Admin, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let admin = sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (username, password, email) VALUES ($1, $2, $3) \
             RETURNING id, username, password, email",
        )
        .bind(username)
        .bind(password)
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Admin already exists.".to_string()),
            other => other,
        })?;

        tx.commit().await.map_err(ApiError::from)?;
        Ok(admin)
    }

    async fn get_admin(&self, id: i64) -> Result<Option<Admin>, ApiError> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password, email FROM admins WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn list_households(&self) -> Result<Vec<Household>, ApiError> {
        let households =
            sqlx::query_as::<_, Household>("SELECT id, area, address FROM households ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(households)
    }

    async fn create_household(&self, area: &str, address: &str) -> Result<Household, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let household = sqlx::query_as::<_, Household>(
            "INSERT INTO households (area, address) VALUES ($1, $2) \
             RETURNING id, area, address",
        )
        .bind(area)
        .bind(address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => ApiError::Conflict("Household already exists.".to_string()),
            other => other,
        })?;

        tx.commit().await.map_err(ApiError::from)?;
        Ok(household)
    }

    async fn get_household(&self, id: i64) -> Result<Option<Household>, ApiError> {
        let household =
            sqlx::query_as::<_, Household>("SELECT id, area, address FROM households WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(household)
    }

    /// create_request
    ///
    /// No application-level existence pre-check on the household: the foreign
    /// key closes the race a pre-check would leave open, and the violation is
    /// translated to NotFound.
    async fn create_request(
        &self,
        amount: i64,
        status: &str,
        household_id: i64,
    ) -> Result<CollectionRequest, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let request = sqlx::query_as::<_, CollectionRequest>(
            "INSERT INTO requests (amount, status, household_id) VALUES ($1, $2, $3) \
             RETURNING id, amount, status, household_id",
        )
        .bind(amount)
        .bind(status)
        .bind(household_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::NotFound(_) => ApiError::NotFound("Household not found".to_string()),
            other => other,
        })?;

        tx.commit().await.map_err(ApiError::from)?;
        Ok(request)
    }

    async fn get_request(&self, id: i64) -> Result<Option<CollectionRequest>, ApiError> {
        let request = sqlx::query_as::<_, CollectionRequest>(
            "SELECT id, amount, status, household_id FROM requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }
}
