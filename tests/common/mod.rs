#![allow(dead_code)]

use async_trait::async_trait;
use echotrack::{
    AppState,
    config::AppConfig,
    error::ApiError,
    models::{Admin, CollectionRequest, Household, User},
    password::hash_password,
    repository::{Repository, RepositoryState, UserChanges},
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};

/// InMemoryRepo
///
/// A full in-memory implementation of the `Repository` trait for tests. It
/// enforces the same invariants the Postgres schema does — unique usernames
/// per credential space, a unique (area, address) pair, and an existing
/// household behind every request — and reports violations with the same
/// `ApiError` taxonomy, so handler tests exercise the real error paths
/// without a database.
#[derive(Default)]
pub struct InMemoryRepo {
    pub users: Mutex<Vec<User>>,
    pub admins: Mutex<Vec<Admin>>,
    pub households: Mutex<Vec<Household>>,
    pub requests: Mutex<Vec<CollectionRequest>>,
    pub next_id: AtomicI64,
    /// When set, every operation fails with a storage error, for testing the
    /// opaque-500 path.
    pub fail_storage: bool,
}

impl InMemoryRepo {
    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_storage(&self) -> Result<(), ApiError> {
        if self.fail_storage {
            return Err(ApiError::Internal("simulated storage failure".to_string()));
        }
        Ok(())
    }

    /// Seeds a user with a real digest, bypassing the handlers. Returns its id.
    pub fn seed_user(&self, username: &str, password: &str) -> i64 {
        let id = self.next_id();
        self.users.lock().unwrap().push(User {
            id,
            username: username.to_string(),
            password: hash_password(password).unwrap(),
            email: None,
        });
        id
    }

    /// Seeds an admin with a real digest. Returns its id.
    pub fn seed_admin(&self, username: &str, password: &str) -> i64 {
        let id = self.next_id();
        self.admins.lock().unwrap().push(Admin {
            id,
            username: username.to_string(),
            password: hash_password(password).unwrap(),
            email: format!("{username}@example.com"),
        });
        id
    }

    /// Seeds a household. Returns its id.
    pub fn seed_household(&self, area: &str, address: &str) -> i64 {
        let id = self.next_id();
        self.households.lock().unwrap().push(Household {
            id,
            area: area.to_string(),
            address: address.to_string(),
        });
        id
    }
}

#[async_trait]
impl Repository for InMemoryRepo {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        self.check_storage()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<User, ApiError> {
        self.check_storage()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == username) {
            return Err(ApiError::Conflict("User already exists.".to_string()));
        }
        let user = User {
            id: self.next_id(),
            username: username.to_string(),
            password: password.to_string(),
            email: email.map(str::to_string),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, ApiError> {
        self.check_storage()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.check_storage()?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, ApiError> {
        self.check_storage()?;
        let mut users = self.users.lock().unwrap();

        if let Some(new_name) = &changes.username {
            if users.iter().any(|u| u.username == *new_name && u.id != id) {
                return Err(ApiError::Conflict("User already exists.".to_string()));
            }
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password) = changes.password {
            user.password = password;
        }
        if let Some(email) = changes.email {
            user.email = Some(email);
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, ApiError> {
        self.check_storage()?;
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }

    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, ApiError> {
        self.check_storage()?;
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn create_admin(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Admin, ApiError> {
        self.check_storage()?;
        let mut admins = self.admins.lock().unwrap();
        if admins.iter().any(|a| a.username == username) {
            return Err(ApiError::Conflict("Admin already exists.".to_string()));
        }
        let admin = Admin {
            id: self.next_id(),
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
        };
        admins.push(admin.clone());
        Ok(admin)
    }

    async fn get_admin(&self, id: i64) -> Result<Option<Admin>, ApiError> {
        self.check_storage()?;
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_households(&self) -> Result<Vec<Household>, ApiError> {
        self.check_storage()?;
        Ok(self.households.lock().unwrap().clone())
    }

    async fn create_household(&self, area: &str, address: &str) -> Result<Household, ApiError> {
        self.check_storage()?;
        let mut households = self.households.lock().unwrap();
        if households
            .iter()
            .any(|h| h.area == area && h.address == address)
        {
            return Err(ApiError::Conflict("Household already exists.".to_string()));
        }
        let household = Household {
            id: self.next_id(),
            area: area.to_string(),
            address: address.to_string(),
        };
        households.push(household.clone());
        Ok(household)
    }

    async fn get_household(&self, id: i64) -> Result<Option<Household>, ApiError> {
        self.check_storage()?;
        Ok(self
            .households
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.id == id)
            .cloned())
    }

    async fn create_request(
        &self,
        amount: i64,
        status: &str,
        household_id: i64,
    ) -> Result<CollectionRequest, ApiError> {
        self.check_storage()?;
        if !self
            .households
            .lock()
            .unwrap()
            .iter()
            .any(|h| h.id == household_id)
        {
            return Err(ApiError::NotFound("Household not found".to_string()));
        }
        let request = CollectionRequest {
            id: self.next_id(),
            amount,
            status: status.to_string(),
            household_id,
        };
        self.requests.lock().unwrap().push(request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: i64) -> Result<Option<CollectionRequest>, ApiError> {
        self.check_storage()?;
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }
}

/// Builds an AppState around a mock repository and the default test config.
pub fn test_state(repo: Arc<InMemoryRepo>) -> AppState {
    AppState {
        repo: repo as RepositoryState,
        config: AppConfig::default(),
    }
}
