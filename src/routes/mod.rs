/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly per module: admin handlers carry the
/// `AuthAdmin` extractor, so an admin route cannot be wired up without its
/// token check.

/// Routes accessible to all clients: registration, login, and the household
/// and collection-request resources.
pub mod public;

/// Routes under /admin: admin registration and login plus the token-gated
/// user-collection CRUD.
pub mod admin;
