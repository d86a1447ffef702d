pub mod admin_user_repository;

#[cfg(test)]
pub(crate) mod memory;

pub use admin_user_repository::{AdminUserRepository, PgAdminUserRepository};
