pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod repositories;
pub mod routes;
pub mod services;

pub use guards::RequireAdmin;
pub use repositories::{AdminUserRepository, PgAdminUserRepository};
pub use services::{AuthService, TokenService};
