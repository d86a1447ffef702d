pub mod auth;
pub mod issues;
