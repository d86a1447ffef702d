use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AdminUser, NewAdminUser};

/// Persistence seam for administrator accounts
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    async fn count(&self) -> Result<i64>;

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminUser>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>>;

    /// `Conflict` when the username or email is taken
    async fn insert(&self, data: &NewAdminUser) -> Result<AdminUser>;

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<()>;
}

const ADMIN_USER_COLUMNS: &str =
    "id, username, email, password_hash, is_admin, created_at, last_login";

/// PostgreSQL-backed admin account repository
pub struct PgAdminUserRepository {
    pool: PgPool,
}

impl PgAdminUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminUserRepository for PgAdminUserRepository {
    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count admin users: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminUser>> {
        let sql = format!(
            "SELECT {} FROM admin_users WHERE id = $1",
            ADMIN_USER_COLUMNS
        );

        sqlx::query_as::<_, AdminUser>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get admin user {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        let sql = format!(
            "SELECT {} FROM admin_users WHERE username = $1",
            ADMIN_USER_COLUMNS
        );

        sqlx::query_as::<_, AdminUser>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get admin user by username: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn insert(&self, data: &NewAdminUser) -> Result<AdminUser> {
        let sql = format!(
            r#"
            INSERT INTO admin_users (username, email, password_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ADMIN_USER_COLUMNS
        );

        sqlx::query_as::<_, AdminUser>(&sql)
            .bind(&data.username)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(data.is_admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    AppError::Conflict("Username or email already registered".to_string())
                }
                e => {
                    tracing::error!("Failed to insert admin user: {:?}", e);
                    AppError::Database(e)
                }
            })
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE admin_users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record login for admin user {}: {:?}", id, e);
                AppError::Database(e)
            })?;
        Ok(())
    }
}
