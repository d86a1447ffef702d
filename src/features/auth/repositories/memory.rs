//! In-memory admin account repository used by service and HTTP tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

use super::AdminUserRepository;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AdminUser, NewAdminUser};

#[derive(Default)]
pub(crate) struct InMemoryAdminUserRepository {
    rows: Mutex<Vec<AdminUser>>,
}

impl InMemoryAdminUserRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminUserRepository for InMemoryAdminUserRepository {
    async fn count(&self) -> Result<i64> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<AdminUser>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, data: &NewAdminUser) -> Result<AdminUser> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|u| u.username == data.username || u.email == data.email)
        {
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }

        let user = AdminUser {
            id: rows.len() as i64 + 1,
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            is_admin: data.is_admin,
            created_at: Utc::now(),
            last_login: None,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        if let Some(user) = self.rows.lock().unwrap().iter_mut().find(|u| u.id == id) {
            user.last_login = Some(at);
        }
        Ok(())
    }
}
