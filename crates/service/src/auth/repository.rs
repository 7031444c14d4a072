use std::sync::Arc;

use async_trait::async_trait;
use common::{LogLevel, OperationLog};
use models::admin::{self, Admin};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::errors::ServiceError;

#[async_trait]
pub trait AdminRepository: Send + Sync + 'static {
    /// Full stored record, password included.
    async fn login<C: ConnectionTrait>(&self, conn: &C, username: &str) -> Result<Admin, ServiceError>;
}

pub struct SeaOrmAdminRepository {
    log: Arc<dyn OperationLog>,
}

impl SeaOrmAdminRepository {
    pub fn new(log: Arc<dyn OperationLog>) -> Self {
        Self { log }
    }
}

#[async_trait]
impl AdminRepository for SeaOrmAdminRepository {
    async fn login<C: ConnectionTrait>(&self, conn: &C, username: &str) -> Result<Admin, ServiceError> {
        let found = admin::Entity::find()
            .filter(admin::Column::Username.eq(username))
            .one(conn)
            .await;
        let err = match found {
            Ok(Some(admin)) => return Ok(admin),
            Ok(None) => ServiceError::NotFound(format!("admin {username} not found")),
            Err(e) => e.into(),
        };
        let level = if matches!(err, ServiceError::NotFound(_)) { LogLevel::Warn } else { LogLevel::Error };
        self.log.log("repository", level, &format!("login: {err}"));
        Err(err)
    }
}

/// In-memory repository for doc examples and tests that do not need the
/// store to be consulted.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockAdminRepository {
        admins: Mutex<HashMap<String, Admin>>,
    }

    impl MockAdminRepository {
        pub fn with_admin(username: &str, password: &str) -> Self {
            let repo = Self::default();
            repo.insert(username, password);
            repo
        }

        pub fn insert(&self, username: &str, password: &str) -> Admin {
            let admin = Admin { id: Uuid::new_v4(), username: username.to_string(), password: password.to_string() };
            self.admins
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .insert(username.to_string(), admin.clone());
            admin
        }
    }

    #[async_trait]
    impl AdminRepository for MockAdminRepository {
        async fn login<C: ConnectionTrait>(&self, _conn: &C, username: &str) -> Result<Admin, ServiceError> {
            let admins = self.admins.lock().unwrap_or_else(|p| p.into_inner());
            admins
                .get(username)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(format!("admin {username} not found")))
        }
    }
}
