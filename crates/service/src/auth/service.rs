use std::sync::Arc;

use models::admin::{AdminResponse, LoginRequest};
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use super::issuer::TokenIssuer;
use super::repository::AdminRepository;
use crate::errors::ServiceError;

/// Login business service independent of the web framework.
pub struct AuthService<R: AdminRepository> {
    db: DatabaseConnection,
    repo: Arc<R>,
    issuer: Arc<dyn TokenIssuer>,
}

impl<R: AdminRepository> AuthService<R> {
    pub fn new(db: DatabaseConnection, repo: Arc<R>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { db, repo, issuer }
    }

    /// Look the admin up, then exchange the identity for a token.
    ///
    /// The lookup transaction is finished before the exchange starts, so no
    /// pooled connection is held across the network call. Any failure
    /// returns no response.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::admin::LoginRequest;
    /// use service::auth::{AuthService, issuer::mock::StaticTokenIssuer, repository::mock::MockAdminRepository};
    ///
    /// tokio_test::block_on(async {
    ///     let db = models::db::connect_memory().await.unwrap();
    ///     let repo = Arc::new(MockAdminRepository::with_admin("chef", "pw"));
    ///     let svc = AuthService::new(db, repo, Arc::new(StaticTokenIssuer::new("valid")));
    ///     let req = LoginRequest { username: "chef".into(), password: "pw".into() };
    ///     let resp = svc.login(req).await.unwrap();
    ///     assert_eq!(resp.access_token, "valid");
    /// });
    /// ```
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<AdminResponse, ServiceError> {
        req.validate().into_result()?;

        let repo = self.repo.clone();
        let username = req.username.trim().to_string();
        let admin = self
            .db
            .transaction::<_, _, ServiceError>(move |txn| {
                Box::pin(async move { repo.login(txn, &username).await })
            })
            .await?;

        let access_token = self.issuer.issue(&admin, &req.password).await?;
        info!(admin_id = %admin.id, "admin_logged_in");
        Ok(AdminResponse { username: admin.username, access_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issuer::mock::StaticTokenIssuer;
    use crate::auth::repository::mock::MockAdminRepository;
    use crate::auth::SeaOrmAdminRepository;
    use crate::test_support::{get_db, recording_log, seed_admin};

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn login_against_store() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed_admin(&db, "chef", "pw").await?;
        let svc = AuthService::new(
            db,
            Arc::new(SeaOrmAdminRepository::new(recording_log())),
            Arc::new(StaticTokenIssuer::new("valid")),
        );

        let resp = svc.login(login("chef", "pw")).await?;
        assert_eq!(resp, AdminResponse { username: "chef".into(), access_token: "valid".into() });
        Ok(())
    }

    #[tokio::test]
    async fn unknown_admin_never_reaches_issuer() -> anyhow::Result<()> {
        let db = models::db::connect_memory().await?;
        let svc = AuthService::new(db, Arc::new(MockAdminRepository::default()), Arc::new(StaticTokenIssuer::failing()));
        let err = svc.login(login("ghost", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn issuer_failure_fails_closed() -> anyhow::Result<()> {
        let db = models::db::connect_memory().await?;
        let repo = Arc::new(MockAdminRepository::with_admin("chef", "pw"));
        let svc = AuthService::new(db, repo, Arc::new(StaticTokenIssuer::failing()));
        let err = svc.login(login("chef", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
        Ok(())
    }

    #[tokio::test]
    async fn empty_credentials_are_a_validation_error() -> anyhow::Result<()> {
        let db = models::db::connect_memory().await?;
        let svc = AuthService::new(db, Arc::new(MockAdminRepository::default()), Arc::new(StaticTokenIssuer::new("x")));
        match svc.login(login(" ", "")).await {
            Err(ServiceError::Validation(v)) => {
                assert!(v.contains_field("username"));
                assert!(v.contains_field("password"));
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }
}
