use std::time::Duration;

use async_trait::async_trait;
use models::admin::Admin;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Exchanges a verified admin identity for an access token.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, admin: &Admin, password: &str) -> Result<String, ServiceError>;
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    id: Uuid,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Posts the identity as JSON to the auth service. The client carries a
/// timeout so login is never left waiting on it.
#[derive(Clone)]
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    url: String,
}

impl HttpTokenIssuer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Upstream(format!("building http client: {e}")))?;
        Ok(Self { client, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, admin: &Admin, password: &str) -> Result<String, ServiceError> {
        let body = TokenRequest { id: admin.id, username: &admin.username, password };
        let resp = self.client.post(&self.url).json(&body).send().await.map_err(|e| {
            warn!(url = %self.url, error = %e, "token exchange failed");
            ServiceError::Upstream(format!("token exchange: {e}"))
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Upstream(format!("token exchange returned {status}")));
        }
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ServiceError::Upstream(format!("token response: {e}")))?;
        if token.access_token.is_empty() {
            return Err(ServiceError::Upstream("token response carried no access_token".into()));
        }
        debug!(username = %admin.username, "token issued");
        Ok(token.access_token)
    }
}

pub mod mock {
    use super::*;

    /// Hands out a fixed token, or fails every exchange.
    ///
    /// ```
    /// use service::auth::issuer::{mock::StaticTokenIssuer, TokenIssuer};
    /// use models::admin::Admin;
    ///
    /// let admin = Admin { id: uuid::Uuid::new_v4(), username: "chef".into(), password: "pw".into() };
    /// let token = tokio_test::block_on(StaticTokenIssuer::new("valid").issue(&admin, "pw")).unwrap();
    /// assert_eq!(token, "valid");
    /// assert!(tokio_test::block_on(StaticTokenIssuer::failing().issue(&admin, "pw")).is_err());
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct StaticTokenIssuer {
        token: Option<String>,
    }

    impl StaticTokenIssuer {
        pub fn new(token: &str) -> Self {
            Self { token: Some(token.to_string()) }
        }

        pub fn failing() -> Self {
            Self { token: None }
        }
    }

    #[async_trait]
    impl TokenIssuer for StaticTokenIssuer {
        async fn issue(&self, _admin: &Admin, _password: &str) -> Result<String, ServiceError> {
            self.token
                .clone()
                .ok_or_else(|| ServiceError::Upstream("auth service unavailable".into()))
        }
    }
}
