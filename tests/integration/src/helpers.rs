//! Test server and request helpers

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use chat_api::{create_app, create_app_state, serve};
use chat_common::{AppConfig, JwtService, StorageBackend};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures::{Data, SyncUser, UserBody};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const TEST_WEBHOOK_SECRET: &str = "integration-webhook-secret";

/// Typing window short enough for real-time expiry tests
pub const TEST_TYPING_WINDOW_MS: i64 = 400;

/// A synced user and a token for them
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub external_id: String,
    pub token: String,
}

/// Server on an ephemeral port, stopped when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    jwt: JwtService,
    handle: JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl TestServer {
    /// In-memory storage, short typing window
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()).await
    }

    /// PostgreSQL storage; `None` when DATABASE_URL is not set
    pub async fn start_postgres() -> Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return Ok(None);
        };

        let mut config = test_config();
        config.database.backend = StorageBackend::Postgres;
        config.database.url = Some(url);
        config.database.migrations_dir = Some(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../../crates/chat-db/migrations").to_string(),
        );
        Self::start_with_config(config).await.map(Some)
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.issuer.clone(),
            config.jwt.token_expiry,
        );

        let state = create_app_state(config).await?;
        let app = create_app(state)?;

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            jwt,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Token for an identity-provider subject
    pub fn token_for(&self, external_id: &str) -> Result<String> {
        Ok(self.jwt.issue_token(external_id)?)
    }

    /// Sync a fresh user through the webhook and mint their token
    pub async fn create_user(&self, prefix: &str) -> Result<TestUser> {
        let sync = SyncUser::named(prefix);
        let response = self.post_webhook("/api/v1/webhooks/users", &sync).await?;
        let body: Data<UserBody> = assert_json(response, StatusCode::OK).await?;

        Ok(TestUser {
            id: body.data.id,
            username: body.data.username,
            token: self.token_for(&sync.external_id)?,
            external_id: sync.external_id,
        })
    }

    fn authed(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder.header("Authorization", format!("Bearer {token}"))
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .authed(self.client.get(self.url(path)), token)
            .send()
            .await?)
    }

    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .authed(self.client.post(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    /// POST without a body
    pub async fn post_empty_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .authed(self.client.post(self.url(path)), token)
            .send()
            .await?)
    }

    pub async fn patch_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .authed(self.client.patch(self.url(path)), token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .authed(self.client.delete(self.url(path)), token)
            .send()
            .await?)
    }

    pub async fn post_webhook<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header("x-webhook-secret", TEST_WEBHOOK_SECRET)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete_webhook(&self, path: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .header("x-webhook-secret", TEST_WEBHOOK_SECRET)
            .send()
            .await?)
    }
}

/// In-memory configuration with the test secrets
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_memory(TEST_JWT_SECRET, TEST_TYPING_WINDOW_MS);
    config.webhook.secret = Some(TEST_WEBHOOK_SECRET.to_string());
    config
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
