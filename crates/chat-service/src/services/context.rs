//! Service context - dependency container for services
//!
//! Holds the repositories, the task scheduler, the clock and the id
//! generator. Storage is reached only through the `chat-core` traits, so the
//! same services run on PostgreSQL or on the in-memory store.

use std::sync::Arc;

use chat_common::auth::JwtService;
use chat_core::traits::{
    ConversationRepository, FriendRepository, MessageRepository, TaskScheduler,
    TypingIndicatorRepository, UserRepository,
};
use chat_core::{Clock, Snowflake, SnowflakeGenerator, SystemClock};
use chat_db::PgPool;

use super::error::{ServiceError, ServiceResult};

/// Typing window used when none is configured
pub const DEFAULT_TYPING_WINDOW_MS: i64 = 5_000;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Present only on the PostgreSQL backend; used by readiness checks
    pool: Option<PgPool>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    typing_repo: Arc<dyn TypingIndicatorRepository>,
    friend_repo: Arc<dyn FriendRepository>,
    message_repo: Arc<dyn MessageRepository>,

    scheduler: Arc<dyn TaskScheduler>,
    clock: Arc<dyn Clock>,
    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
    typing_window_ms: i64,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Storage ===

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Whether the backing store answers
    pub async fn storage_healthy(&self) -> bool {
        match &self.pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => true,
        }
    }

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn typing_repo(&self) -> &dyn TypingIndicatorRepository {
        self.typing_repo.as_ref()
    }

    pub fn friend_repo(&self) -> &dyn FriendRepository {
        self.friend_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    // === Collaborators ===

    pub fn scheduler(&self) -> &dyn TaskScheduler {
        self.scheduler.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Current time in unix milliseconds
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// How long a typing indicator lives without another keystroke
    pub fn typing_window_ms(&self) -> i64 {
        self.typing_window_ms
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("backend", &if self.pool.is_some() { "postgres" } else { "memory" })
            .field("typing_window_ms", &self.typing_window_ms)
            .field("repositories", &"...")
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    typing_repo: Option<Arc<dyn TypingIndicatorRepository>>,
    friend_repo: Option<Arc<dyn FriendRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    scheduler: Option<Arc<dyn TaskScheduler>>,
    clock: Option<Arc<dyn Clock>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    typing_window_ms: Option<i64>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Use one store for every repository
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: UserRepository
            + ConversationRepository
            + TypingIndicatorRepository
            + FriendRepository
            + MessageRepository
            + 'static,
    {
        self.user_repo(store.clone())
            .conversation_repo(store.clone())
            .typing_repo(store.clone())
            .friend_repo(store.clone())
            .message_repo(store)
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn typing_repo(mut self, repo: Arc<dyn TypingIndicatorRepository>) -> Self {
        self.typing_repo = Some(repo);
        self
    }

    pub fn friend_repo(mut self, repo: Arc<dyn FriendRepository>) -> Self {
        self.friend_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn typing_window_ms(mut self, window_ms: i64) -> Self {
        self.typing_window_ms = Some(window_ms);
        self
    }

    /// Build the ServiceContext
    ///
    /// Clock, id generator and typing window fall back to the wall clock,
    /// worker 0 and [`DEFAULT_TYPING_WINDOW_MS`].
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if a required dependency is missing
    /// or the typing window is not positive
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let required = |name: &str| ServiceError::validation(format!("{name} is required"));

        let typing_window_ms = self.typing_window_ms.unwrap_or(DEFAULT_TYPING_WINDOW_MS);
        if typing_window_ms <= 0 {
            return Err(ServiceError::validation("typing window must be positive"));
        }

        Ok(ServiceContext {
            pool: self.pool,
            user_repo: self.user_repo.ok_or_else(|| required("user_repo"))?,
            conversation_repo: self
                .conversation_repo
                .ok_or_else(|| required("conversation_repo"))?,
            typing_repo: self.typing_repo.ok_or_else(|| required("typing_repo"))?,
            friend_repo: self.friend_repo.ok_or_else(|| required("friend_repo"))?,
            message_repo: self.message_repo.ok_or_else(|| required("message_repo"))?,
            scheduler: self.scheduler.ok_or_else(|| required("scheduler"))?,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            jwt_service: self.jwt_service.ok_or_else(|| required("jwt_service"))?,
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::new(0))),
            typing_window_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use chat_db::MemoryStore;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("context-test-secret", None, 60))
    }

    #[test]
    fn test_build_with_store() {
        let ctx = ServiceContext::builder()
            .store(MemoryStore::new_shared())
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(jwt())
            .build()
            .unwrap();

        assert!(ctx.pool().is_none());
        assert_eq!(ctx.typing_window_ms(), DEFAULT_TYPING_WINDOW_MS);
        assert!(ctx.generate_id() < ctx.generate_id());
    }

    #[test]
    fn test_missing_scheduler_rejected() {
        let err = ServiceContext::builder()
            .store(MemoryStore::new_shared())
            .jwt_service(jwt())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("scheduler is required"));
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let err = ServiceContext::builder()
            .store(MemoryStore::new_shared())
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(jwt())
            .typing_window_ms(0)
            .build()
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_memory_backend_is_healthy() {
        let ctx = ServiceContext::builder()
            .store(MemoryStore::new_shared())
            .scheduler(Arc::new(ManualScheduler::new()))
            .jwt_service(jwt())
            .build()
            .unwrap();
        assert!(ctx.storage_healthy().await);
    }
}
