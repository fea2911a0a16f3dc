//! # chat-db
//!
//! Storage layer implementing the `chat-core` repository traits.
//!
//! - PostgreSQL via SQLx: connection pool, migrations, `FromRow` models,
//!   model to entity mappers, `Pg*Repository` implementations
//! - [`MemoryStore`]: an in-process backend for tests and local runs
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_db::{create_pool, run_migrations, PgUserRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/dm_chat")).await?;
//!     run_migrations(&pool, "crates/chat-db/migrations").await?;
//!     let users = PgUserRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgConversationRepository, PgFriendRepository, PgMessageRepository,
    PgTypingIndicatorRepository, PgUserRepository,
};
