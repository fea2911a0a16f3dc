//! Server setup and initialization
//!
//! Wires storage, the typing scheduler and the HTTP stack together.

use std::sync::Arc;

use axum::Router;
use chat_common::{AppConfig, AppError, DatabaseConfig, JwtService, StorageBackend};
use chat_core::{Clock, SnowflakeGenerator, SystemClock};
use chat_db::{
    create_pool, run_migrations, MemoryStore, PgConversationRepository, PgFriendRepository,
    PgMessageRepository, PgTypingIndicatorRepository, PgUserRepository, PoolConfig,
};
use chat_service::{ServiceContextBuilder, TaskRunner, TokioScheduler};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
///
/// # Errors
/// Invalid middleware configuration
pub fn create_app(state: AppState) -> Result<Router, AppError> {
    let config = state.config();
    let api = apply_middleware(
        create_router(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    )?;

    Ok(api.merge(health_routes()).with_state(state))
}

/// Initialize all dependencies and create AppState.
///
/// Also starts the task runner that executes scheduled typing expiries.
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (scheduler, queue) = TokioScheduler::new(clock.clone());

    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.issuer.clone(),
        config.jwt.token_expiry,
    ));

    let builder = ServiceContextBuilder::new()
        .scheduler(Arc::new(scheduler))
        .clock(clock)
        .jwt_service(jwt_service)
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .typing_window_ms(config.typing.window_ms);

    let service_context = attach_storage(builder, &config.database)
        .await?
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    TaskRunner::new(service_context.clone()).spawn(queue);
    info!(window_ms = config.typing.window_ms, "Typing expiry runner started");

    Ok(AppState::new(service_context, config))
}

async fn attach_storage(
    builder: ServiceContextBuilder,
    config: &DatabaseConfig,
) -> Result<ServiceContextBuilder, AppError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok(builder.store(MemoryStore::new_shared()))
        }
        StorageBackend::Postgres => {
            let pool_config = PoolConfig::from_app_config(config)
                .ok_or_else(|| AppError::Config("DATABASE_URL is required".into()))?;

            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&pool_config)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if let Some(dir) = &config.migrations_dir {
                run_migrations(&pool, dir)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!(%dir, "Migrations applied");
            }

            Ok(builder
                .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
                .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
                .typing_repo(Arc::new(PgTypingIndicatorRepository::new(pool.clone())))
                .friend_repo(Arc::new(PgFriendRepository::new(pool.clone())))
                .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
                .pool(pool))
        }
    }
}

/// Serve `app` on an already bound listener until Ctrl-C
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    if let Ok(addr) = listener.local_addr() {
        info!("Server listening on http://{addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.api.address();

    let state = create_app_state(config).await?;
    let app = create_app(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    serve(listener, app).await
}
