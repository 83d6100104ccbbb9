//! Quill server entry point.

use std::sync::Arc;

use apalis::prelude::*;
use axum::{Router, middleware};
use quill_api::{middleware::AppState, router as api_router};
use quill_common::{Config, TokenService};
use quill_core::{
    AuthService, DeviceService, PostService, PushDispatchService, ReactionService, UserService,
};
use quill_db::repositories::{
    DeviceRegistrationRepository, PostRepository, ReactionNotificationRepository,
    ReactionRepository, UserRepository,
};
use quill_queue::{
    CredentialProvider, PushGateway, PushJob, PushWorkerContext, RedisPushDispatcher,
    ServiceAccountTokenSource, push_worker,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quill server...");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Connect to database
    let db = quill_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    // Connect to Redis and initialize job queue
    info!("Connecting to Redis...");
    let redis_client =
        redis::Client::open(config.redis.url.as_str()).expect("Failed to create Redis client");
    let redis_conn = redis::aio::ConnectionManager::new(redis_client)
        .await
        .expect("Failed to connect to Redis");
    let redis_storage = apalis_redis::RedisStorage::<PushJob>::new(redis_conn);
    info!("Connected to Redis job queue");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));
    let notification_repo = ReactionNotificationRepository::new(Arc::clone(&db));
    let device_repo = DeviceRegistrationRepository::new(Arc::clone(&db));

    // Initialize services
    let token_service = TokenService::new(
        &config.auth.secret_key,
        config.auth.access_token_expire_minutes,
    );
    let user_service = UserService::new(user_repo.clone());
    let auth_service = AuthService::new(user_service.clone(), token_service);
    let post_service = PostService::new(post_repo.clone());

    // Initialize services with push dispatch support
    let dispatch: Option<PushDispatchService> = if config.push.enabled {
        Some(Arc::new(RedisPushDispatcher::new(redis_storage.clone())))
    } else {
        None
    };

    let reaction_service = if let Some(ref dispatch) = dispatch {
        ReactionService::with_dispatch(
            reaction_repo.clone(),
            post_repo.clone(),
            notification_repo.clone(),
            device_repo.clone(),
            dispatch.clone(),
        )
    } else {
        ReactionService::new(
            reaction_repo.clone(),
            post_repo.clone(),
            notification_repo.clone(),
            device_repo.clone(),
        )
    };

    let device_service = if let Some(ref dispatch) = dispatch {
        DeviceService::with_dispatch(
            device_repo.clone(),
            notification_repo.clone(),
            dispatch.clone(),
        )
    } else {
        DeviceService::new(device_repo.clone(), notification_repo.clone())
    };

    // Create app state
    let state = AppState {
        auth_service,
        user_service,
        post_service,
        reaction_service,
        device_service,
    };

    // Build router
    let app = Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            quill_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start push dispatch worker if push is enabled
    if config.push.enabled {
        info!("Starting push dispatch worker...");

        let token_source = ServiceAccountTokenSource::from_file(&config.push.service_account_path)?;
        let credentials = Arc::new(CredentialProvider::new(Arc::new(token_source)));
        let gateway = PushGateway::new(config.push.send_url(), credentials);
        let push_ctx = PushWorkerContext::new(gateway);

        // Spawn the worker in the background
        tokio::spawn(async move {
            let monitor = Monitor::new().register({
                WorkerBuilder::new("push")
                    .data(push_ctx)
                    .backend(redis_storage)
                    .build_fn(push_worker)
            });

            if let Err(e) = monitor.run().await {
                tracing::error!(error = %e, "Push worker failed");
            }
        });
        info!("Push dispatch worker started");
    }

    // Start server with graceful shutdown
    let addr = (config.server.host.as_str(), config.server.port);
    info!("Listening on {}:{}", config.server.host, config.server.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
