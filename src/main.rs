mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{AppConfig, Config, SwaggerConfig};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::{
    routes as auth_routes, AuthService, PgAdminUserRepository, TokenService,
};
use crate::features::issues::{routes as issues_routes, IssueService, PgIssueRepository};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(2)
        });

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?
        .block_on(run(worker_threads))
}

async fn run(worker_threads: usize) -> anyhow::Result<()> {
    // .env must be loaded before the filter reads RUST_LOG
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::info!(
        "Starting civic-issues v{} (workers={}, pid={})",
        env!("CARGO_PKG_VERSION"),
        worker_threads,
        std::process::id()
    );

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations applied");

    let photo_storage = modules::storage::from_config(&config.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize photo storage: {}", e))?;
    tracing::info!("Photo storage ready ({} backend)", photo_storage.backend());

    let issue_service = Arc::new(IssueService::new(
        Arc::new(PgIssueRepository::new(pool.clone())),
        photo_storage,
    ));

    if config.seed_demo_data {
        let seeded = issue_service
            .seed_demo_data()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed demo data: {}", e))?;
        tracing::info!("Demo data seeding inserted {} issues", seeded);
    }

    let token_service = Arc::new(TokenService::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(
        Arc::new(PgAdminUserRepository::new(pool.clone())),
        Arc::clone(&token_service),
    ));

    // Admin-only handlers reject anonymous requests through the RequireAdmin guard
    let api_routes = Router::new()
        .merge(issues_routes::routes(issue_service, config.app.max_request_body_size))
        .merge(auth_routes::routes(auth_service))
        .layer(from_fn_with_state(token_service, middleware::session_middleware));

    let app = Router::new()
        .merge(swagger_router(&config.swagger))
        .merge(api_routes)
        .route("/health", get(health_check))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Outermost, so the trace span already sees the id
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let listener = bind_listener(&config.app)?;
    tracing::info!("Server listening on http://{}", config.app.server_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn health_check() -> axum::http::StatusCode {
    axum::http::StatusCode::OK
}

/// Swagger UI and the OpenAPI document, behind basic auth when credentials are set
fn swagger_router(config: &SwaggerConfig) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
    }
    .modify(&mut openapi);

    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    match config.credentials() {
        Some(credentials) => {
            tracing::info!("Swagger UI basic auth enabled");
            swagger.layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
        }
        None => {
            tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
            swagger
        }
    }
}

fn bind_listener(config: &AppConfig) -> anyhow::Result<tokio::net::TcpListener> {
    let addr: std::net::SocketAddr = config
        .server_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;
    socket.set_tcp_keepalive(&socket2::TcpKeepalive::new().with_time(Duration::from_secs(60)))?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
