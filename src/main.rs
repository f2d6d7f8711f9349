use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::IntoResponse;
use recordpoint_backend::{
    config::Config,
    db::{
        form_schema_repository::{FormSchemaRepository, PostgresFormSchemaRepository},
        postgres_workflow_repository::{PostgresExecutionQueue, PostgresWorkflowRepository},
        workflow_repository::{ExecutionQueue, WorkflowRepository},
    },
    responses::JsonResponse,
    routes::app_router,
    AppState,
};
use reqwest::Client;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env().context("failed to load configuration")?);
    init_tracing();

    let global_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(config.rate_limit.per_millisecond)
            .burst_size(config.rate_limit.burst_size)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid rate limiter configuration")?,
    );

    // Background task to cleanup old IPs
    let governor_limiter = global_governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let pg_pool = establish_connection(&config.database_url).await?;

    let workflow_repo = Arc::new(PostgresWorkflowRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn WorkflowRepository>;
    let execution_queue = Arc::new(PostgresExecutionQueue {
        pool: pg_pool.clone(),
    }) as Arc<dyn ExecutionQueue>;
    let form_schema_repo = Arc::new(PostgresFormSchemaRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn FormSchemaRepository>;

    let http_client = Client::builder()
        .timeout(config.integration.request_timeout)
        .build()
        .context("failed to build HTTP client")?;

    let state = AppState {
        workflow_repo,
        execution_queue,
        form_schema_repo,
        http_client,
        config: config.clone(),
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid header value")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    let app = app_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer {
            config: global_governor_conf,
        })
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let addr = config.bind_addr;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, make_service)
        .await
        .context("server error")?;
    Ok(())
}

/// Establish a connection to the database, verify it and apply migrations.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("Failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    info!("✅ Successfully connected to the database");
    Ok(pool)
}
