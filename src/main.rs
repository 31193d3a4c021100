//! Alexandria Server - Library Catalog
//!
//! A Rust server for the pages of a small local library catalog.

use axum::{
    response::Redirect,
    routing::get,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alexandria_server::{api, config::AppConfig, repository::Repository, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("alexandria_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Alexandria Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        repository: Arc::new(Repository::new(pool)),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let pages = Router::new()
        // Home
        .route("/", get(|| async { Redirect::to("/catalog") }))
        .route("/catalog", get(api::home::index))
        // Books
        .route("/catalog/books", get(api::books::book_list))
        .route(
            "/catalog/book/create",
            get(api::books::book_create_get).post(api::books::book_create_post),
        )
        .route("/catalog/book/:id", get(api::books::book_detail))
        .route(
            "/catalog/book/:id/update",
            get(api::books::book_update_get).post(api::books::book_update_post),
        )
        .route(
            "/catalog/book/:id/delete",
            get(api::books::book_delete_get).post(api::books::book_delete_post),
        )
        // Authors
        .route("/catalog/authors", get(api::authors::author_list))
        .route(
            "/catalog/author/create",
            get(api::authors::author_create_get).post(api::authors::author_create_post),
        )
        .route("/catalog/author/:id", get(api::authors::author_detail))
        .route(
            "/catalog/author/:id/update",
            get(api::authors::author_update_get).post(api::authors::author_update_post),
        )
        .route(
            "/catalog/author/:id/delete",
            get(api::authors::author_delete_get).post(api::authors::author_delete_post),
        )
        // Genres
        .route("/catalog/genres", get(api::genres::genre_list))
        .route(
            "/catalog/genre/create",
            get(api::genres::genre_create_get).post(api::genres::genre_create_post),
        )
        .route("/catalog/genre/:id", get(api::genres::genre_detail))
        .route(
            "/catalog/genre/:id/update",
            get(api::genres::genre_update_get).post(api::genres::genre_update_post),
        )
        .route(
            "/catalog/genre/:id/delete",
            get(api::genres::genre_delete_get).post(api::genres::genre_delete_post),
        )
        // Book instances
        .route(
            "/catalog/bookinstances",
            get(api::book_instances::bookinstance_list),
        )
        .route(
            "/catalog/bookinstance/create",
            get(api::book_instances::bookinstance_create_get)
                .post(api::book_instances::bookinstance_create_post),
        )
        .route(
            "/catalog/bookinstance/:id",
            get(api::book_instances::bookinstance_detail),
        )
        .route(
            "/catalog/bookinstance/:id/update",
            get(api::book_instances::bookinstance_update_get)
                .post(api::book_instances::bookinstance_update_post),
        )
        .route(
            "/catalog/bookinstance/:id/delete",
            get(api::book_instances::bookinstance_delete_get)
                .post(api::book_instances::bookinstance_delete_post),
        )
        // Health
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(pages)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
}
