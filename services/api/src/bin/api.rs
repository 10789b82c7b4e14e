//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        analysis_llm::OpenAiAnalysisAdapter, coach_llm::OpenAiCoachAdapter, db::SqliteStore,
    },
    config::Config,
    error::ApiError,
    sweep::EvictionSweeper,
    web::{
        append_chat_message_handler, chat_turn_handler, get_session_handler,
        list_chat_messages_handler, rest::ApiDoc, state::AppState, upload_resume_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use resume_coach_core::ports::SessionStore;
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(SqliteStore::new(db_pool, config.session_ttl));
    info!("Running database migrations...");
    store
        .run_migrations()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    let openai_client = Client::with_config(openai_config);

    let analyzer = Arc::new(OpenAiAnalysisAdapter::new(
        openai_client.clone(),
        config.analysis_model.clone(),
    ));
    let coach = Arc::new(OpenAiCoachAdapter::new(
        openai_client.clone(),
        config.chat_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store: store.clone(),
        analyzer,
        coach,
        config: config.clone(),
    });

    // --- 5. Sweep Once, Then Start the Recurring Eviction Task ---
    match store.evict_expired().await {
        Ok(removed) => info!(removed, "startup eviction sweep complete"),
        Err(e) => tracing::warn!(error = %e, "startup eviction sweep failed"),
    }
    let sweeper = EvictionSweeper::start(store.clone(), config.sweep_interval);

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    let api_router = Router::new()
        .route("/resumes", post(upload_resume_handler))
        .route("/sessions/{id}", get(get_session_handler))
        .route(
            "/chat/messages",
            get(list_chat_messages_handler).post(append_chat_message_handler),
        )
        .route("/chat", post(chat_turn_handler))
        // Leave room for multipart framing above the 5MB document cap.
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    // --- 8. Stop the Background Sweep ---
    sweeper.stop().await;

    Ok(())
}
