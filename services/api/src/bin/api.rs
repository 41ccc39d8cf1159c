//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, JsonFileStorage, OpenAiCommentaryAdapter, OpenAiSpeechAdapter},
    config::Config,
    error::ApiError,
    web::{
        ai::{analyze_handler, speech_handler},
        auth::{login_handler, logout_handler, me_handler, signup_handler},
        delete_note_handler, get_chapter_handler, list_notes_handler, list_versions_handler,
        middleware::require_auth,
        plan_handler, plan_sections_handler,
        rest::ApiDoc,
        search_handler,
        state::AppState,
        toggle_day_handler, upsert_note_handler,
    },
};
use async_openai::{
    config::OpenAIConfig,
    types::audio::{SpeechModel, Voice},
    Client,
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use biblia_core::canon::CHRONOLOGICAL_BLOCKS;
use biblia_core::notes::LocalNoteBackend;
use biblia_core::plan::{generate_plan, DEFAULT_TOTAL_DAYS};
use biblia_core::ports::{
    CommentaryService, KeyValueStorage, NoteBackend, ScriptureRepository, SpeechService,
};
use biblia_core::progress::PlanProgressStore;
use biblia_core::versions::VersionCatalog;
use sqlx::postgres::PgPoolOptions;
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

    // --- 2. Connect to Database & Run Migrations (cloud mode only) ---
    let db = match &config.database_url {
        Some(url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Some(db_adapter)
        }
        None => {
            info!("DATABASE_URL not set; running in anonymous/offline mode.");
            None
        }
    };

    // --- 3. Local Storage, Reading Plan & Catalog ---
    let storage: Arc<dyn KeyValueStorage> = Arc::new(JsonFileStorage::new(&config.data_dir));
    let local_notes: Arc<dyn NoteBackend> = Arc::new(LocalNoteBackend::new(Arc::clone(&storage)));
    let progress = PlanProgressStore::new(Arc::clone(&storage));
    let versions = VersionCatalog::new(
        Arc::clone(&storage),
        db.clone().map(|d| d as Arc<dyn ScriptureRepository>),
    );

    let plan = Arc::new(generate_plan(CHRONOLOGICAL_BLOCKS, DEFAULT_TOTAL_DAYS));
    info!("Reading plan generated: {} days.", plan.len());

    // --- 4. Initialize AI Adapters (optional) ---
    let (commentary, speech) = match &config.openai_api_key {
        Some(key) => {
            let openai_config = OpenAIConfig::new().with_api_key(key);
            let openai_client = Client::with_config(openai_config);

            let tts_voice = match config.tts_voice.to_lowercase().as_str() {
                "alloy" => Voice::Alloy,
                "echo" => Voice::Echo,
                "fable" => Voice::Fable,
                "onyx" => Voice::Onyx,
                "nova" => Voice::Nova,
                "shimmer" => Voice::Shimmer,
                _ => {
                    return Err(ApiError::Internal(format!(
                        "Invalid TTS voice specified in config: '{}'",
                        config.tts_voice
                    )))
                }
            };
            let tts_model = match config.tts_model.as_str() {
                "tts-1-hd" => SpeechModel::Tts1Hd,
                _ => SpeechModel::Tts1,
            };

            let commentary = Arc::new(OpenAiCommentaryAdapter::new(
                openai_client.clone(),
                config.chat_model.clone(),
            )) as Arc<dyn CommentaryService>;
            let speech = Arc::new(OpenAiSpeechAdapter::new(openai_client, tts_model, tts_voice))
                as Arc<dyn SpeechService>;
            (Some(commentary), Some(speech))
        }
        None => {
            info!("OPENAI_API_KEY not set; AI endpoints disabled.");
            (None, None)
        }
    };

    // --- 5. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db,
        storage,
        local_notes,
        commentary,
        speech,
        versions,
        progress,
        plan,
    });

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Public routes. Notes deliberately take no auth layer: the hybrid store
    // reads the session cookie itself and routes local when it is absent.
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/versions", get(list_versions_handler))
        .route("/bible/{book}/{chapter}", get(get_chapter_handler))
        .route("/search", get(search_handler))
        .route("/plan", get(plan_handler))
        .route("/plan/sections", get(plan_sections_handler))
        .route("/plan/days/{day}/toggle", post(toggle_day_handler))
        .route("/notes", get(list_notes_handler).post(upsert_note_handler))
        .route("/notes/{id}", delete(delete_note_handler))
        .route("/ai/analyze", post(analyze_handler))
        .route("/ai/speech", post(speech_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new().route("/me", get(me_handler)).layer(
        axum_middleware::from_fn_with_state(app_state.clone(), require_auth),
    );

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
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
    axum::serve(listener, app).await?;

    Ok(())
}
