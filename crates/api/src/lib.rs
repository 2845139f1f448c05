pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use state::AppState;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Audio uploads; the limit sits above the gateway's audio ceiling
    let upload_limit = DefaultBodyLimit::max(state.settings.app.max_upload_bytes);

    let transcription_routes = Router::new()
        .route("/", post(routes::transcription::transcribe))
        .route("/backend", get(routes::transcription::backends))
        .layer(upload_limit.clone());

    let assessment_routes = Router::new()
        .route("/", post(routes::assessment::assess))
        .route("/backend", get(routes::assessment::backends));

    let recitation_routes = Router::new()
        .route("/", post(routes::recitation::recite))
        .layer(upload_limit);

    // Per-user history and progress
    let user_routes = Router::new()
        .route("/attempt", get(routes::user::attempts))
        .route("/attempt/{attempt_id}", get(routes::user::attempt))
        .route("/mastery", get(routes::user::mastery))
        .route("/mastery/{chapter}", get(routes::user::mastery_chapter));

    let api = Router::new()
        .route("/passage", post(routes::passage::resolve))
        .route("/attempt", post(routes::attempt::save))
        .nest("/transcription", transcription_routes)
        .nest("/assessment", assessment_routes)
        .nest("/recitation", recitation_routes)
        .nest("/user/{user_id}", user_routes);

    let health = Router::new().route("/health", get(health_check));

    let mut router = Router::new().nest("/api", api).merge(health);
    if state.settings.app.dev_mode {
        router = router.layer(middleware::from_fn(error::expose_internal_detail));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
