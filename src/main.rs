use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod state;

use state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting forum API in {:?} mode", config.environment);

    let store = database::Store::connect(config)
        .unwrap_or_else(|e| panic!("failed to initialize database pool: {}", e));
    let state = AppState { store };

    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Forum API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(root).fallback(no_route))
        .route("/health", get(health))
        .merge(users_routes())
        .merge(posts_routes())
        .merge(subreddits_routes())
        .merge(votes_routes())
        // Catch-all for unmatched paths
        .fallback(no_route)
        // Global middleware; auth resolution runs before routing
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth_middleware,
        ))
        .layer(TraceLayer::new_for_http());

    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

// Method mismatches on known paths fall through to the same "No route
// found." envelope as unknown paths, hence the per-route fallbacks.

fn users_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users/register", post(users::register_post).fallback(no_route))
        .route("/users/login", post(users::login_post).fallback(no_route))
        .route("/users/token", get(users::token_get).fallback(no_route))
}

fn posts_routes() -> Router<AppState> {
    use handlers::posts;

    Router::new()
        .route(
            "/posts",
            get(posts::posts_get).post(posts::posts_post).fallback(no_route),
        )
        .route(
            "/posts/:postId",
            put(posts::posts_put)
                .delete(posts::posts_delete)
                .fallback(no_route),
        )
}

fn subreddits_routes() -> Router<AppState> {
    use handlers::subreddits;

    Router::new()
        .route(
            "/subreddits",
            get(subreddits::subreddits_get)
                .post(subreddits::subreddits_post)
                .fallback(no_route),
        )
        .route(
            "/subreddits/:subredditId",
            delete(subreddits::subreddits_delete).fallback(no_route),
        )
}

fn votes_routes() -> Router<AppState> {
    use handlers::votes;

    Router::new()
        .route(
            "/votes/upvotes/:postId",
            post(votes::upvote_post)
                .delete(votes::upvote_delete)
                .fallback(no_route),
        )
        .route(
            "/votes/downvotes/:postId",
            post(votes::downvote_post)
                .delete(votes::downvote_delete)
                .fallback(no_route),
        )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to the Reddit server!",
    }))
}

async fn no_route() -> Json<Value> {
    Json(json!({ "success": false, "error": "No route found." }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
