use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use booking::Resolver;
use configuration::Settings;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod auth;
pub mod error;
pub mod handlers;

use crate::auth::{require_auth, JwtVerifier};

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    pub verifier: JwtVerifier,
}

/// Builds the application router: a public health probe plus the
/// reservation routes, which sit behind the bearer-token middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    let protected = Router::new()
        .route(
            "/api/reservations",
            get(handlers::list_reservations).post(handlers::create_reservation),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(protected)
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(settings: Settings, resolver: Resolver) -> anyhow::Result<()> {
    let verifier = JwtVerifier::new(&settings.auth.jwt_secret);
    let app_state = Arc::new(AppState { resolver, verifier });

    let app = build_router(app_state);
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
