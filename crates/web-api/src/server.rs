use crate::{handlers, health, state::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use capfund_core::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Routes served by the allocation API.
///
/// `/docs` answers like `/health`: the browser client probes it to decide
/// whether the backend is reachable.
pub const ROUTES: [&str; 3] = ["POST /calculate", "GET /health", "GET /docs"];

/// HTTP front end for the allocation engine.
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    #[must_use]
    pub const fn new(state: AppState) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(AppState::from_config(config))
    }

    /// Builds the router. CORS is open to any origin since the browser form
    /// is served from a different host than the API.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/calculate", post(handlers::calculate))
            .route("/health", get(health::health))
            .route("/docs", get(health::health))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Binds `addr` and serves allocation requests until the listener fails.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            "Allocation API listening on {} (max {} assets per request; routes: {})",
            addr,
            self.state.max_assets,
            ROUTES.join(", ")
        );

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
