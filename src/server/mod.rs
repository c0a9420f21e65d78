//! # HTTP Server for the Label Editor
//!
//! Serves the single-page editor and a JSON API over the current label.
//!
//! ## Usage
//!
//! ```bash
//! labelkit serve --listen 0.0.0.0:8080 --device /dev/usb/lp0
//! ```
//!
//! Then open http://localhost:8080 in a browser.
//!
//! ## Routes
//!
//! | Method | Path | Gated |
//! |--------|------|-------|
//! | GET | `/`, `/assets/*path` | no |
//! | GET | `/api/sizes` | no |
//! | GET | `/api/session` | no |
//! | POST | `/api/session/sign-in`, `/api/session/sign-out` | no |
//! | GET, PUT, PATCH | `/api/label` | yes |
//! | POST | `/api/label/reset` | yes |
//! | GET | `/api/label/advisory` | yes |
//! | GET | `/api/label/preview?safe_zone=bool` | yes |
//! | POST | `/api/label/print` | yes |
//!
//! Gated routes answer 401 when the access policy requires sign-in and the
//! client sends no valid session token (cookie or bearer).

mod handlers;
mod state;
mod static_files;

pub use handlers::label::PREVIEW_STATE_HEADER;
pub use state::AppState;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::LabelKitError;

/// Build the router over shared state.
pub fn app(state: Arc<AppState>) -> Router {
    let label_routes = Router::new()
        .route(
            "/api/label",
            get(handlers::label::get)
                .put(handlers::label::put)
                .patch(handlers::label::patch),
        )
        .route("/api/label/reset", post(handlers::label::reset))
        .route("/api/label/advisory", get(handlers::label::advisory))
        .route("/api/label/preview", get(handlers::label::preview))
        .route("/api/label/print", post(handlers::label::print))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_session,
        ));

    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // Open API
        .route("/api/sizes", get(handlers::label::sizes))
        .route("/api/session", get(handlers::session::get))
        .route("/api/session/sign-in", post(handlers::session::sign_in))
        .route("/api/session/sign-out", post(handlers::session::sign_out))
        .merge(label_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use labelkit::config::AppConfig;
/// use labelkit::server::serve;
///
/// # async fn example() -> Result<(), labelkit::error::LabelKitError> {
/// serve(AppConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: AppConfig) -> Result<(), LabelKitError> {
    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::from_config(config)?);

    tracing::info!(
        listen = %listen_addr,
        print_target = %state.print_target,
        store = %state.config.store_path.display(),
        policy = %state.policy,
        "labelkit server starting"
    );

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| LabelKitError::Config(format!("Failed to bind to {}: {}", listen_addr, e)))?;

    tracing::info!("open http://{}/ in your browser", listen_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
