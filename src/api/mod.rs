//! axum HTTP surface: the public `/has-septic` lookup plus the Basic-auth protected
//! admin API under `/api/`.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use registry::{API_CLIENTS, PROPERTIES};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/", get(handlers::index))
        .route(
            API_CLIENTS.path,
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            &format!("{}/:id", API_CLIENTS.path),
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route(PROPERTIES.path, get(handlers::list_properties))
        .route(
            &format!("{}/:id", PROPERTIES.path),
            get(handlers::get_property).delete(handlers::delete_property),
        )
        .route(
            &format!("{}/:id/refresh", PROPERTIES.path),
            post(handlers::refresh_property),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_client_credentials,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/has-septic", get(handlers::has_septic))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
