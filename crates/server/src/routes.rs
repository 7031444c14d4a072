use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::handlers::{self, login, orders, products};
use crate::middleware::{envelope_bare_failures, record_failures, require_bearer};
use crate::state::AppState;

/// Build the full application router: public health and login routes plus
/// the bearer-protected product and order routes.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/login", post(login::login));

    let protected = Router::new()
        .route("/v1/products", post(products::add_product).get(products::get_products))
        .route("/v1/products/:id", put(products::update_product).delete(products::delete_product))
        .route("/v1/orders", get(orders::get_orders))
        .route("/v1/orders/:id", put(orders::update_order).delete(orders::delete_order))
        .route_layer(middleware::from_fn(require_bearer));

    public
        .merge(protected)
        .with_state(state.clone())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(envelope_bare_failures))
        .layer(middleware::from_fn_with_state(state, record_failures))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
