use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use models::order::OrderRequest;

use crate::envelope::respond;
use crate::errors::ApiError;
use crate::extract::{PathId, Payload};
use crate::state::AppState;

pub async fn get_orders(State(state): State<AppState>) -> Result<Response, ApiError> {
    let orders = state.orders.get_orders().await?;
    Ok(respond(StatusCode::OK, orders))
}

/// Only `status` is read from the body; other order fields are ignored.
pub async fn update_order(
    State(state): State<AppState>,
    PathId(id): PathId,
    Payload(body): Payload<OrderRequest>,
) -> Result<Response, ApiError> {
    let req = OrderRequest::with_status(&body.status);
    req.validate().into_result()?;
    let order = state.orders.update_order(req, id).await?;
    Ok(respond(StatusCode::OK, order))
}

pub async fn delete_order(State(state): State<AppState>, PathId(id): PathId) -> Result<Response, ApiError> {
    state.orders.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
