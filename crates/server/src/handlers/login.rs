use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use models::admin::LoginRequest;

use crate::envelope::respond;
use crate::errors::ApiError;
use crate::extract::Payload;
use crate::state::AppState;

pub async fn login(State(state): State<AppState>, Payload(req): Payload<LoginRequest>) -> Result<Response, ApiError> {
    req.validate().into_result()?;
    let resp = state.auth.login(req).await?;
    Ok(respond(StatusCode::OK, resp))
}
