use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use models::product::ProductRequest;
use serde::Deserialize;

use crate::envelope::respond;
use crate::errors::ApiError;
use crate::extract::{NumberField, PathId, Payload};
use crate::state::AppState;

/// Product fields as submitted. Numbers are kept raw until the field rules
/// can name the offending one.
#[derive(Debug, Deserialize)]
pub struct ProductBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock: Option<NumberField>,
    #[serde(default)]
    pub price: Option<NumberField>,
}

impl ProductBody {
    fn into_request(self) -> Result<ProductRequest, ApiError> {
        let price = NumberField::parse("price", self.price.as_ref())?;
        let stock = NumberField::parse("stock", self.stock.as_ref())?;
        let req = ProductRequest::new(&self.name, self.description.as_deref().unwrap_or_default(), stock, price);
        req.validate().into_result()?;
        Ok(req)
    }
}

pub async fn add_product(State(state): State<AppState>, Payload(body): Payload<ProductBody>) -> Result<Response, ApiError> {
    let req = body.into_request()?;
    let product = state.products.add_product(req).await?;
    Ok(respond(StatusCode::CREATED, product))
}

pub async fn get_products(State(state): State<AppState>) -> Result<Response, ApiError> {
    let products = state.products.get_products().await?;
    Ok(respond(StatusCode::OK, products))
}

pub async fn update_product(
    State(state): State<AppState>,
    PathId(id): PathId,
    Payload(body): Payload<ProductBody>,
) -> Result<Response, ApiError> {
    let req = body.into_request()?;
    let product = state.products.update_product(req, id).await?;
    Ok(respond(StatusCode::OK, product))
}

pub async fn delete_product(State(state): State<AppState>, PathId(id): PathId) -> Result<Response, ApiError> {
    state.products.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
