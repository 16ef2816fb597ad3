//! Shop listing endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use reviews_core::report::{self, ShopReport};

use super::ApiError;
use crate::AppState;

/// GET /shop/:shop_id/product
pub async fn get_shop_products(
    State(state): State<AppState>,
    Path(shop_id): Path<String>,
) -> Result<Json<ShopReport>, ApiError> {
    let listing = report::shop_report(state.store.as_ref(), &shop_id).await?;

    if listing.products.is_empty() {
        return Err(ApiError::NotFound("Products not found".to_string()));
    }

    Ok(Json(listing))
}
