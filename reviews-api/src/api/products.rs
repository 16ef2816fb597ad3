//! Product review endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use reviews_core::report::{self, ProductReport};
use reviews_core::NewReview;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ApiError;
use crate::AppState;

/// POST /product/:external_id/review body
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub shop_id: String,
    pub review: NewReview,
}

#[derive(Debug, Serialize)]
pub struct CreateReviewResponse {
    pub message: String,
}

/// GET /product/:external_id/review
///
/// Returns the product report, or 404 when the product is unknown or has
/// no reviews of any kind.
pub async fn get_product_reviews(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<ProductReport>, ApiError> {
    let report = match report::product_report(state.store.as_ref(), &external_id).await {
        Ok(report) => report,
        Err(reviews_core::Error::NotFound(_)) => {
            return Err(ApiError::NotFound("Product not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    if report.is_empty() {
        return Err(ApiError::NotFound("Reviews not found".to_string()));
    }

    debug!(
        external_id = %external_id,
        reviews = report.reviews.len(),
        "Served product reviews"
    );

    Ok(Json(report))
}

/// POST /product/:external_id/review
///
/// Runs the full submission pipeline; the review is stored only when
/// synthesis succeeds.
pub async fn create_review(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
    body: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateReviewResponse>), ApiError> {
    let Json(request) = body?;

    let receipt = state
        .submissions
        .submit(&external_id, &request.shop_id, request.review)
        .await?;

    info!(
        external_id = %external_id,
        review_id = receipt.review_id,
        "Created review via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateReviewResponse {
            message: "Review created".to_string(),
        }),
    ))
}
