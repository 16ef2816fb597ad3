//! Aggregated review read model

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{Product, RatingSummary, Review};
use crate::store::ReviewStore;
use crate::{Error, Result};

/// A human review as presented to shops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub author: String,
    pub title: String,
    pub content: String,
    pub rating: i32,
    pub review_date: String,
}

impl From<&Review> for ReviewEntry {
    fn from(review: &Review) -> Self {
        Self {
            author: review.author.clone(),
            title: review.title.clone(),
            content: review.content.clone(),
            rating: review.rating,
            review_date: review.created_at.to_rfc3339(),
        }
    }
}

/// Aggregated review data for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    /// External id of the product
    #[serde(rename = "id")]
    pub external_id: String,
    pub average_rating: f64,
    pub reviews_quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub reviews: Vec<ReviewEntry>,
}

impl ProductReport {
    /// Build a full report from a product, its stored reviews and their aggregate
    pub fn new(product: &Product, reviews: &[Review], rating: RatingSummary) -> Self {
        Self {
            external_id: product.external_id.clone(),
            average_rating: rating.average_rating,
            reviews_quantity: rating.reviews_quantity,
            ai_summary: reviews
                .iter()
                .find(|r| r.is_synthetic)
                .map(|r| r.content.clone()),
            keywords: product.keyword_list(),
            reviews: reviews
                .iter()
                .filter(|r| !r.is_synthetic)
                .map(ReviewEntry::from)
                .collect(),
        }
    }

    /// Build a listing entry carrying only the aggregate
    pub fn summary_only(product: &Product, rating: RatingSummary) -> Self {
        Self {
            external_id: product.external_id.clone(),
            average_rating: rating.average_rating,
            reviews_quantity: rating.reviews_quantity,
            ai_summary: None,
            keywords: Vec::new(),
            reviews: Vec::new(),
        }
    }

    /// Whether the product has no reviews of any kind
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty() && self.ai_summary.is_none()
    }
}

/// Products of one shop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopReport {
    pub products: Vec<ProductReport>,
}

/// Load the full report for a product
///
/// Fails with `NotFound` when the product is unknown.
pub async fn product_report(store: &dyn ReviewStore, external_id: &str) -> Result<ProductReport> {
    let product = store
        .get_product(external_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Product {} not found", external_id)))?;

    let reviews = store.get_reviews(external_id).await?;
    let rating = store.rating_summary(external_id).await?;

    Ok(ProductReport::new(&product, &reviews, rating))
}

/// Load aggregate-only entries for every product of a shop
///
/// Products whose aggregate cannot be computed are left out of the listing.
pub async fn shop_report(store: &dyn ReviewStore, shop_id: &str) -> Result<ShopReport> {
    let mut products = Vec::new();

    for product in store.products_by_shop(shop_id).await? {
        match store.rating_summary(&product.external_id).await {
            Ok(rating) => products.push(ProductReport::summary_only(&product, rating)),
            Err(e) => {
                warn!(
                    shop_id = %shop_id,
                    external_id = %product.external_id,
                    error = %e,
                    "Skipping product without aggregate"
                );
            }
        }
    }

    Ok(ShopReport { products })
}
