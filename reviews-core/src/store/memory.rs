//! In-process review store

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{CommittedBatch, ReviewStore, SubmissionBatch};
use crate::model::{Product, ProductId, RatingSummary, Review, ReviewId};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    reviews: Vec<Review>,
    next_product_id: ProductId,
    next_review_id: ReviewId,
}

impl State {
    fn product_mut(&mut self, id: ProductId) -> Result<&mut Product> {
        self.products
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| Error::NotFound(format!("Product with id {} not found", id)))
    }

    /// Fail if `put_review` would not accept the review
    fn check_review(&self, review: &Review) -> Result<()> {
        if !self.products.iter().any(|p| p.id == Some(review.product_id)) {
            return Err(Error::NotFound(format!(
                "Product with id {} not found",
                review.product_id
            )));
        }

        if let Some(id) = review.id {
            if !self.reviews.iter().any(|r| r.id == Some(id)) {
                return Err(Error::NotFound(format!("Review with id {} not found", id)));
            }
        } else if review.is_synthetic
            && self
                .reviews
                .iter()
                .any(|r| r.product_id == review.product_id && r.is_synthetic)
        {
            return Err(Error::Storage(format!(
                "Product with id {} already has a summary review",
                review.product_id
            )));
        }

        Ok(())
    }

    /// Store a review already accepted by `check_review`
    fn put_review(&mut self, mut review: Review) -> ReviewId {
        match review.id {
            Some(id) => {
                review.updated_at = Utc::now();
                if let Some(slot) = self.reviews.iter_mut().find(|r| r.id == Some(id)) {
                    *slot = review;
                }
                id
            }
            None => {
                self.next_review_id += 1;
                let id = self.next_review_id;
                review.id = Some(id);
                self.reviews.push(review);
                id
            }
        }
    }
}

/// Review store kept entirely in memory
///
/// Used for tests and for running the pipeline without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Total number of stored reviews across all products
    pub fn review_count(&self) -> usize {
        self.state().reviews.len()
    }
}

fn ordered_reviews(state: &State, product_id: ProductId) -> Vec<Review> {
    let mut reviews: Vec<Review> = state
        .reviews
        .iter()
        .filter(|r| r.product_id == product_id)
        .cloned()
        .collect();
    reviews.sort_by_key(|r| (!r.is_synthetic, r.id));
    reviews
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn get_product(&self, external_id: &str) -> Result<Option<Product>> {
        Ok(self
            .state()
            .products
            .iter()
            .find(|p| p.external_id == external_id)
            .cloned())
    }

    async fn get_reviews(&self, external_id: &str) -> Result<Vec<Review>> {
        let state = self.state();
        let product_id = state
            .products
            .iter()
            .find(|p| p.external_id == external_id)
            .and_then(|p| p.id);

        Ok(product_id
            .map(|id| ordered_reviews(&state, id))
            .unwrap_or_default())
    }

    async fn find_synthetic_review(&self, product_id: ProductId) -> Result<Option<Review>> {
        Ok(self
            .state()
            .reviews
            .iter()
            .find(|r| r.product_id == product_id && r.is_synthetic)
            .cloned())
    }

    async fn upsert_review(&self, review: Review) -> Result<ReviewId> {
        let mut state = self.state();
        state.check_review(&review)?;
        Ok(state.put_review(review))
    }

    async fn save_product(&self, mut product: Product) -> Result<ProductId> {
        let mut state = self.state();

        match product.id {
            Some(id) => {
                let slot = state.product_mut(id)?;
                product.updated_at = Utc::now();
                *slot = product;
                Ok(id)
            }
            None => {
                if state
                    .products
                    .iter()
                    .any(|p| p.external_id == product.external_id)
                {
                    return Err(Error::Storage(format!(
                        "Product with external id {} already exists",
                        product.external_id
                    )));
                }
                state.next_product_id += 1;
                let id = state.next_product_id;
                product.id = Some(id);
                state.products.push(product);
                Ok(id)
            }
        }
    }

    async fn commit_submission(&self, batch: SubmissionBatch) -> Result<CommittedBatch> {
        let mut state = self.state();

        // Validate everything before the first write
        if let Some(summary) = &batch.summary {
            state.check_review(summary)?;
        }
        state.check_review(&batch.review)?;

        let summary_id = batch.summary.map(|summary| state.put_review(summary));
        if let Some(keywords) = batch.keywords {
            let product = state.product_mut(batch.review.product_id)?;
            product.keywords = Some(keywords);
            product.updated_at = Utc::now();
        }
        let review_id = state.put_review(batch.review);

        Ok(CommittedBatch {
            summary_id,
            review_id,
        })
    }

    async fn products_by_shop(&self, shop_id: &str) -> Result<Vec<Product>> {
        Ok(self
            .state()
            .products
            .iter()
            .filter(|p| p.shop_id == shop_id)
            .cloned()
            .collect())
    }

    async fn rating_summary(&self, external_id: &str) -> Result<RatingSummary> {
        let reviews = self.get_reviews(external_id).await?;
        Ok(RatingSummary::from_reviews(&reviews))
    }
}
