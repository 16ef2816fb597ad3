//! `ReviewStore` backed by SQLite

use async_trait::async_trait;
use reviews_core::model::{Product, ProductId, RatingSummary, Review, ReviewId};
use reviews_core::store::{CommittedBatch, SubmissionBatch};
use reviews_core::ReviewStore;
use tracing::debug;

use crate::repos::{products, reviews, ProductRepository, ReviewRepository};
use crate::Database;

/// Review store persisting products and reviews in SQLite
#[derive(Clone, Debug)]
pub struct SqliteReviewStore {
    db: Database,
}

impl SqliteReviewStore {
    /// Create a store over an open database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get the underlying database
    pub fn database(&self) -> &Database {
        &self.db
    }

    fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(self.db.pool())
    }

    fn reviews(&self) -> ReviewRepository<'_> {
        ReviewRepository::new(self.db.pool())
    }

    /// Apply a submission batch inside one transaction
    async fn commit(&self, batch: &SubmissionBatch) -> crate::Result<CommittedBatch> {
        let mut tx = self.db.pool().begin().await?;

        let summary_id = match &batch.summary {
            Some(summary) if summary.id.is_some() => {
                Some(reviews::update_review(&mut *tx, summary).await?)
            }
            Some(summary) => Some(reviews::insert_review(&mut *tx, summary).await?),
            None => None,
        };

        if let Some(keywords) = &batch.keywords {
            products::set_keywords(&mut *tx, batch.review.product_id, keywords).await?;
        }

        let review_id = reviews::insert_review(&mut *tx, &batch.review).await?;

        // Dropping the transaction before this point rolls every write back
        tx.commit().await?;

        debug!(
            product_id = batch.review.product_id,
            review_id,
            summary_id = ?summary_id,
            keywords = batch.keywords.is_some(),
            "Committed submission"
        );

        Ok(CommittedBatch {
            summary_id,
            review_id,
        })
    }
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    async fn get_product(&self, external_id: &str) -> reviews_core::Result<Option<Product>> {
        Ok(self.products().get_by_external_id(external_id).await?)
    }

    async fn get_reviews(&self, external_id: &str) -> reviews_core::Result<Vec<Review>> {
        Ok(self.reviews().list_by_external_id(external_id).await?)
    }

    async fn find_synthetic_review(
        &self,
        product_id: ProductId,
    ) -> reviews_core::Result<Option<Review>> {
        Ok(self.reviews().find_synthetic(product_id).await?)
    }

    async fn upsert_review(&self, review: Review) -> reviews_core::Result<ReviewId> {
        Ok(self.reviews().upsert(&review).await?)
    }

    async fn save_product(&self, product: Product) -> reviews_core::Result<ProductId> {
        let products = self.products();
        let id = match product.id {
            Some(_) => products.update(&product).await?,
            None => products.create(&product).await?,
        };
        Ok(id)
    }

    async fn commit_submission(
        &self,
        batch: SubmissionBatch,
    ) -> reviews_core::Result<CommittedBatch> {
        Ok(self.commit(&batch).await?)
    }

    async fn products_by_shop(&self, shop_id: &str) -> reviews_core::Result<Vec<Product>> {
        Ok(self.products().list_by_shop(shop_id).await?)
    }

    async fn rating_summary(&self, external_id: &str) -> reviews_core::Result<RatingSummary> {
        Ok(self.reviews().rating_summary(external_id).await?)
    }
}
