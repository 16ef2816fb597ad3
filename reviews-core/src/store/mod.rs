//! Review store abstraction
//!
//! The synthesis pipeline only sees storage through [`ReviewStore`], so the
//! SQLite implementation and the in-memory one are interchangeable.

mod memory;

use async_trait::async_trait;

use crate::model::{Product, ProductId, RatingSummary, Review, ReviewId};
use crate::Result;

pub use memory::MemoryStore;

/// Writes of one accepted submission, applied all-or-nothing
#[derive(Debug, Clone)]
pub struct SubmissionBatch {
    /// Summary review to create (no id) or rewrite (with id)
    pub summary: Option<Review>,
    /// Keyword string to overwrite on the review's product
    pub keywords: Option<String>,
    /// The human review being submitted
    pub review: Review,
}

/// Ids assigned by [`ReviewStore::commit_submission`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedBatch {
    pub summary_id: Option<ReviewId>,
    pub review_id: ReviewId,
}

/// Persistence operations the pipeline and read model rely on
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Look up a product by its external id
    async fn get_product(&self, external_id: &str) -> Result<Option<Product>>;

    /// List every stored review of a product, synthesized ones first
    ///
    /// An unknown product yields an empty list.
    async fn get_reviews(&self, external_id: &str) -> Result<Vec<Review>>;

    /// Find the synthesized summary review of a product, if any
    async fn find_synthetic_review(&self, product_id: ProductId) -> Result<Option<Review>>;

    /// Insert a review without an id, or update the one with its id
    async fn upsert_review(&self, review: Review) -> Result<ReviewId>;

    /// Insert a product without an id, or update the one with its id
    async fn save_product(&self, product: Product) -> Result<ProductId>;

    /// Apply summary, keywords and the human review together
    ///
    /// Either every write of the batch is stored or none is.
    async fn commit_submission(&self, batch: SubmissionBatch) -> Result<CommittedBatch>;

    /// List all products of a shop
    async fn products_by_shop(&self, shop_id: &str) -> Result<Vec<Product>>;

    /// Aggregate the human reviews of a product
    async fn rating_summary(&self, external_id: &str) -> Result<RatingSummary>;
}
