//! Review submission handling
//!
//! A submission is the only path that persists a human review. Both triggers
//! are evaluated on one snapshot of the stored reviews, both completions run
//! before anything is written, and the summary, keywords and pending review
//! are then committed together. A failed generation leaves the store
//! untouched, so the trigger fires again on retry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::OwnedMutexGuard;
use tracing::{info, warn};

use super::coordinator::{Draft, SynthesisCoordinator, SynthesisOutcome};
use crate::config::SynthesisConfig;
use crate::model::{NewReview, Product, ProductId, Review, ReviewId};
use crate::store::{ReviewStore, SubmissionBatch};
use crate::{Error, Result};

/// Result of an accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub product_id: ProductId,
    pub review_id: ReviewId,
    /// Whether this submission created the product
    pub product_created: bool,
    pub summary: SynthesisOutcome,
    pub keywords: SynthesisOutcome,
}

/// Per-product async locks serializing submissions for the same external id
///
/// An entry lives only while some submission holds or awaits it.
#[derive(Debug, Default)]
struct ProductLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProductLocks {
    async fn acquire(&self, external_id: &str) -> ProductGuard<'_> {
        let lock = self.map().entry(external_id.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        ProductGuard {
            locks: self,
            key: external_id.to_string(),
            guard: Some(guard),
        }
    }

    fn release(&self, external_id: &str) {
        let mut locks = self.map();
        // The map's own reference is the last one once no guard or waiter remains
        let idle = locks
            .get(external_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            locks.remove(external_id);
        }
    }

    fn map(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<()>>>> {
        self.locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.map().len()
    }
}

/// Held product lock; drops the map entry when nobody else needs it
struct ProductGuard<'a> {
    locks: &'a ProductLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ProductGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.key);
    }
}

/// Accepts new human reviews and keeps derived content in step with them
pub struct SubmissionHandler {
    store: Arc<dyn ReviewStore>,
    coordinator: SynthesisCoordinator,
    min_rating: i32,
    max_rating: i32,
    locks: ProductLocks,
}

impl SubmissionHandler {
    /// Create a handler around a coordinator sharing the same store
    pub fn new(
        store: Arc<dyn ReviewStore>,
        coordinator: SynthesisCoordinator,
        config: &SynthesisConfig,
    ) -> Self {
        Self {
            store,
            coordinator,
            min_rating: config.min_rating,
            max_rating: config.max_rating,
            locks: ProductLocks::default(),
        }
    }

    /// Get the underlying coordinator
    pub fn coordinator(&self) -> &SynthesisCoordinator {
        &self.coordinator
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<dyn ReviewStore> {
        &self.store
    }

    /// Submit a human review for a product, creating the product if unseen
    ///
    /// Summary and keywords are drafted against the reviews already stored,
    /// then committed together with the pending review.
    pub async fn submit(
        &self,
        external_id: &str,
        shop_id: &str,
        review: NewReview,
    ) -> Result<SubmissionReceipt> {
        if let Err(e) = self.validate(external_id, shop_id, &review) {
            warn!(external_id = %external_id, error = %e, "Rejected review submission");
            return Err(e);
        }

        let _guard = self.locks.acquire(external_id).await;

        let (product_id, product_created) = match self.store.get_product(external_id).await? {
            Some(product) => {
                let id = product.id.ok_or_else(|| {
                    Error::Storage(format!("Stored product {} has no id", external_id))
                })?;
                (id, false)
            }
            None => {
                let id = self
                    .store
                    .save_product(Product::new(external_id, shop_id))
                    .await?;
                info!(external_id = %external_id, shop_id = %shop_id, product_id = id, "Created product");
                (id, true)
            }
        };

        let plan = self.coordinator.prepare(external_id).await?;

        let (summary_skipped, summary_draft) = match plan.summary {
            Draft::Skipped(outcome) => (Some(outcome), None),
            Draft::Ready(summary) => (None, Some(summary)),
        };
        let rewrite_id = summary_draft.as_ref().and_then(|summary| summary.id);

        let committed = self
            .store
            .commit_submission(SubmissionBatch {
                summary: summary_draft,
                keywords: plan.keywords.clone().ready(),
                review: Review::human(product_id, review),
            })
            .await?;

        let summary = match (summary_skipped, rewrite_id, committed.summary_id) {
            (Some(outcome), _, _) => outcome,
            (None, Some(review_id), _) => SynthesisOutcome::SummaryUpdated { review_id },
            (None, None, Some(review_id)) => SynthesisOutcome::SummaryCreated { review_id },
            (None, None, None) => {
                return Err(Error::Storage(format!(
                    "Summary for {} was not assigned an id",
                    external_id
                )));
            }
        };
        let keywords = match plan.keywords {
            Draft::Skipped(outcome) => outcome,
            Draft::Ready(keywords) => SynthesisOutcome::KeywordsUpdated { keywords },
        };

        info!(
            external_id = %external_id,
            review_id = committed.review_id,
            review_count = plan.review_count,
            summary = %summary,
            keywords = %keywords,
            "Review submitted"
        );

        Ok(SubmissionReceipt {
            product_id,
            review_id: committed.review_id,
            product_created,
            summary,
            keywords,
        })
    }

    fn validate(&self, external_id: &str, shop_id: &str, review: &NewReview) -> Result<()> {
        let required = [
            ("external id", external_id),
            ("shop id", shop_id),
            ("author", review.author.as_str()),
            ("title", review.title.as_str()),
            ("content", review.content.as_str()),
        ];

        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::InvalidInput(format!("{} is required", field)));
        }

        if !(self.min_rating..=self.max_rating).contains(&review.rating) {
            return Err(Error::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                self.min_rating, self.max_rating, review.rating
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for SubmissionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionHandler")
            .field("coordinator", &self.coordinator)
            .field("min_rating", &self.min_rating)
            .field("max_rating", &self.max_rating)
            .finish_non_exhaustive()
    }
}
