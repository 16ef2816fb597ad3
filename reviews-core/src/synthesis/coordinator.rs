//! Synthesis coordinator
//!
//! Decides on each submission whether the AI summary and the keyword set are
//! due, builds the prompts and calls the completion service:
//! 1. Load every stored review of the product (synthesized included) once
//! 2. Evaluate both triggers on that count
//! 3. Generate from the human reviews only
//! 4. Hand back drafts; the caller applies them with the pending review
//!
//! `synchronize_summary` and `synchronize_keywords` run a single artifact and
//! write it immediately.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompts::{self, PromptKind};
use super::trigger::should_trigger;
use crate::completion::{require_text, CompletionService};
use crate::config::SynthesisConfig;
use crate::model::{Review, ReviewId};
use crate::store::ReviewStore;
use crate::{Error, Result};

/// What a synchronization pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynthesisOutcome {
    /// The product has no stored reviews yet
    NoReviews,
    /// The trigger did not fire for this count
    NotDue { review_count: u64 },
    /// The trigger fired but only synthesized reviews are stored
    NoHumanReviews,
    /// A summary review was created
    SummaryCreated { review_id: ReviewId },
    /// The existing summary review was rewritten
    SummaryUpdated { review_id: ReviewId },
    /// The product keywords were overwritten
    KeywordsUpdated { keywords: String },
}

impl SynthesisOutcome {
    /// Whether the completion service was called
    pub fn generated(&self) -> bool {
        matches!(
            self,
            SynthesisOutcome::SummaryCreated { .. }
                | SynthesisOutcome::SummaryUpdated { .. }
                | SynthesisOutcome::KeywordsUpdated { .. }
        )
    }
}

impl std::fmt::Display for SynthesisOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisOutcome::NoReviews => write!(f, "no reviews yet"),
            SynthesisOutcome::NotDue { review_count } => {
                write!(f, "not due at {} stored reviews", review_count)
            }
            SynthesisOutcome::NoHumanReviews => write!(f, "no human reviews to synthesize"),
            SynthesisOutcome::SummaryCreated { review_id } => {
                write!(f, "summary review #{} created", review_id)
            }
            SynthesisOutcome::SummaryUpdated { review_id } => {
                write!(f, "summary review #{} updated", review_id)
            }
            SynthesisOutcome::KeywordsUpdated { keywords } => {
                write!(f, "keywords set to '{}'", keywords)
            }
        }
    }
}

/// A generated artifact, or why none was generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft<T> {
    Skipped(SynthesisOutcome),
    Ready(T),
}

impl<T> Draft<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Draft::Ready(value) => Some(value),
            Draft::Skipped(_) => None,
        }
    }
}

/// Both artifacts drafted against one snapshot of a product's reviews
#[derive(Debug, Clone)]
pub struct SynthesisPlan {
    /// Stored reviews in the snapshot, summary included
    pub review_count: u64,
    /// Summary review to create (no id) or rewrite (with id)
    pub summary: Draft<Review>,
    /// Keyword string to store on the product
    pub keywords: Draft<String>,
}

/// Orchestrates trigger evaluation, prompt assembly, generation and upsert
#[derive(Clone)]
pub struct SynthesisCoordinator {
    store: Arc<dyn ReviewStore>,
    completion: Arc<dyn CompletionService>,
    summary_period: u64,
    keyword_period: u64,
}

impl SynthesisCoordinator {
    /// Create a coordinator over a store and a completion service
    pub fn new(
        store: Arc<dyn ReviewStore>,
        completion: Arc<dyn CompletionService>,
        config: &SynthesisConfig,
    ) -> Self {
        Self {
            store,
            completion,
            summary_period: config.summary_period,
            keyword_period: config.keyword_period,
        }
    }

    /// Draft the summary and keywords due for the stored reviews
    ///
    /// Nothing is written. Both triggers see the same count, taken before
    /// the pending submission is stored.
    pub async fn prepare(&self, external_id: &str) -> Result<SynthesisPlan> {
        let reviews = self.store.get_reviews(external_id).await?;

        let summary = self.draft_summary(external_id, &reviews).await?;
        let keywords = self.draft_keywords(external_id, &reviews).await?;

        Ok(SynthesisPlan {
            review_count: reviews.len() as u64,
            summary,
            keywords,
        })
    }

    /// Regenerate the AI summary review if the summary trigger fires
    pub async fn synchronize_summary(&self, external_id: &str) -> Result<SynthesisOutcome> {
        let reviews = self.store.get_reviews(external_id).await?;
        let summary = match self.draft_summary(external_id, &reviews).await? {
            Draft::Skipped(outcome) => return Ok(outcome),
            Draft::Ready(summary) => summary,
        };

        let rewrite = summary.id.is_some();
        let review_id = self.store.upsert_review(summary).await?;
        let outcome = if rewrite {
            SynthesisOutcome::SummaryUpdated { review_id }
        } else {
            SynthesisOutcome::SummaryCreated { review_id }
        };

        info!(external_id = %external_id, outcome = %outcome, "Summary synchronized");
        Ok(outcome)
    }

    /// Regenerate the product keywords if the keyword trigger fires
    pub async fn synchronize_keywords(&self, external_id: &str) -> Result<SynthesisOutcome> {
        let reviews = self.store.get_reviews(external_id).await?;
        let keywords = match self.draft_keywords(external_id, &reviews).await? {
            Draft::Skipped(outcome) => return Ok(outcome),
            Draft::Ready(keywords) => keywords,
        };

        let mut product = self
            .store
            .get_product(external_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Product {} not found", external_id)))?;

        product.keywords = Some(keywords.clone());
        self.store.save_product(product).await?;

        info!(external_id = %external_id, keywords = %keywords, "Keywords synchronized");
        Ok(SynthesisOutcome::KeywordsUpdated { keywords })
    }

    async fn draft_summary(&self, external_id: &str, reviews: &[Review]) -> Result<Draft<Review>> {
        if let Some(outcome) = self.skip(PromptKind::Summary, external_id, reviews) {
            return Ok(Draft::Skipped(outcome));
        }

        let prompt = prompts::build_summary_prompt(reviews);
        let text = self.generate(PromptKind::Summary, external_id, &prompt).await?;

        // Non-empty here, checked by skip()
        let product_id = reviews[0].product_id;

        let summary = match self.store.find_synthetic_review(product_id).await? {
            Some(mut existing) => {
                existing.replace_content(text);
                existing
            }
            None => Review::synthetic_summary(product_id, text),
        };

        debug!(external_id = %external_id, rewrite = summary.id.is_some(), "Summary drafted");
        Ok(Draft::Ready(summary))
    }

    async fn draft_keywords(&self, external_id: &str, reviews: &[Review]) -> Result<Draft<String>> {
        if let Some(outcome) = self.skip(PromptKind::Keywords, external_id, reviews) {
            return Ok(Draft::Skipped(outcome));
        }

        let prompt = prompts::build_keyword_prompt(reviews);
        let keywords = self.generate(PromptKind::Keywords, external_id, &prompt).await?;

        debug!(external_id = %external_id, keywords = %keywords, "Keywords drafted");
        Ok(Draft::Ready(keywords))
    }

    fn period(&self, kind: PromptKind) -> u64 {
        match kind {
            PromptKind::Summary => self.summary_period,
            PromptKind::Keywords => self.keyword_period,
        }
    }

    /// Return an outcome when no generation is needed
    fn skip(
        &self,
        kind: PromptKind,
        external_id: &str,
        reviews: &[Review],
    ) -> Option<SynthesisOutcome> {
        if reviews.is_empty() {
            debug!(external_id = %external_id, artifact = %kind, "No reviews stored, nothing to synthesize");
            return Some(SynthesisOutcome::NoReviews);
        }

        let review_count = reviews.len() as u64;
        let period = self.period(kind);
        let fired = should_trigger(review_count, period);

        debug!(
            external_id = %external_id,
            artifact = %kind,
            review_count,
            period,
            fired,
            "Evaluated synthesis trigger"
        );

        if !fired {
            return Some(SynthesisOutcome::NotDue { review_count });
        }

        if prompts::human_reviews(reviews).next().is_none() {
            return Some(SynthesisOutcome::NoHumanReviews);
        }

        None
    }

    async fn generate(&self, kind: PromptKind, external_id: &str, prompt: &str) -> Result<String> {
        let backend = self.completion.name();

        debug!(
            external_id = %external_id,
            artifact = %kind,
            backend,
            prompt_len = prompt.len(),
            "Requesting completion"
        );

        let completion = self.completion.generate(prompt).await.map_err(|e| match e {
            Error::Generation(_) => e,
            other => Error::Generation(format!("{} failed: {}", backend, other)),
        })?;

        require_text(backend, completion)
    }
}

impl std::fmt::Debug for SynthesisCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisCoordinator")
            .field("backend", &self.completion.name())
            .field("summary_period", &self.summary_period)
            .field("keyword_period", &self.keyword_period)
            .finish_non_exhaustive()
    }
}
