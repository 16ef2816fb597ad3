//! Product and review records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author and title carried by every synthesized summary review
pub const SYNTHETIC_LABEL: &str = "AI Generated Summary Review";

/// Rating stored on synthesized reviews; not a real rating
pub const SYNTHETIC_RATING: i32 = 0;

/// Internal surrogate key of a product
pub type ProductId = i64;

/// Internal surrogate key of a review
pub type ReviewId = i64;

/// A shop product that reviews are collected for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Surrogate id (None until first saved)
    pub id: Option<ProductId>,

    /// Shop-supplied stable identifier
    pub external_id: String,

    /// Shop the product belongs to
    pub shop_id: String,

    /// Comma-joined keyword tokens derived from the reviews
    pub keywords: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create a new, unsaved product
    pub fn new(external_id: impl Into<String>, shop_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            external_id: external_id.into(),
            shop_id: shop_id.into(),
            keywords: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Split the stored keywords on commas
    ///
    /// Tokens are returned exactly as stored. An unset or empty field yields no tokens.
    pub fn keyword_list(&self) -> Vec<String> {
        match self.keywords.as_deref() {
            Some(raw) if !raw.is_empty() => raw.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether a keyword set has been generated
    pub fn has_keywords(&self) -> bool {
        self.keywords.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// A review record, human-written or synthesized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Surrogate id (None until first saved)
    pub id: Option<ReviewId>,

    /// Owning product
    pub product_id: ProductId,

    pub author: String,
    pub title: String,
    pub content: String,

    /// Rating; `SYNTHETIC_RATING` on synthesized reviews
    pub rating: i32,

    /// Whether the content came from the completion service
    pub is_synthetic: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Create a new, unsaved human review for a product
    pub fn human(product_id: ProductId, review: NewReview) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            product_id,
            author: review.author,
            title: review.title,
            content: review.content,
            rating: review.rating,
            is_synthetic: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new, unsaved synthesized summary review
    pub fn synthetic_summary(product_id: ProductId, summary: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            product_id,
            author: SYNTHETIC_LABEL.to_string(),
            title: SYNTHETIC_LABEL.to_string(),
            content: summary.into(),
            rating: SYNTHETIC_RATING,
            is_synthetic: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the content of a synthesized review in place
    pub fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.updated_at = Utc::now();
    }
}

/// A human review as submitted, before it is bound to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
    pub author: String,
    pub title: String,
    pub content: String,
    pub rating: i32,
}

impl NewReview {
    /// Create a new pending review
    pub fn new(
        author: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        rating: i32,
    ) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            content: content.into(),
            rating,
        }
    }
}

/// Human review aggregates for a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Mean rating over human reviews (0.0 when there are none)
    pub average_rating: f64,

    /// Number of human reviews
    pub reviews_quantity: u64,
}

impl RatingSummary {
    /// Aggregate the human reviews in a slice, ignoring synthesized ones
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let ratings: Vec<i32> = reviews
            .iter()
            .filter(|r| !r.is_synthetic)
            .map(|r| r.rating)
            .collect();

        if ratings.is_empty() {
            return Self::default();
        }

        let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        Self {
            average_rating: total as f64 / ratings.len() as f64,
            reviews_quantity: ratings.len() as u64,
        }
    }
}

/// How much derived content a product currently has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynthesisState {
    /// No summary review and no keywords
    Unsynthesized,
    /// Exactly one of summary or keywords
    PartiallySynthesized,
    /// Both a summary review and keywords
    FullySynthesized,
}

impl SynthesisState {
    /// Derive the state from a product and its stored reviews
    pub fn of(product: &Product, reviews: &[Review]) -> Self {
        let has_summary = reviews.iter().any(|r| r.is_synthetic);
        match (has_summary, product.has_keywords()) {
            (false, false) => SynthesisState::Unsynthesized,
            (true, true) => SynthesisState::FullySynthesized,
            _ => SynthesisState::PartiallySynthesized,
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            SynthesisState::Unsynthesized => "no derived content",
            SynthesisState::PartiallySynthesized => "summary or keywords generated",
            SynthesisState::FullySynthesized => "summary and keywords generated",
        }
    }
}

impl std::fmt::Display for SynthesisState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn human(rating: i32) -> Review {
        Review::human(1, NewReview::new("ana", "ok", "fine", rating))
    }

    #[test]
    fn test_keyword_list_verbatim() {
        let mut product = Product::new("sku-1", "shop-1");
        assert!(product.keyword_list().is_empty());

        product.keywords = Some("fit,price, color".to_string());
        assert_eq!(product.keyword_list(), vec!["fit", "price", " color"]);
    }

    #[test]
    fn test_empty_keywords_not_counted() {
        let mut product = Product::new("sku-1", "shop-1");
        product.keywords = Some(String::new());
        assert!(!product.has_keywords());
        assert!(product.keyword_list().is_empty());
    }

    #[test]
    fn test_synthetic_summary_shape() {
        let review = Review::synthetic_summary(7, "Great value");
        assert!(review.is_synthetic);
        assert_eq!(review.rating, SYNTHETIC_RATING);
        assert_eq!(review.author, SYNTHETIC_LABEL);
        assert_eq!(review.title, SYNTHETIC_LABEL);
        assert_eq!(review.product_id, 7);
    }

    #[test]
    fn test_rating_summary_ignores_synthetic() {
        let reviews = vec![human(4), human(5), Review::synthetic_summary(1, "s")];
        let summary = RatingSummary::from_reviews(&reviews);
        assert_eq!(summary.reviews_quantity, 2);
        assert!((summary.average_rating - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rating_summary_empty() {
        let summary = RatingSummary::from_reviews(&[Review::synthetic_summary(1, "s")]);
        assert_eq!(summary, RatingSummary::default());
    }

    #[test]
    fn test_synthesis_state() {
        let mut product = Product::new("sku-1", "shop-1");
        let humans = vec![human(3)];
        assert_eq!(SynthesisState::of(&product, &humans), SynthesisState::Unsynthesized);

        product.keywords = Some("a,b".to_string());
        assert_eq!(
            SynthesisState::of(&product, &humans),
            SynthesisState::PartiallySynthesized
        );

        let with_summary = vec![human(3), Review::synthetic_summary(1, "s")];
        assert_eq!(
            SynthesisState::of(&product, &with_summary),
            SynthesisState::FullySynthesized
        );
    }
}
