//! Prompt assembly for summary and keyword generation
//!
//! Templates use a `{{REVIEWS}}` placeholder that is replaced with one line
//! per human review. Synthesized reviews never reach a prompt.

use crate::model::Review;

const SUMMARY_PROMPT: &str = include_str!("prompts/summary.md");
const KEYWORD_PROMPT: &str = include_str!("prompts/keywords.md");

const REVIEWS_PLACEHOLDER: &str = "{{REVIEWS}}";

/// Which derived artifact a prompt is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Short English synopsis of the reviews
    Summary,
    /// Comma-separated recurring keywords
    Keywords,
}

impl PromptKind {
    /// Get the raw template for this prompt kind
    pub fn template(&self) -> &'static str {
        match self {
            PromptKind::Summary => SUMMARY_PROMPT,
            PromptKind::Keywords => KEYWORD_PROMPT,
        }
    }

    /// Render one review as a prompt line
    fn line(&self, review: &Review) -> String {
        match self {
            PromptKind::Summary => format!("title:{} Review:{}", review.title, review.content),
            PromptKind::Keywords => review.content.clone(),
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptKind::Summary => write!(f, "summary"),
            PromptKind::Keywords => write!(f, "keywords"),
        }
    }
}

/// Reviews written by people, in their stored order
pub fn human_reviews(reviews: &[Review]) -> impl Iterator<Item = &Review> {
    reviews.iter().filter(|r| !r.is_synthetic)
}

/// Render a prompt of the given kind from a review sequence
pub fn render(kind: PromptKind, reviews: &[Review]) -> String {
    let lines = human_reviews(reviews)
        .map(|r| kind.line(r))
        .collect::<Vec<_>>()
        .join("\n");

    kind.template().replace(REVIEWS_PLACEHOLDER, &lines)
}

/// Build the summary prompt from title and content of each human review
pub fn build_summary_prompt(reviews: &[Review]) -> String {
    render(PromptKind::Summary, reviews)
}

/// Build the keyword prompt from the content of each human review
pub fn build_keyword_prompt(reviews: &[Review]) -> String {
    render(PromptKind::Keywords, reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewReview;

    fn reviews() -> Vec<Review> {
        vec![
            Review::synthetic_summary(1, "PREVIOUS SUMMARY"),
            Review::human(1, NewReview::new("ana", "Comfy", "Soft fabric, runs small", 4)),
            Review::human(1, NewReview::new("bo", "Meh", "Runs small and pricey", 2)),
        ]
    }

    #[test]
    fn test_summary_prompt_contains_titles_and_content() {
        let prompt = build_summary_prompt(&reviews());
        assert!(prompt.contains("in English"));
        assert!(prompt.contains("200 characters"));
        assert!(prompt.contains("title:Comfy Review:Soft fabric, runs small"));
        assert!(prompt.contains("title:Meh Review:Runs small and pricey"));
        assert!(!prompt.contains(REVIEWS_PLACEHOLDER));
    }

    #[test]
    fn test_keyword_prompt_contains_content_only() {
        let prompt = build_keyword_prompt(&reviews());
        assert!(prompt.contains("word1,word2,word3,word4,word5"));
        assert!(prompt.contains("Soft fabric, runs small\nRuns small and pricey"));
        assert!(!prompt.contains("title:"));
        assert!(!prompt.contains("Comfy"));
    }

    #[test]
    fn test_synthetic_content_excluded() {
        let reviews = reviews();
        assert!(!build_summary_prompt(&reviews).contains("PREVIOUS SUMMARY"));
        assert!(!build_keyword_prompt(&reviews).contains("PREVIOUS SUMMARY"));
        assert!(!build_summary_prompt(&reviews).contains("title:AI Generated"));
    }

    #[test]
    fn test_empty_input_still_renders_directive() {
        let prompt = build_summary_prompt(&[]);
        assert!(prompt.contains("summary of the following product reviews"));
        assert!(!prompt.contains(REVIEWS_PLACEHOLDER));

        let only_synthetic = vec![Review::synthetic_summary(1, "x")];
        let prompt = build_keyword_prompt(&only_synthetic);
        assert!(prompt.contains("keywords"));
        assert!(!prompt.contains(REVIEWS_PLACEHOLDER));
    }

    #[test]
    fn test_review_order_preserved() {
        let prompt = build_keyword_prompt(&reviews());
        let first = prompt.find("Soft fabric").unwrap();
        let second = prompt.find("pricey").unwrap();
        assert!(first < second);
    }
}
