//! Reviews Core - Review aggregation and synthesis pipeline
//!
//! This crate decides when to regenerate the AI summary and keyword set of a
//! product, assembles the prompts from human reviews, and merges the results
//! back into storage without duplicating them.

pub mod completion;
pub mod config;
pub mod error;
pub mod model;
pub mod report;
pub mod secrets;
pub mod store;
pub mod synthesis;

pub use completion::CompletionService;
pub use config::Config;
pub use error::{Error, Result};
pub use model::{NewReview, Product, RatingSummary, Review, SynthesisState};
pub use secrets::Secrets;
pub use store::{CommittedBatch, MemoryStore, ReviewStore, SubmissionBatch};
pub use synthesis::{
    SubmissionHandler, SubmissionReceipt, SynthesisCoordinator, SynthesisOutcome,
};
