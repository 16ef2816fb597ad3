//! Reviews LLM - Completion service client for Smart Reviews
//!
//! This crate provides the HTTP client that turns review prompts into
//! summaries and keyword lists.

mod client;
mod error;

pub use client::AnthropicClient;
pub use error::{Error, Result};
