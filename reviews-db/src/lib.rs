//! Database layer for Smart Reviews
//!
//! Provides SQLite persistence for products and reviews, and the
//! `ReviewStore` implementation the synthesis pipeline runs against.

pub mod db;
pub mod error;
pub mod repos;
pub mod store;

pub use db::Database;
pub use error::{Error, Result};
pub use repos::{ProductRepository, ReviewRepository};
pub use store::SqliteReviewStore;
