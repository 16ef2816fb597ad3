//! HTTP API handlers

pub mod error;
pub mod health;
pub mod products;
pub mod shops;

pub use error::ApiError;
pub use health::health_routes;
pub use products::{create_review, get_product_reviews};
pub use shops::get_shop_products;
