//! Repository modules for database operations

pub mod products;
pub mod reviews;

pub use products::ProductRepository;
pub use reviews::ReviewRepository;
