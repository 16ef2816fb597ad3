//! Review repository

use chrono::{DateTime, Utc};
use reviews_core::model::{ProductId, RatingSummary, Review, ReviewId};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::{Error, Result};

const REVIEW_COLUMNS: &str = "r.id, r.product_id, r.author, r.title, r.content, r.rating, \
                              r.is_synthetic, r.created_at, r.updated_at";

/// Review row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    product_id: i64,
    author: String,
    title: String,
    content: String,
    rating: i32,
    is_synthetic: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: Some(row.id),
            product_id: row.product_id,
            author: row.author,
            title: row.title,
            content: row.content,
            rating: row.rating,
            is_synthetic: row.is_synthetic,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for review records
pub struct ReviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new review record
    pub async fn insert(&self, review: &Review) -> Result<ReviewId> {
        insert_review(self.pool, review).await
    }

    /// Update an existing review record in place
    pub async fn update(&self, review: &Review) -> Result<ReviewId> {
        update_review(self.pool, review).await
    }

    /// Insert or update depending on whether the review has an id
    pub async fn upsert(&self, review: &Review) -> Result<ReviewId> {
        match review.id {
            Some(_) => self.update(review).await,
            None => self.insert(review).await,
        }
    }

    /// List the reviews of a product by external id, synthesized first
    pub async fn list_by_external_id(&self, external_id: &str) -> Result<Vec<Review>> {
        let query = format!(
            "SELECT {} FROM reviews r
             JOIN products p ON r.product_id = p.id
             WHERE p.external_id = ?
             ORDER BY r.is_synthetic DESC, r.id ASC",
            REVIEW_COLUMNS
        );

        let rows = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(external_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Find the synthesized summary review of a product
    pub async fn find_synthetic(&self, product_id: ProductId) -> Result<Option<Review>> {
        let query = format!(
            "SELECT {} FROM reviews r WHERE r.product_id = ? AND r.is_synthetic = 1",
            REVIEW_COLUMNS
        );

        let row = sqlx::query_as::<_, ReviewRow>(&query)
            .bind(product_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Review::from))
    }

    /// Average rating and count of the human reviews of a product
    pub async fn rating_summary(&self, external_id: &str) -> Result<RatingSummary> {
        let (average, count): (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(r.rating), COUNT(r.id) FROM reviews r
             JOIN products p ON r.product_id = p.id
             WHERE p.external_id = ? AND r.is_synthetic = 0",
        )
        .bind(external_id)
        .fetch_one(self.pool)
        .await?;

        Ok(RatingSummary {
            average_rating: average.unwrap_or(0.0),
            reviews_quantity: u64::try_from(count).unwrap_or_default(),
        })
    }
}

/// Insert a review on any SQLite executor, including an open transaction
pub(crate) async fn insert_review<'e, E>(executor: E, review: &Review) -> Result<ReviewId>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO reviews (
            product_id, author, title, content, rating, is_synthetic,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(review.product_id)
    .bind(&review.author)
    .bind(&review.title)
    .bind(&review.content)
    .bind(review.rating)
    .bind(review.is_synthetic)
    .bind(review.created_at)
    .bind(review.updated_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Rewrite a stored review on any SQLite executor
pub(crate) async fn update_review<'e, E>(executor: E, review: &Review) -> Result<ReviewId>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = review
        .id
        .ok_or_else(|| Error::InvalidData("Cannot update review without ID".to_string()))?;

    let affected = sqlx::query(
        r#"
        UPDATE reviews SET
            author = ?,
            title = ?,
            content = ?,
            rating = ?,
            is_synthetic = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&review.author)
    .bind(&review.title)
    .bind(&review.content)
    .bind(review.rating)
    .bind(review.is_synthetic)
    .bind(Utc::now())
    .bind(id)
    .execute(executor)
    .await?
    .rows_affected();

    if affected == 0 {
        return Err(Error::NotFound(format!("Review with id {} not found", id)));
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::ProductRepository;
    use crate::Database;
    use reviews_core::model::{NewReview, Product};

    async fn setup() -> (Database, ProductId) {
        let db = Database::in_memory().await.unwrap();
        let pid = ProductRepository::new(db.pool())
            .create(&Product::new("sku-1", "shop-1"))
            .await
            .unwrap();
        (db, pid)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (db, pid) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        repo.insert(&Review::human(pid, NewReview::new("ana", "Good", "Soft", 5)))
            .await
            .unwrap();
        repo.insert(&Review::synthetic_summary(pid, "Summary"))
            .await
            .unwrap();

        let reviews = repo.list_by_external_id("sku-1").await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews[0].is_synthetic);
        assert_eq!(reviews[0].rating, 0);
        assert_eq!(reviews[1].author, "ana");

        assert!(repo.list_by_external_id("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_synthetic_in_place() {
        let (db, pid) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        let id = repo
            .insert(&Review::synthetic_summary(pid, "first"))
            .await
            .unwrap();

        let mut existing = repo.find_synthetic(pid).await.unwrap().unwrap();
        existing.replace_content("second");
        assert_eq!(repo.upsert(&existing).await.unwrap(), id);

        assert_eq!(repo.list_by_external_id("sku-1").await.unwrap().len(), 1);
        let stored = repo.find_synthetic(pid).await.unwrap().unwrap();
        assert_eq!(stored.content, "second");
    }

    #[tokio::test]
    async fn test_second_synthetic_insert_rejected() {
        let (db, pid) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        repo.insert(&Review::synthetic_summary(pid, "one")).await.unwrap();
        let result = repo.insert(&Review::synthetic_summary(pid, "two")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_review() {
        let (db, pid) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        let mut review = Review::synthetic_summary(pid, "x");
        review.id = Some(404);
        assert!(matches!(repo.update(&review).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_review_requires_product() {
        let (db, _) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        let result = repo
            .insert(&Review::human(999, NewReview::new("a", "t", "c", 3)))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rating_summary_excludes_synthetic() {
        let (db, pid) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        for rating in [2, 4, 5] {
            repo.insert(&Review::human(pid, NewReview::new("a", "t", "c", rating)))
                .await
                .unwrap();
        }
        repo.insert(&Review::synthetic_summary(pid, "s")).await.unwrap();

        let summary = repo.rating_summary("sku-1").await.unwrap();
        assert_eq!(summary.reviews_quantity, 3);
        assert!((summary.average_rating - 11.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rating_summary_without_reviews() {
        let (db, _) = setup().await;
        let repo = ReviewRepository::new(db.pool());

        let summary = repo.rating_summary("sku-1").await.unwrap();
        assert_eq!(summary, RatingSummary::default());
    }
}
