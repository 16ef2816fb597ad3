//! Product repository

use chrono::{DateTime, Utc};
use reviews_core::model::{Product, ProductId};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::{Error, Result};

/// Product row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    external_id: String,
    shop_id: String,
    keywords: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: Some(row.id),
            external_id: row.external_id,
            shop_id: row.shop_id,
            keywords: row.keywords,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product records
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new product record
    pub async fn create(&self, product: &Product) -> Result<ProductId> {
        if product.id.is_some() {
            return Err(Error::InvalidData(format!(
                "Product {} already has an id",
                product.external_id
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO products (external_id, shop_id, keywords, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.external_id)
        .bind(&product.shop_id)
        .bind(&product.keywords)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update shop and keywords of an existing product
    pub async fn update(&self, product: &Product) -> Result<ProductId> {
        let id = product
            .id
            .ok_or_else(|| Error::InvalidData("Cannot update product without ID".to_string()))?;

        let affected = sqlx::query(
            "UPDATE products SET shop_id = ?, keywords = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&product.shop_id)
        .bind(&product.keywords)
        .bind(Utc::now())
        .bind(id)
        .execute(self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(Error::NotFound(format!("Product with id {} not found", id)));
        }

        Ok(id)
    }

    /// Get a product by its external id
    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// List all products of a shop
    pub async fn list_by_shop(&self, shop_id: &str) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE shop_id = ? ORDER BY id ASC",
        )
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

/// Overwrite the keywords of a product on any SQLite executor
pub(crate) async fn set_keywords<'e, E>(
    executor: E,
    product_id: ProductId,
    keywords: &str,
) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let affected = sqlx::query("UPDATE products SET keywords = ?, updated_at = ? WHERE id = ?")
        .bind(keywords)
        .bind(Utc::now())
        .bind(product_id)
        .execute(executor)
        .await?
        .rows_affected();

    if affected == 0 {
        return Err(Error::NotFound(format!(
            "Product with id {} not found",
            product_id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProductRepository::new(db.pool());

        let id = repo.create(&Product::new("sku-1", "shop-1")).await.unwrap();

        let product = repo.get_by_external_id("sku-1").await.unwrap().unwrap();
        assert_eq!(product.id, Some(id));
        assert_eq!(product.shop_id, "shop-1");
        assert!(product.keywords.is_none());
    }

    #[tokio::test]
    async fn test_missing_product() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProductRepository::new(db.pool());

        assert!(repo.get_by_external_id("nope").await.unwrap().is_none());
        assert!(matches!(
            set_keywords(db.pool(), 99, "a,b").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_external_id_unique() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProductRepository::new(db.pool());

        repo.create(&Product::new("sku-1", "shop-1")).await.unwrap();
        let result = repo.create(&Product::new("sku-1", "shop-2")).await;
        assert!(matches!(result, Err(Error::Sqlx(_))));
        assert_eq!(repo.list_by_shop("shop-1").await.unwrap().len(), 1);
        assert!(repo.list_by_shop("shop-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keywords() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProductRepository::new(db.pool());

        repo.create(&Product::new("sku-1", "shop-1")).await.unwrap();
        let mut product = repo.get_by_external_id("sku-1").await.unwrap().unwrap();
        product.keywords = Some("fit,price".to_string());
        repo.update(&product).await.unwrap();

        let product = repo.get_by_external_id("sku-1").await.unwrap().unwrap();
        assert_eq!(product.keywords.as_deref(), Some("fit,price"));
    }

    #[tokio::test]
    async fn test_update_without_id_rejected() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProductRepository::new(db.pool());

        let result = repo.update(&Product::new("sku-1", "shop-1")).await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_list_by_shop() {
        let db = Database::in_memory().await.unwrap();
        let repo = ProductRepository::new(db.pool());

        repo.create(&Product::new("sku-1", "shop-1")).await.unwrap();
        repo.create(&Product::new("sku-2", "shop-1")).await.unwrap();
        repo.create(&Product::new("sku-3", "shop-2")).await.unwrap();

        let products = repo.list_by_shop("shop-1").await.unwrap();
        let ids: Vec<_> = products.iter().map(|p| p.external_id.as_str()).collect();
        assert_eq!(ids, vec!["sku-1", "sku-2"]);
    }
}
