use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use chrono::{DateTime, Utc};
use agromart_catalog::{Category, OfferTerms, Product, ProductQuery};
use agromart_core::{CatalogRepository, RepoResult};

const PRODUCT_COLUMNS: &str = "id, farmer_id, name, category, price_paise, unit, stock_quantity, \
    discount_percent, window_start, window_end, offer_expired, warning_sent, updated_at";

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    farmer_id: Uuid,
    name: String,
    category: String,
    price_paise: i64,
    unit: String,
    stock_quantity: i32,
    discount_percent: i16,
    window_start: Option<DateTime<Utc>>,
    window_end: Option<DateTime<Utc>>,
    offer_expired: bool,
    warning_sent: bool,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            farmer_id: row.farmer_id,
            name: row.name,
            category: Category::parse(&row.category),
            price_paise: row.price_paise,
            unit: row.unit,
            stock_quantity: row.stock_quantity,
            offer: OfferTerms {
                discount_percent: u8::try_from(row.discount_percent.clamp(0, 100)).unwrap_or(0),
                window_start: row.window_start,
                window_end: row.window_end,
                expired: row.offer_expired,
                warning_sent: row.warning_sent,
            },
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn find(&self, query: &ProductQuery) -> RepoResult<Vec<Product>> {
        let rows: Vec<ProductRow> = match *query {
            ProductQuery::ExpiringWithin { now, horizon } => {
                let sql = format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     WHERE discount_percent > 0 \
                       AND window_end BETWEEN $1 AND $2 \
                       AND warning_sent = FALSE \
                       AND offer_expired = FALSE \
                     ORDER BY window_end"
                );
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(now)
                    .bind(now + horizon)
                    .fetch_all(&self.pool)
                    .await?
            }
            ProductQuery::Lapsed { now } => {
                let sql = format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     WHERE discount_percent > 0 \
                       AND window_end < $1 \
                       AND offer_expired = FALSE \
                     ORDER BY window_end"
                );
                sqlx::query_as::<_, ProductRow>(&sql)
                    .bind(now)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn save(&self, product: &Product) -> RepoResult<()> {
        // Only the offer columns; the rest of the listing belongs to catalog management.
        let result = sqlx::query(
            r#"
            UPDATE products
            SET discount_percent = $2,
                window_start = $3,
                window_end = $4,
                offer_expired = $5,
                warning_sent = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(i16::from(product.offer.discount_percent))
        .bind(product.offer.window_start)
        .bind(product.offer.window_end)
        .bind(product.offer.expired)
        .bind(product.offer.warning_sent)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(format!("Product not found: {}", product.id).into());
        }
        Ok(())
    }

    async fn mark_warned(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET warning_sent = TRUE, updated_at = NOW()
            WHERE id = $1 AND warning_sent = FALSE AND offer_expired = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn expire(&self, id: Uuid, now: DateTime<Utc>) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET offer_expired = TRUE, discount_percent = 0, updated_at = NOW()
            WHERE id = $1
              AND offer_expired = FALSE
              AND discount_percent > 0
              AND window_end < $2
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
