use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;
use agromart_core::{Recipient, RepoResult, UserDirectory};

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    id: Uuid,
    name: String,
    phone: String,
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn sms_recipients(&self) -> RepoResult<Vec<Recipient>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT id, name, phone
            FROM users
            WHERE role = 'customer' AND phone IS NOT NULL AND btrim(phone) <> ''
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Recipient::new(row.id, row.name, row.phone))
            .collect())
    }
}
