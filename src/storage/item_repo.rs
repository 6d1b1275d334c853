use crate::domain::item::{Item, ItemStatus};
use crate::error::Result;
use crate::storage::DbPool;
use crate::storage::records::ItemRecord;
use uuid::Uuid;

/// Fixed cap on listing reads; there is deliberately no pagination.
const LISTING_CAP: i64 = 1000;

#[derive(Clone, Debug)]
pub struct ItemRepository {
    pool: DbPool,
}

impl ItemRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items
                (id, title, description, category, image_url, location,
                 contact_name, contact_email, contact_phone, owner_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.category)
        .bind(&item.image_url)
        .bind(&item.location)
        .bind(&item.contact_name)
        .bind(&item.contact_email)
        .bind(&item.contact_phone)
        .bind(item.owner_id)
        .bind(item.status.as_str())
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists items newest-first, optionally filtered by exact category and by a
    /// case-insensitive substring over title and description.
    pub async fn list(&self, category: Option<&str>, search: Option<&str>) -> Result<Vec<Item>> {
        let records = sqlx::query_as::<_, ItemRecord>(
            r#"
            SELECT id, title, description, category, image_url, location,
                   contact_name, contact_email, contact_phone, owner_id, status, created_at
            FROM items
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL
                   OR title ILIKE '%' || $2 || '%'
                   OR description ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(category)
        .bind(search)
        .bind(LISTING_CAP)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Item::from).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Item>> {
        let record = sqlx::query_as::<_, ItemRecord>(
            r#"
            SELECT id, title, description, category, image_url, location,
                   contact_name, contact_email, contact_phone, owner_id, status, created_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Item::from))
    }

    pub async fn update_status(&self, id: Uuid, status: ItemStatus) -> Result<()> {
        sqlx::query("UPDATE items SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>> {
        let records = sqlx::query_as::<_, ItemRecord>(
            r#"
            SELECT id, title, description, category, image_url, location,
                   contact_name, contact_email, contact_phone, owner_id, status, created_at
            FROM items
            WHERE owner_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner_id)
        .bind(LISTING_CAP)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Item::from).collect())
    }
}
