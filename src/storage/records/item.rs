use crate::domain::item::{Item, ItemStatus};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct ItemRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub location: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub owner_id: Uuid,
    pub status: String,
    pub created_at: OffsetDateTime,
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            category: record.category,
            image_url: record.image_url,
            location: record.location,
            contact_name: record.contact_name,
            contact_email: record.contact_email,
            contact_phone: record.contact_phone,
            owner_id: record.owner_id,
            // Only the service writes this column; anything else is stale data.
            status: record.status.parse().unwrap_or(ItemStatus::Available),
            created_at: record.created_at,
        }
    }
}
