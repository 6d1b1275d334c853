use crate::domain::item::Item;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ListItemsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatus {
    pub status: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            category: item.category,
            image_url: item.image_url,
            location: item.location,
            contact_name: item.contact_name,
            contact_email: item.contact_email,
            contact_phone: item.contact_phone,
            owner_id: item.owner_id,
            status: item.status.as_str().to_string(),
            created_at: item.created_at,
        }
    }
}
