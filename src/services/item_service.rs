use crate::domain::item::{Item, ItemStatus};
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::media::MediaStore;
use crate::storage::item_repo::ItemRepository;
use bytes::Bytes;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    posted_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("lendahand-server");
        Self {
            posted_total: meter
                .u64_counter("items_posted_total")
                .with_description("Total number of items posted")
                .build(),
        }
    }
}

#[derive(Debug)]
pub struct NewItem {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub contact_phone: String,
}

#[derive(Clone, Debug)]
pub struct ItemService {
    items: ItemRepository,
    media: Arc<dyn MediaStore>,
    max_image_size_bytes: usize,
    metrics: Metrics,
}

impl ItemService {
    #[must_use]
    pub fn new(items: ItemRepository, media: Arc<dyn MediaStore>, max_image_size_bytes: usize) -> Self {
        Self { items, media, max_image_size_bytes, metrics: Metrics::new() }
    }

    /// Posts a new item. The image is uploaded to the media store before
    /// anything is written to the database, so a failed upload leaves no
    /// partial item behind.
    #[tracing::instrument(
        skip(self, owner, fields, image, content_type),
        fields(item_id = tracing::field::Empty, owner_id = %owner.id),
        err(level = "warn")
    )]
    pub async fn create(&self, owner: &User, fields: NewItem, image: Bytes, content_type: &str) -> Result<Item> {
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation("Only image files are allowed".to_string()));
        }
        if image.len() > self.max_image_size_bytes {
            return Err(AppError::Validation("Image too large".to_string()));
        }

        let image_url = self.media.store(image, content_type, &fields.title).await?;

        let item = Item {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            category: fields.category,
            image_url,
            location: fields.location,
            contact_name: owner.name.clone(),
            contact_email: owner.email.clone(),
            contact_phone: fields.contact_phone,
            owner_id: owner.id,
            status: ItemStatus::Available,
            created_at: OffsetDateTime::now_utc(),
        };

        self.items.create(&item).await?;

        tracing::Span::current().record("item_id", tracing::field::display(item.id));
        tracing::info!("Item posted");
        self.metrics.posted_total.add(1, &[]);

        Ok(item)
    }

    /// Browses the board. A category of "All" (or empty) means no category
    /// filter, matching what the frontend sends for the default tab.
    pub async fn list(&self, category: Option<String>, search: Option<String>) -> Result<Vec<Item>> {
        let category = category.filter(|c| !c.is_empty() && c.as_str() != "All");
        let search = search.filter(|s| !s.is_empty());
        self.items.list(category.as_deref(), search.as_deref()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Item> {
        self.items.find_by_id(id).await?.ok_or(AppError::NotFound)
    }

    /// Owner-only status transition; nothing changes when the caller does not
    /// own the item.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn set_status(&self, caller_id: Uuid, item_id: Uuid, status: ItemStatus) -> Result<()> {
        let item = self.items.find_by_id(item_id).await?.ok_or(AppError::NotFound)?;

        if item.owner_id != caller_id {
            return Err(AppError::Forbidden);
        }

        self.items.update_status(item_id, status).await?;
        tracing::info!(status = status.as_str(), "Item status updated");
        Ok(())
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Item>> {
        self.items.list_by_owner(owner_id).await
    }
}
