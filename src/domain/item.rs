use crate::error::AppError;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Available,
    Taken,
}

impl ItemStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Taken => "taken",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "taken" => Ok(Self::Taken),
            other => Err(AppError::Validation(format!("Unknown item status: {other}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) category: String,
    pub(crate) image_url: String,
    pub(crate) location: String,
    pub(crate) contact_name: String,
    pub(crate) contact_email: String,
    pub(crate) contact_phone: String,
    pub(crate) owner_id: Uuid,
    pub(crate) status: ItemStatus,
    pub(crate) created_at: OffsetDateTime,
}
