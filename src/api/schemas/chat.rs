use crate::domain::message::Message;
use crate::services::chat_service::ConversationSummary;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub item_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: String,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub read: bool,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id,
            sender_name: message.sender_name,
            message: message.body,
            created_at: message.created_at,
            read: message.read,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub conversation_id: String,
    pub item: ItemCardResponse,
    pub other_user: CounterpartResponse,
    pub last_message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_message_at: OffsetDateTime,
    pub unread_count: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCardResponse {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
}

#[derive(Serialize)]
pub struct CounterpartResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<ConversationSummary> for ConversationResponse {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            conversation_id: summary.id.to_string(),
            item: ItemCardResponse {
                id: summary.item.id,
                title: summary.item.title,
                image_url: summary.item.image_url,
            },
            other_user: CounterpartResponse { id: summary.other_user.id, name: summary.other_user.name },
            last_message: summary.last_message,
            last_message_at: summary.last_message_at,
            unread_count: summary.unread_count,
        }
    }
}
