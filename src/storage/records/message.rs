use crate::domain::conversation::ConversationId;
use crate::domain::message::Message;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct MessageRecord {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub read: bool,
}

impl MessageRecord {
    pub(crate) fn into_domain(self, conversation_id: ConversationId) -> Message {
        Message {
            id: self.id,
            conversation_id,
            sender_id: self.sender_id,
            sender_name: self.sender_name,
            body: self.body,
            created_at: self.created_at,
            read: self.read,
        }
    }
}
