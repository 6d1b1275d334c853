use crate::domain::conversation::{Conversation, ConversationId};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(sqlx::FromRow)]
pub(crate) struct ConversationRecord {
    pub item_id: Uuid,
    pub participant_lo: Uuid,
    pub participant_hi: Uuid,
    pub created_at: OffsetDateTime,
    pub last_message_at: OffsetDateTime,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        Self {
            id: ConversationId::from_columns(record.participant_lo, record.participant_hi, record.item_id),
            created_at: record.created_at,
            last_message_at: record.last_message_at,
        }
    }
}
