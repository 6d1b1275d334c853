use crate::domain::conversation::ConversationId;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Message {
    pub(crate) id: Uuid,
    pub(crate) conversation_id: ConversationId,
    pub(crate) sender_id: Uuid,
    /// Display name captured at send time; later renames do not rewrite history.
    pub(crate) sender_name: String,
    pub(crate) body: String,
    pub(crate) created_at: OffsetDateTime,
    pub(crate) read: bool,
}
