use crate::domain::conversation::ConversationId;
use crate::domain::message::Message;
use crate::error::Result;
use crate::storage::DbPool;
use crate::storage::records::MessageRecord;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct MessageRepository {
    pool: DbPool,
}

impl MessageRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, message: &Message) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, sender_name, body, created_at, read)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id.to_string())
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.body)
        .bind(message.created_at)
        .bind(message.read)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The full transcript, oldest first; `seq` breaks timestamp ties in
    /// insertion order.
    pub async fn list_for_conversation(&self, conversation_id: &ConversationId) -> Result<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, sender_id, sender_name, body, created_at, read
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(|r| r.into_domain(conversation_id.clone())).collect())
    }

    /// Marks every unread message from `sender_id` in the conversation as
    /// read. One conditional UPDATE, so concurrent listings cannot lose
    /// writes, and re-running it is a no-op. Returns the number of messages
    /// that flipped.
    pub async fn mark_read_from(&self, conversation_id: &ConversationId, sender_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET read = TRUE
            WHERE conversation_id = $1 AND sender_id = $2 AND read = FALSE
            "#,
        )
        .bind(conversation_id.to_string())
        .bind(sender_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn last_in_conversation(&self, conversation_id: &ConversationId) -> Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, sender_id, sender_name, body, created_at, read
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT 1
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(|r| r.into_domain(conversation_id.clone())))
    }

    pub async fn count_unread_from(&self, conversation_id: &ConversationId, sender_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1 AND sender_id = $2 AND read = FALSE
            "#,
        )
        .bind(conversation_id.to_string())
        .bind(sender_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
