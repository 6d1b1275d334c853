use crate::domain::conversation::{Conversation, ConversationId};
use crate::error::Result;
use crate::storage::DbPool;
use crate::storage::records::ConversationRecord;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct ConversationRepository {
    pool: DbPool,
}

impl ConversationRepository {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Creates the conversation if it does not exist yet. The derived id is
    /// the primary key and the insert is `ON CONFLICT DO NOTHING`, so two
    /// racing first-sends cannot produce a second row; there is no
    /// read-then-insert window.
    ///
    /// Returns `true` when this call created the row.
    pub async fn ensure(&self, id: &ConversationId, now: OffsetDateTime) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO conversations (id, item_id, participant_lo, participant_hi, created_at, last_message_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id.to_string())
        .bind(id.item_id())
        .bind(id.lo())
        .bind(id.hi())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Advances `last_message_at`; never moves it backward under clock skew.
    pub async fn touch(&self, id: &ConversationId, now: OffsetDateTime) -> Result<()> {
        sqlx::query("UPDATE conversations SET last_message_at = GREATEST(last_message_at, $2) WHERE id = $1")
            .bind(id.to_string())
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Every conversation the user participates in, most recently active first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let records = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT item_id, participant_lo, participant_hi, created_at, last_message_at
            FROM conversations
            WHERE participant_lo = $1 OR participant_hi = $1
            ORDER BY last_message_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Conversation::from).collect())
    }
}
