use crate::domain::conversation::ConversationId;
use crate::domain::message::Message;
use crate::error::{AppError, Result};
use crate::storage::conversation_repo::ConversationRepository;
use crate::storage::item_repo::ItemRepository;
use crate::storage::message_repo::MessageRepository;
use crate::storage::user_repo::UserRepository;
use opentelemetry::{global, metrics::Counter};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    conversations_created_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("lendahand-server");
        Self {
            sent_total: meter
                .u64_counter("messages_sent_total")
                .with_description("Total messages stored")
                .build(),
            conversations_created_total: meter
                .u64_counter("conversations_created_total")
                .with_description("Total conversations lazily created on first message")
                .build(),
        }
    }
}

/// One row of the caller's inbox: the thread, who it is with, what it is
/// about, and how much of it is unread.
#[derive(Debug, Clone)]
pub struct ConversationSummary {
    pub(crate) id: ConversationId,
    pub(crate) item: ItemCard,
    pub(crate) other_user: Counterpart,
    pub(crate) last_message: String,
    pub(crate) last_message_at: OffsetDateTime,
    pub(crate) unread_count: i64,
}

#[derive(Debug, Clone)]
pub struct ItemCard {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) image_url: String,
}

#[derive(Debug, Clone)]
pub struct Counterpart {
    pub(crate) id: Uuid,
    pub(crate) name: String,
}

#[derive(Clone, Debug)]
pub struct ChatService {
    users: UserRepository,
    items: ItemRepository,
    conversations: ConversationRepository,
    messages: MessageRepository,
    metrics: Metrics,
}

impl ChatService {
    #[must_use]
    pub fn new(
        users: UserRepository,
        items: ItemRepository,
        conversations: ConversationRepository,
        messages: MessageRepository,
    ) -> Self {
        Self { users, items, conversations, messages, metrics: Metrics::new() }
    }

    /// Stores a message from `sender_id` to `receiver_id` about an item,
    /// lazily creating the conversation on first contact.
    ///
    /// # Errors
    /// Returns `AppError::InvalidParticipants` when sender and receiver are
    /// the same user, and `AppError::AuthError` when the sender no longer
    /// exists.
    #[tracing::instrument(
        skip(self, body),
        fields(conversation_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        item_id: Uuid,
        body: String,
    ) -> Result<Message> {
        let conversation_id = ConversationId::derive(sender_id, receiver_id, item_id)?;
        tracing::Span::current().record("conversation_id", tracing::field::display(&conversation_id));

        // Snapshot the sender's display name into the message.
        let sender = self.users.find_by_id(sender_id).await?.ok_or(AppError::AuthError)?;

        let now = OffsetDateTime::now_utc();
        let created = self.conversations.ensure(&conversation_id, now).await?;
        if created {
            tracing::debug!("Conversation created");
            self.metrics.conversations_created_total.add(1, &[]);
        }

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.clone(),
            sender_id,
            sender_name: sender.name,
            body,
            created_at: now,
            read: false,
        };

        self.messages.create(&message).await?;
        self.conversations.touch(&conversation_id, now).await?;

        self.metrics.sent_total.add(1, &[]);
        Ok(message)
    }

    /// Returns the chronological transcript between the requester and
    /// `other_user_id` about an item, then marks every unread message from
    /// the counterpart as read.
    ///
    /// The requester can only ever address threads it belongs to: the
    /// conversation id is derived from its own authenticated id, and
    /// composite ids are never accepted as input.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list_messages(
        &self,
        requester_id: Uuid,
        other_user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Vec<Message>> {
        let conversation_id = ConversationId::derive(requester_id, other_user_id, item_id)?;

        let transcript = self.messages.list_for_conversation(&conversation_id).await?;

        // Viewing the thread is what flips the counterpart's messages to
        // read; one conditional update, idempotent on re-listing.
        let marked = self.messages.mark_read_from(&conversation_id, other_user_id).await?;
        if marked > 0 {
            tracing::debug!(marked, "Messages marked read");
        }

        Ok(transcript)
    }

    /// Every conversation the caller participates in, most recently active
    /// first, each resolved to a summary. Conversations whose item or
    /// counterpart has vanished are skipped rather than failing the listing.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>> {
        let conversations = self.conversations.list_for_user(user_id).await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let Some(other_id) = conversation.id.counterpart_of(user_id) else {
                continue;
            };

            let Some(other_user) = self.users.find_by_id(other_id).await? else {
                tracing::debug!(conversation_id = %conversation.id, "Skipping conversation: counterpart vanished");
                continue;
            };

            let Some(item) = self.items.find_by_id(conversation.id.item_id()).await? else {
                tracing::debug!(conversation_id = %conversation.id, "Skipping conversation: item vanished");
                continue;
            };

            let last_message =
                self.messages.last_in_conversation(&conversation.id).await?.map_or_else(String::new, |m| m.body);
            let unread_count = self.messages.count_unread_from(&conversation.id, other_id).await?;

            summaries.push(ConversationSummary {
                id: conversation.id,
                item: ItemCard { id: item.id, title: item.title, image_url: item.image_url },
                other_user: Counterpart { id: other_user.id, name: other_user.name },
                last_message,
                last_message_at: conversation.last_message_at,
                unread_count,
            });
        }

        Ok(summaries)
    }
}
