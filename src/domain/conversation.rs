use crate::error::{AppError, Result};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Identity of a conversation between two users about one item.
///
/// The id is derived, never generated: the participant pair is sorted so the
/// same two users always map to the same id regardless of who messages first,
/// and the rendered form `"{lo}_{hi}_{item}"` doubles as the storage key. The
/// hyphenated UUID rendering is ordered the same way as the underlying bytes,
/// so comparing values is comparing the rendered ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationId {
    lo: Uuid,
    hi: Uuid,
    item_id: Uuid,
}

impl ConversationId {
    /// Derives the conversation id for an unordered user pair and an item.
    ///
    /// # Errors
    /// Returns `AppError::InvalidParticipants` when both sides are the same
    /// user; a user never converses with itself.
    pub fn derive(a: Uuid, b: Uuid, item_id: Uuid) -> Result<Self> {
        if a == b {
            return Err(AppError::InvalidParticipants);
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { lo, hi, item_id })
    }

    /// Rebuilds an id from stored columns. The caller is trusted to hand back
    /// a pair that was ordered by `derive` at write time.
    pub(crate) const fn from_columns(lo: Uuid, hi: Uuid, item_id: Uuid) -> Self {
        Self { lo, hi, item_id }
    }

    #[must_use]
    pub const fn lo(&self) -> Uuid {
        self.lo
    }

    #[must_use]
    pub const fn hi(&self) -> Uuid {
        self.hi
    }

    #[must_use]
    pub const fn item_id(&self) -> Uuid {
        self.item_id
    }

    #[must_use]
    pub fn contains(&self, user_id: Uuid) -> bool {
        self.lo == user_id || self.hi == user_id
    }

    /// The other side of the pair, or `None` when `user_id` is not a participant.
    #[must_use]
    pub fn counterpart_of(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.lo {
            Some(self.hi)
        } else if user_id == self.hi {
            Some(self.lo)
        } else {
            None
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.lo, self.hi, self.item_id)
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    pub(crate) id: ConversationId,
    #[allow(dead_code)]
    pub(crate) created_at: OffsetDateTime,
    pub(crate) last_message_at: OffsetDateTime,
}
