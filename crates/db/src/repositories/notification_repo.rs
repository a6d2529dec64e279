//! Repository for the `notifications` table.

use sqlx::FromRow;

use aegle_core::notify::{NotificationType, Recipient, RecipientKind};
use aegle_core::types::{EntityId, Timestamp};

use crate::error::StoreError;
use crate::models::{NewNotification, Notification};
use crate::DbPool;

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, recipient_id, recipient_kind, triage_id, kind, title, message, \
     is_read, metadata, created_at";

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: EntityId,
    recipient_id: EntityId,
    recipient_kind: String,
    triage_id: Option<EntityId>,
    kind: String,
    title: String,
    message: String,
    is_read: bool,
    metadata: serde_json::Value,
    created_at: Timestamp,
}

impl NotificationRow {
    fn into_domain(self) -> Result<Notification, StoreError> {
        let recipient_kind: RecipientKind = self
            .recipient_kind
            .parse()
            .map_err(|e| StoreError::Decode(format!("notifications.recipient_kind: {e}")))?;
        let kind: NotificationType = self
            .kind
            .parse()
            .map_err(|e| StoreError::Decode(format!("notifications.kind: {e}")))?;

        Ok(Notification {
            id: self.id,
            recipient: Recipient {
                id: self.recipient_id,
                kind: recipient_kind,
            },
            triage_id: self.triage_id,
            kind,
            title: self.title,
            message: self.message,
            read: self.is_read,
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

/// Provides row operations for notifications.
pub(crate) struct NotificationRepo;

impl NotificationRepo {
    /// Insert a single notification row, returning the persisted row.
    pub async fn insert_one(
        pool: &DbPool,
        new: &NewNotification,
    ) -> Result<Notification, StoreError> {
        let query = format!(
            "INSERT INTO notifications \
             (recipient_id, recipient_kind, triage_id, kind, title, message, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, NotificationRow>(&query)
            .bind(new.recipient.id)
            .bind(new.recipient.kind.as_str())
            .bind(new.triage_id)
            .bind(new.kind.as_str())
            .bind(&new.title)
            .bind(&new.message)
            .bind(&new.metadata)
            .fetch_one(pool)
            .await?;

        row.into_domain()
    }

    /// List notifications for a recipient, newest first.
    ///
    /// When `unread_only` is `true`, only rows with `is_read = false` are
    /// returned.
    pub async fn list_for_recipient(
        pool: &DbPool,
        recipient: Recipient,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, StoreError> {
        let filter = if unread_only {
            "AND is_read = false"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_id = $1 AND recipient_kind = $2 {filter} \
             ORDER BY created_at DESC \
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, NotificationRow>(&query)
            .bind(recipient.id)
            .bind(recipient.kind.as_str())
            .bind(limit)
            .fetch_all(pool)
            .await?;

        rows.into_iter().map(NotificationRow::into_domain).collect()
    }

    /// Count unread notifications for a recipient.
    pub async fn unread_count(pool: &DbPool, recipient: Recipient) -> Result<i64, StoreError> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications \
             WHERE recipient_id = $1 AND recipient_kind = $2 AND is_read = false",
        )
        .bind(recipient.id)
        .bind(recipient.kind.as_str())
        .fetch_one(pool)
        .await?;
        Ok(count.unwrap_or(0))
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if an unread notification with that id belonged to
    /// the recipient and was flipped, `false` otherwise.
    pub async fn mark_read(
        pool: &DbPool,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true \
             WHERE id = $1 AND recipient_id = $2 AND recipient_kind = $3 AND is_read = false",
        )
        .bind(id)
        .bind(recipient.id)
        .bind(recipient.kind.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a recipient.
    pub async fn mark_all_read(pool: &DbPool, recipient: Recipient) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true \
             WHERE recipient_id = $1 AND recipient_kind = $2 AND is_read = false",
        )
        .bind(recipient.id)
        .bind(recipient.kind.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a notification owned by the recipient.
    pub async fn delete(
        pool: &DbPool,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM notifications \
             WHERE id = $1 AND recipient_id = $2 AND recipient_kind = $3",
        )
        .bind(id)
        .bind(recipient.id)
        .bind(recipient.kind.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
