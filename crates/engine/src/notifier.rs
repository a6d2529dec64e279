//! Durable notification fan-out and the notification read model.
//!
//! Ordering guarantee: a notification is published on a recipient's
//! delivery topic only after its row is committed in the store. A client
//! that receives a push can always fetch the same notification over
//! HTTP.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use aegle_cache::{keys, read_through, Cache};
use aegle_core::notify::{NotificationType, Recipient};
use aegle_core::types::EntityId;
use aegle_db::error::StoreError;
use aegle_db::models::{NewNotification, Notification};
use aegle_db::store::{FailedInsert, TriageStore};
use aegle_events::{DeliveryChannel, PushMessage};

use crate::config::EngineConfig;
use crate::effects;
use crate::error::PersistenceError;

/// Largest notification page the cache holds. Requests for more bypass
/// the cache.
const NOTIFICATION_PAGE: i64 = 50;

/// Event name pushed on a recipient's topic for every new notification.
pub const NOTIFICATION_CREATED: &str = "notification.created";

// ---------------------------------------------------------------------------
// Payload & result types
// ---------------------------------------------------------------------------

/// Content of one logical notification, before it is addressed.
///
/// No content-level deduplication exists anywhere downstream: sending
/// the same payload twice produces two notifications.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    pub triage_id: Option<EntityId>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
}

impl NotificationPayload {
    pub fn new(kind: NotificationType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            triage_id: None,
            kind,
            title: title.into(),
            message: message.into(),
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    /// Link the notification to a triage record.
    pub fn for_triage(mut self, triage_id: EntityId) -> Self {
        self.triage_id = Some(triage_id);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Outcome of one fan-out call.
#[derive(Debug, Default)]
pub struct FanoutResult {
    /// Rows durably written, in recipient order.
    pub delivered: Vec<Notification>,
    /// Rows that could not be written. Never retried here.
    pub failed: Vec<FailedInsert>,
    /// Real-time pushes that missed their time budget. The rows are
    /// still durable; only the push was lost.
    pub publish_failures: usize,
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Writes notification rows, pushes them to live subscribers, and serves
/// the notification read model.
pub struct Notifier {
    store: Arc<dyn TriageStore>,
    cache: Arc<dyn Cache>,
    channel: Arc<DeliveryChannel>,
    config: EngineConfig,
}

impl Notifier {
    pub fn new(
        store: Arc<dyn TriageStore>,
        cache: Arc<dyn Cache>,
        channel: Arc<DeliveryChannel>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            cache,
            channel,
            config,
        }
    }

    /// Fan one payload out to many recipients.
    ///
    /// Recipients are deduplicated by (id, kind); one row is inserted per
    /// recipient, per-row atomically. Confirmed rows — and only those —
    /// are then pushed on each recipient's topic. `Err` means the store
    /// was unreachable outright and nothing was written.
    pub async fn notify_many(
        &self,
        recipients: Vec<Recipient>,
        payload: NotificationPayload,
    ) -> Result<FanoutResult, StoreError> {
        let mut seen = HashSet::new();
        let rows: Vec<NewNotification> = recipients
            .into_iter()
            .filter(|r| seen.insert(*r))
            .map(|recipient| NewNotification {
                recipient,
                triage_id: payload.triage_id,
                kind: payload.kind,
                title: payload.title.clone(),
                message: payload.message.clone(),
                metadata: payload.metadata.clone(),
            })
            .collect();

        if rows.is_empty() {
            return Ok(FanoutResult::default());
        }

        let batch = self.store.insert_notifications(rows).await?;
        let mut result = FanoutResult {
            delivered: batch.written,
            failed: batch.failed,
            publish_failures: 0,
        };

        // Push after commit, never before.
        for notification in &result.delivered {
            result.publish_failures += self.push(notification).await;
        }

        // Cached lists for these recipients are now stale.
        for recipient in result.delivered.iter().map(|n| n.recipient).collect::<HashSet<_>>() {
            self.invalidate_recipient(recipient).await;
        }

        Ok(result)
    }

    /// Fan out to a single recipient, surfacing a per-row failure as an
    /// error.
    pub async fn notify_one(
        &self,
        recipient: Recipient,
        payload: NotificationPayload,
    ) -> Result<Notification, StoreError> {
        let mut result = self.notify_many(vec![recipient], payload).await?;
        if let Some(notification) = result.delivered.pop() {
            return Ok(notification);
        }
        match result.failed.pop() {
            Some(f) => Err(StoreError::Write(f.reason)),
            None => Err(StoreError::Write("notification row not written".to_string())),
        }
    }

    /// Push one committed notification, returning 1 on a missed budget.
    async fn push(&self, notification: &Notification) -> usize {
        let payload = match serde_json::to_value(notification) {
            Ok(value) => value,
            Err(e) => {
                warn!(id = %notification.id, error = %e, "notification not pushable");
                return 1;
            }
        };
        let topic = notification.recipient.topic();
        let message = PushMessage::new(NOTIFICATION_CREATED).with_payload(payload);

        match tokio::time::timeout(
            self.config.side_effect_timeout,
            self.channel.publish(&topic, message),
        )
        .await
        {
            Ok(_subscribers) => 0,
            Err(_) => {
                warn!(topic, "notification push timed out");
                1
            }
        }
    }

    async fn invalidate_recipient(&self, recipient: Recipient) {
        for key in [keys::notifications(recipient), keys::unread_count(recipient)] {
            // bounded() already logs; stale-list fallout is capped by TTL.
            let _ = effects::bounded(
                self.config.side_effect_timeout,
                "notification cache invalidate",
                self.cache.delete(&key),
            )
            .await;
        }
    }

    // -- read model ---------------------------------------------------------

    /// List a recipient's notifications, newest first.
    ///
    /// The unfiltered default page is served read-through from the cache;
    /// unread-only and oversized requests go straight to the store.
    pub async fn list(
        &self,
        recipient: Recipient,
        unread_only: bool,
        limit: i64,
    ) -> Result<Vec<Notification>, PersistenceError> {
        if unread_only || limit > NOTIFICATION_PAGE {
            return Ok(self
                .store
                .list_notifications(recipient, unread_only, limit)
                .await?);
        }

        let key = keys::notifications(recipient);
        let mut page: Vec<Notification> = read_through(
            self.cache.as_ref(),
            &key,
            self.config.notification_ttl,
            || self
                .store
                .list_notifications(recipient, false, NOTIFICATION_PAGE),
        )
        .await?;
        page.truncate(limit.max(0) as usize);
        Ok(page)
    }

    /// A recipient's unread count, read-through cached.
    pub async fn unread_count(&self, recipient: Recipient) -> Result<i64, PersistenceError> {
        let key = keys::unread_count(recipient);
        let count = read_through(
            self.cache.as_ref(),
            &key,
            self.config.notification_ttl,
            || self.store.unread_count(recipient),
        )
        .await?;
        Ok(count)
    }

    /// Mark one notification read. Returns `false` when no unread
    /// notification with this id belongs to the recipient.
    pub async fn mark_read(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, PersistenceError> {
        let flipped = self.store.mark_notification_read(id, recipient).await?;
        if flipped {
            self.invalidate_recipient(recipient).await;
        }
        Ok(flipped)
    }

    /// Mark all of a recipient's notifications read; returns the number
    /// flipped.
    pub async fn mark_all_read(&self, recipient: Recipient) -> Result<u64, PersistenceError> {
        let flipped = self.store.mark_all_notifications_read(recipient).await?;
        if flipped > 0 {
            self.invalidate_recipient(recipient).await;
        }
        Ok(flipped)
    }

    /// Delete one of the recipient's notifications.
    pub async fn delete(
        &self,
        id: EntityId,
        recipient: Recipient,
    ) -> Result<bool, PersistenceError> {
        let deleted = self.store.delete_notification(id, recipient).await?;
        if deleted {
            self.invalidate_recipient(recipient).await;
        }
        Ok(deleted)
    }
}
