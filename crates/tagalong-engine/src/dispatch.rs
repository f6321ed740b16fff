//! [`Dispatcher`]: durable notification records with best-effort delivery.
//!
//! The record is the part that must succeed. Delivery through the
//! [`NotificationChannel`] is attempted once, right after the record is
//! written; a failed attempt is logged and leaves `is_sent` false. Nothing
//! re-delivers later.

use std::sync::Arc;

use tagalong_core::{
  Error, Result,
  notification::{NewNotification, Notification},
  ports::NotificationChannel,
  store::Store,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Backend;

pub struct Dispatcher<B: Backend> {
  store:   Arc<B::Store>,
  channel: Arc<B::Channel>,
}

impl<B: Backend> Clone for Dispatcher<B> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), channel: self.channel.clone() }
  }
}

impl<B: Backend> Dispatcher<B> {
  pub fn new(store: Arc<B::Store>, channel: Arc<B::Channel>) -> Self {
    Self { store, channel }
  }

  /// Record a notification, then try to deliver it.
  ///
  /// Fails only if the record cannot be created, in which case nothing is
  /// delivered.
  pub async fn notify(&self, input: NewNotification) -> Result<Notification> {
    let mut notification = self
      .store
      .add_notification(input)
      .await
      .map_err(Error::persistence)?;

    let Some(address) = notification.recipient_email.clone() else {
      debug!(notification_id = %notification.notification_id, "no delivery address; record only");
      return Ok(notification);
    };

    if let Err(e) = self
      .channel
      .deliver(&address, &notification.title, &notification.message)
      .await
    {
      warn!(
        notification_id = %notification.notification_id,
        kind = %notification.kind,
        error = %e,
        "notification delivery failed"
      );
      return Ok(notification);
    }

    match self
      .store
      .mark_notification_sent(notification.notification_id)
      .await
    {
      Ok(_) => notification.is_sent = true,
      Err(e) => warn!(
        notification_id = %notification.notification_id,
        error = %e,
        "delivered but could not record is_sent"
      ),
    }

    Ok(notification)
  }

  /// Notifications addressed to `recipient`, newest first.
  pub async fn list_for(&self, recipient: Uuid) -> Result<Vec<Notification>> {
    self
      .store
      .list_notifications(recipient)
      .await
      .map_err(Error::persistence)
  }

  /// Mark a notification read on behalf of its recipient.
  pub async fn mark_read(&self, notification_id: Uuid, reader: Uuid) -> Result<Notification> {
    let mut notification = self
      .store
      .get_notification(notification_id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::NotFound(format!("notification {notification_id}")))?;

    if notification.recipient_id != Some(reader) {
      return Err(Error::Unauthorized);
    }

    if !notification.is_read {
      self
        .store
        .mark_notification_read(notification_id)
        .await
        .map_err(Error::persistence)?;
      notification.is_read = true;
    }

    Ok(notification)
  }
}
