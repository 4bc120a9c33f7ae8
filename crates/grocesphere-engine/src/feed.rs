//! Push channel of authoritative order-status updates from the backend.

use grocesphere_core::{CoreError, OrderStatus};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("malformed order row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Status(#[from] CoreError),

    #[error("order feed subscription is closed")]
    Closed,
}

/// A status change sourced from the order-management backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoritativeUpdate {
    pub order_id: String,
    pub status: OrderStatus,
}

/// The subset of a backend `orders` row the feed cares about.
#[derive(Debug, Deserialize)]
struct OrderRow {
    id: String,
    status: String,
}

impl AuthoritativeUpdate {
    /// Decode an updated backend row, e.g. `{"id": "…", "status": "on_way", …}`.
    ///
    /// Extra columns are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Decode`] for malformed JSON and
    /// [`FeedError::Status`] for a status the backend is not known to emit.
    pub fn from_row(json: &str) -> Result<Self, FeedError> {
        let row: OrderRow = serde_json::from_str(json)?;
        let status = OrderStatus::from_backend(&row.status)?;
        Ok(Self {
            order_id: row.id,
            status,
        })
    }
}

/// Backend side of the feed.
#[derive(Debug, Clone)]
pub struct FeedPublisher {
    tx: mpsc::UnboundedSender<AuthoritativeUpdate>,
}

/// Subscriber side of the feed, owned by the session.
#[derive(Debug)]
pub struct FeedSubscription {
    rx: mpsc::UnboundedReceiver<AuthoritativeUpdate>,
}

/// Open a new feed channel.
#[must_use]
pub fn order_feed() -> (FeedPublisher, FeedSubscription) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FeedPublisher { tx }, FeedSubscription { rx })
}

impl FeedPublisher {
    /// # Errors
    ///
    /// Returns [`FeedError::Closed`] once the subscription has been dropped.
    pub fn publish(&self, update: AuthoritativeUpdate) -> Result<(), FeedError> {
        self.tx.send(update).map_err(|_| FeedError::Closed)
    }

    /// Decode a backend row and publish it.
    ///
    /// # Errors
    ///
    /// Returns the decode error, or [`FeedError::Closed`].
    pub fn publish_row(&self, json: &str) -> Result<(), FeedError> {
        self.publish(AuthoritativeUpdate::from_row(json)?)
    }
}

impl FeedSubscription {
    /// Wait for the next update; `None` once every publisher is gone.
    pub async fn next(&mut self) -> Option<AuthoritativeUpdate> {
        self.rx.recv().await
    }
}
