//! Snapshot feed types and an in-process channel transport.

use crate::model::meeting::Meeting;
use crate::model::notification::Notification;
use crate::model::project::Project;
use crate::model::OwnerId;
use std::sync::mpsc::{channel, Receiver, Sender};

/// State of one upstream collection subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSnapshot<T> {
    /// First result not delivered yet.
    Loading,
    /// Full current contents of the collection.
    Ready(Vec<T>),
    /// Subscription reported an error.
    Failed(String),
}

impl<T> From<Vec<T>> for FeedSnapshot<T> {
    fn from(value: Vec<T>) -> Self {
        Self::Ready(value)
    }
}

/// One change delivered by the upstream store, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Signed-in user changed; `None` means signed out.
    OwnerChanged(Option<OwnerId>),
    Projects(FeedSnapshot<Project>),
    Meetings(FeedSnapshot<Meeting>),
    Notifications(FeedSnapshot<Notification>),
}

/// Sending half of a snapshot feed.
///
/// Dropping every publisher ends the feed, which lets `Reconciler::run` return.
#[derive(Debug, Clone)]
pub struct FeedPublisher {
    sender: Sender<SourceEvent>,
}

impl FeedPublisher {
    /// Delivers one event. Returns `false` once the subscriber is gone.
    pub fn publish(&self, event: SourceEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn publish_owner(&self, owner_id: Option<OwnerId>) -> bool {
        self.publish(SourceEvent::OwnerChanged(owner_id))
    }

    pub fn publish_projects(&self, snapshot: impl Into<FeedSnapshot<Project>>) -> bool {
        self.publish(SourceEvent::Projects(snapshot.into()))
    }

    pub fn publish_meetings(&self, snapshot: impl Into<FeedSnapshot<Meeting>>) -> bool {
        self.publish(SourceEvent::Meetings(snapshot.into()))
    }

    pub fn publish_notifications(&self, snapshot: impl Into<FeedSnapshot<Notification>>) -> bool {
        self.publish(SourceEvent::Notifications(snapshot.into()))
    }
}

/// Creates a connected publisher / subscription pair.
pub fn snapshot_feed() -> (FeedPublisher, Receiver<SourceEvent>) {
    let (sender, receiver) = channel();
    (FeedPublisher { sender }, receiver)
}
