//! Cancellable Event Streams
//!
//! Auth-state watchers and collection listeners are callback based in the
//! hosted SDK. Both are exposed here as a `Stream` fed by an unbounded channel,
//! with the SDK's unsubscribe handle attached as a cancel hook.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::stream::{FusedStream, Stream};

use crate::domain::{StoreError, WishlistItem};
use super::traits::Identity;

/// Auth state changes: `Some` while signed in, `None` when signed out
pub type AuthStateStream = EventStream<Option<Identity>>;

/// Full collection snapshots, or the listener's error
pub type SnapshotStream = EventStream<Result<Vec<WishlistItem>, StoreError>>;

/// A live event source with an explicit cancel capability.
///
/// The cancel hook runs exactly once: on `cancel()` or on drop, whichever
/// comes first. After cancelling, the stream yields whatever was already
/// queued and then ends.
pub struct EventStream<T> {
    receiver: UnboundedReceiver<T>,
    on_cancel: Option<Box<dyn FnOnce()>>,
    cancelled: bool,
}

impl<T> EventStream<T> {
    /// Create a stream and the sender that feeds it
    pub fn channel(on_cancel: impl FnOnce() + 'static) -> (UnboundedSender<T>, Self) {
        let (sender, receiver) = mpsc::unbounded();
        let stream = Self {
            receiver,
            on_cancel: Some(Box::new(on_cancel)),
            cancelled: false,
        };
        (sender, stream)
    }

    /// Stream whose only release action is closing the channel
    pub fn detached() -> (UnboundedSender<T>, Self) {
        let (sender, receiver) = mpsc::unbounded();
        let stream = Self {
            receiver,
            on_cancel: None,
            cancelled: false,
        };
        (sender, stream)
    }

    /// Attach the release action once the subscription exists.
    ///
    /// Runs `on_cancel` immediately if the stream was already cancelled.
    pub fn set_cancel_hook(&mut self, on_cancel: impl FnOnce() + 'static) {
        if self.cancelled {
            on_cancel();
            return;
        }
        if let Some(previous) = self.on_cancel.replace(Box::new(on_cancel)) {
            previous();
        }
    }

    /// Release the underlying subscription
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.receiver.close();
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl<T> FusedStream for EventStream<T> {
    fn is_terminated(&self) -> bool {
        self.receiver.is_terminated()
    }
}

impl<T> Drop for EventStream<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
