//! Cancellable read loop over a streamed response body.
//!
//! [`ReplyReader`] owns the body and releases it exactly once: on end of
//! stream, on [`cancel`](ReplyReader::cancel), or on drop, whichever comes
//! first. [`read_reply`] pumps it into a [`StreamingReplyAssembler`] and
//! publishes each update to the chat log.

use crate::core::ChatLog;
use crate::error::{Error, StreamError};
use crate::stream::{StreamOutcome, StreamingReplyAssembler};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// External stop signal for a running read loop.
///
/// Clones share the signal. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    /// Creates an untriggered handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers the signal.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves when the signal is triggered.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Owner of a streamed response body.
pub struct ReplyReader<S> {
    body: Option<S>,
}

impl<S> ReplyReader<S> {
    /// Wraps a body stream.
    pub const fn new(body: S) -> Self {
        Self { body: Some(body) }
    }

    /// Releases the body. Returns true if this call released it; later
    /// calls are no-ops.
    pub fn cancel(&mut self) -> bool {
        self.release("cancelled")
    }

    /// Returns true once the body has been released.
    pub const fn is_released(&self) -> bool {
        self.body.is_none()
    }

    fn release(&mut self, reason: &str) -> bool {
        match self.body.take() {
            Some(body) => {
                drop(body);
                debug!(reason, "response body released");
                true
            }
            None => false,
        }
    }
}

impl<S, E> ReplyReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    /// Reads the next chunk.
    ///
    /// Returns `None` at end of body or after cancellation. A read error is
    /// returned once; the body is released with it.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes, StreamError>> {
        let body = self.body.as_mut()?;
        match body.next().await {
            Some(Ok(chunk)) => Some(Ok(chunk)),
            Some(Err(err)) => {
                self.release("read error");
                Some(Err(StreamError::Read(err.to_string())))
            }
            None => {
                self.release("end of body");
                None
            }
        }
    }
}

impl<S> Drop for ReplyReader<S> {
    fn drop(&mut self) {
        self.release("dropped");
    }
}

impl<S> fmt::Debug for ReplyReader<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyReader")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Feeds `reader` into `assembler` until the body ends, a `done` event
/// arrives, the read fails, or `cancel` fires.
///
/// `on_update` sees the log after every chunk that applied an event. The
/// returned outcome has not been passed to
/// [`finish`](StreamingReplyAssembler::finish) yet. A cancelled read counts
/// as completed, keeping whatever arrived.
pub async fn read_reply<S, E, F>(
    reader: &mut ReplyReader<S>,
    assembler: &mut StreamingReplyAssembler,
    log: &mut ChatLog,
    cancel: &CancelHandle,
    on_update: &mut F,
) -> StreamOutcome
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
    F: FnMut(&ChatLog),
{
    let outcome = loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("reply read cancelled by caller");
                break StreamOutcome::Completed;
            }
            next = reader.next_chunk() => next,
        };

        match next {
            None => break StreamOutcome::Completed,
            Some(Err(err)) => break StreamOutcome::Failed(Error::Stream(err)),
            Some(Ok(chunk)) => {
                let events = assembler.feed(&chunk);
                if !events.is_empty() {
                    assembler.publish(log);
                    on_update(log);
                }
                if assembler.is_finalized() {
                    break StreamOutcome::Completed;
                }
            }
        }
    };
    reader.cancel();
    outcome
}
