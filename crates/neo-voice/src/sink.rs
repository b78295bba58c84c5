//! Ordered, non-blocking hand-off of frames to the playback transport.

use crate::error::VoiceError;
use crate::frame::SynthesizedAudio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Session-wide cancellation flag.
///
/// Once cancelled it stays cancelled. Blocking decode workers poll
/// [`is_cancelled`](Self::is_cancelled); async code awaits
/// [`cancelled`](Self::cancelled).
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
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

/// Producer side of the output channel.
///
/// Sending never blocks and never drops a frame: the channel is unbounded and
/// backpressure is left to the transport draining the receiver.
#[derive(Debug, Clone)]
pub struct FrameSink {
    tx: mpsc::UnboundedSender<SynthesizedAudio>,
    cancel: CancelFlag,
}

/// Consumer side of the output channel.
pub type FrameReceiver = mpsc::UnboundedReceiver<SynthesizedAudio>;

impl FrameSink {
    /// Creates a sink bound to `cancel`, returning the consumer end.
    pub fn channel(cancel: CancelFlag) -> (Self, FrameReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, cancel }, rx)
    }

    /// Enqueues one frame.
    ///
    /// Fails with [`VoiceError::Cancelled`] once cancellation was requested or
    /// the consumer has gone away; in both cases the frame is not delivered.
    ///
    /// A cancel racing this call from another thread can still let one frame
    /// into the channel. Consumers must check the flag before playing a frame.
    pub fn send(&self, audio: SynthesizedAudio) -> Result<(), VoiceError> {
        if self.cancel.is_cancelled() {
            return Err(VoiceError::Cancelled);
        }
        self.tx.send(audio).map_err(|_| VoiceError::Cancelled)
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.tx.is_closed()
    }
}
