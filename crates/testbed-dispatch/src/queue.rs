//! Deferred-callback queue: the only sanctioned path to UI mutation.
//!
//! Worker threads schedule closures here; the event loop drains the queue
//! once per iteration and runs each closure with `&mut S` on its own
//! thread. Scheduling order is preserved per sender, so a single
//! dispatcher's deliveries arrive in completion order.

use tokio::sync::mpsc;

use crate::error::DeliveryError;

/// A pending UI-thread mutation, owned by the queue until executed.
pub type Deferred<S> = Box<dyn FnOnce(&mut S) + Send>;

/// Capability to schedule a callback onto the UI event loop.
///
/// Any implementation must be callable from any thread and must run
/// scheduled callbacks on the event-loop thread, in scheduling order.
pub trait DeferredQueue<S: 'static>: Send + Sync {
    /// Schedule a callback to run at the event loop's next opportunity.
    fn schedule(&self, callback: Deferred<S>) -> Result<(), DeliveryError>;
}

/// Channel-backed deferred-callback queue.
pub struct CallbackQueue;

impl CallbackQueue {
    /// Create an unbounded sender/receiver pair.
    ///
    /// Unbounded so `schedule` never blocks a worker thread; task volume is
    /// human-button-press-driven, not programmatic.
    pub fn unbounded<S: 'static>() -> (CallbackSender<S>, CallbackReceiver<S>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CallbackSender { tx }, CallbackReceiver { rx })
    }
}

/// Sending half of the queue; held by the dispatcher and any background
/// producers (e.g. the telemetry sampler).
pub struct CallbackSender<S: 'static> {
    tx: mpsc::UnboundedSender<Deferred<S>>,
}

impl<S: 'static> CallbackSender<S> {
    /// Schedule a callback to run at the event loop's next drain.
    pub fn schedule(&self, callback: Deferred<S>) -> Result<(), DeliveryError> {
        self.tx
            .send(callback)
            .map_err(|_| DeliveryError::QueueClosed)
    }
}

impl<S: 'static> Clone for CallbackSender<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: 'static> DeferredQueue<S> for CallbackSender<S> {
    fn schedule(&self, callback: Deferred<S>) -> Result<(), DeliveryError> {
        CallbackSender::schedule(self, callback)
    }
}

/// Receiving half of the queue; owned by the event loop.
pub struct CallbackReceiver<S: 'static> {
    rx: mpsc::UnboundedReceiver<Deferred<S>>,
}

impl<S: 'static> CallbackReceiver<S> {
    /// Drain all pending callbacks, running each with `&mut state`.
    ///
    /// Called once per event-loop iteration, on the event-loop thread.
    /// Returns the number of callbacks executed.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut executed = 0;
        while let Ok(callback) = self.rx.try_recv() {
            callback(state);
            executed += 1;
        }
        executed
    }

    /// Await the next callback without running it. Test helper.
    pub async fn recv(&mut self) -> Option<Deferred<S>> {
        self.rx.recv().await
    }
}
