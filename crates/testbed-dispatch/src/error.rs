//! Dispatch-layer errors.

use thiserror::Error;

/// Simulated hardware faults surfaced by the HAL.
///
/// These never propagate out of a worker thread; the dispatcher converts
/// them into failure outcomes at the worker boundary.
#[derive(Debug, Error)]
pub enum HalError {
    /// Component did not answer on the bus within the simulated window.
    #[error("bus timeout on {component} after {waited_ms} ms")]
    BusTimeout { component: String, waited_ms: u64 },
}

/// The deferred-callback queue is unavailable.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The event loop dropped its receiver (UI already torn down).
    #[error("deferred-callback queue is closed")]
    QueueClosed,
}
