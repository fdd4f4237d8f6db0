//! Background-task dispatch with UI-thread result delivery.
//!
//! The dispatcher runs blocking work (simulated hardware validation) on
//! dedicated worker threads and marshals every outcome back onto the UI
//! event loop through a deferred-callback queue, so UI state is only ever
//! mutated on the event-loop thread. Worker code never sees a widget or a
//! `&mut` to UI state; the queue capability is the only path back.

pub mod audit;
pub mod dispatcher;
pub mod error;
pub mod hal;
pub mod queue;

// Re-export commonly used types
pub use audit::{AuditLevel, AuditLog};
pub use dispatcher::{TaskDispatcher, WorkItemHandle};
pub use error::{DeliveryError, HalError};
pub use hal::TestbedHal;
pub use queue::{CallbackQueue, CallbackReceiver, CallbackSender, Deferred, DeferredQueue};
