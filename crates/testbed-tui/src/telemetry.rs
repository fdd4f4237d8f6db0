//! Background telemetry sampler.
//!
//! Samples the simulated sensor stream at a fixed rate and delivers each
//! reading through the same deferred-callback queue the dispatcher uses,
//! so the rolling graph is mutated on the event-loop thread like
//! everything else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use testbed_dispatch::{AuditLevel, AuditLog, CallbackSender, TestbedHal};

use crate::state::UiState;

/// Every Nth sample is also written to the audit log.
const AUDIT_EVERY: u64 = 20;

/// Spawn the sampler thread.
///
/// Stops when the shutdown flag is raised or the event loop drops its
/// receiver.
pub fn spawn_sampler(
    hal: TestbedHal,
    queue: CallbackSender<UiState>,
    audit: Arc<AuditLog>,
    period: Duration,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut sample_count: u64 = 0;
        loop {
            thread::sleep(period);
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            let value = hal.sensor_reading();
            sample_count += 1;
            if sample_count % AUDIT_EVERY == 0 {
                audit.record(
                    AuditLevel::Info,
                    &format!("TELEMETRY_SAMPLE: Current Value {value:.2}"),
                );
            }

            let delivered =
                queue.schedule(Box::new(move |state: &mut UiState| state.push_sample(value)));
            if delivered.is_err() {
                debug!("Telemetry queue closed, stopping sampler");
                break;
            }
        }
    })
}
