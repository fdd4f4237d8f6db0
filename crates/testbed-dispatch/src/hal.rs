//! Simulated hardware abstraction layer.
//!
//! Stands in for the physical testbed: validations sleep for a configured
//! latency window and sensor readings are noise around a fixed baseline.
//! Fault injection is off by default; turn it up to exercise the failure
//! delivery path.

use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::error::HalError;

/// Baseline for the simulated sensor stream.
const SENSOR_BASELINE: f64 = 50.0;

/// Peak-to-baseline spread of the simulated sensor stream.
const SENSOR_SPREAD: f64 = 10.0;

/// Hardware abstraction layer for one morphology.
#[derive(Debug, Clone)]
pub struct TestbedHal {
    morphology_name: String,
    latency: Duration,
    jitter: Duration,
    fault_rate: f64,
}

impl TestbedHal {
    /// Create a HAL for the named morphology with the default simulated
    /// latency (1.5 s plus up to 500 ms jitter, no faults).
    pub fn new(morphology_name: impl Into<String>) -> Self {
        Self {
            morphology_name: morphology_name.into(),
            latency: Duration::from_millis(1500),
            jitter: Duration::from_millis(500),
            fault_rate: 0.0,
        }
    }

    /// Builder method to set the base validation latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Builder method to set the maximum random jitter added per
    /// validation.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Builder method to set the fault-injection probability, clamped to
    /// [0, 1].
    pub fn with_fault_rate(mut self, fault_rate: f64) -> Self {
        self.fault_rate = fault_rate.clamp(0.0, 1.0);
        self
    }

    /// The morphology this HAL represents.
    pub fn morphology_name(&self) -> &str {
        &self.morphology_name
    }

    /// Run a validation against one component.
    ///
    /// Blocks the calling thread for the simulated hardware latency, then
    /// reports `"{component}: OK"` or an injected fault. Intended to run on
    /// a dispatcher worker thread, never on the UI thread.
    pub fn validate(&self, component: &str) -> Result<String, HalError> {
        let mut rng = rand::thread_rng();
        let jitter = if self.jitter.is_zero() {
            Duration::ZERO
        } else {
            self.jitter.mul_f64(rng.gen::<f64>())
        };
        let wait = self.latency + jitter;
        thread::sleep(wait);

        if self.fault_rate > 0.0 && rng.gen::<f64>() < self.fault_rate {
            return Err(HalError::BusTimeout {
                component: component.to_string(),
                waited_ms: wait.as_millis() as u64,
            });
        }

        Ok(format!("{component}: OK"))
    }

    /// One reading from the simulated sensor stream (e.g. voltage or
    /// torque).
    pub fn sensor_reading(&self) -> f64 {
        SENSOR_BASELINE + rand::thread_rng().gen::<f64>() * SENSOR_SPREAD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hal() -> TestbedHal {
        TestbedHal::new("Bench_Rig")
            .with_latency(Duration::from_millis(5))
            .with_jitter(Duration::ZERO)
    }

    #[test]
    fn test_validate_reports_ok() {
        let result = fast_hal().validate("Torque_Sensor_01").unwrap();
        assert_eq!(result, "Torque_Sensor_01: OK");
    }

    #[test]
    fn test_fault_injection_always_fails_at_full_rate() {
        let hal = fast_hal().with_fault_rate(1.0);
        let err = hal.validate("Thermal_Probe_A").unwrap_err();
        assert!(err.to_string().contains("Thermal_Probe_A"));
    }

    #[test]
    fn test_fault_rate_is_clamped() {
        let hal = fast_hal().with_fault_rate(7.5);
        assert!(hal.validate("Servo").is_err());
    }

    #[test]
    fn test_sensor_readings_stay_in_band() {
        let hal = fast_hal();
        for _ in 0..100 {
            let value = hal.sensor_reading();
            assert!((SENSOR_BASELINE..SENSOR_BASELINE + SENSOR_SPREAD).contains(&value));
        }
    }
}
