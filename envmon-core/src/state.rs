//! Latest sensor values, shared between every task of the monitor.
//!
//! Each field is an independent atomic holder written by exactly one sampler. Readers get the last
//! published value (or the power-on default). There is no guarantee that several fields read one
//! after the other belong to the same moment in time: consumers treat the values as eventually
//! consistent telemetry and tolerate a value being one sample stale.

use core::sync::atomic::Ordering;
use portable_atomic::{AtomicBool, AtomicF32};

pub struct SharedState {
    temperature: AtomicF32,
    humidity: AtomicF32,
    object_detected: AtomicBool,
    vibrating: AtomicBool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            temperature: AtomicF32::new(0.0),
            humidity: AtomicF32::new(0.0),
            object_detected: AtomicBool::new(false),
            vibrating: AtomicBool::new(false),
        }
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f32 {
        self.temperature.load(Ordering::Relaxed)
    }

    pub fn set_temperature(&self, value: f32) {
        self.temperature.store(value, Ordering::Relaxed);
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f32 {
        self.humidity.load(Ordering::Relaxed)
    }

    pub fn set_humidity(&self, value: f32) {
        self.humidity.store(value, Ordering::Relaxed);
    }

    pub fn object_detected(&self) -> bool {
        self.object_detected.load(Ordering::Relaxed)
    }

    pub fn set_object_detected(&self, value: bool) {
        self.object_detected.store(value, Ordering::Relaxed);
    }

    pub fn vibrating(&self) -> bool {
        self.vibrating.load(Ordering::Relaxed)
    }

    pub fn set_vibrating(&self, value: bool) {
        self.vibrating.store(value, Ordering::Relaxed);
    }

    /// Reads every field once.
    ///
    /// The fields are loaded independently, a sampler may publish between two loads.
    pub fn snapshot(&self) -> Readings {
        Readings {
            temperature: self.temperature(),
            humidity: self.humidity(),
            object_detected: self.object_detected(),
            vibrating: self.vibrating(),
        }
    }
}

/// A copy of the shared sensor values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct Readings {
    pub temperature: f32,
    pub humidity: f32,
    pub object_detected: bool,
    pub vibrating: bool,
}
