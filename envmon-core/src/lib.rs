#![cfg_attr(feature = "no-std", no_std)]

pub mod aht30;
pub mod alarm;
pub mod display;
pub mod sampler;
pub mod state;
pub mod stats;
pub mod upload;

use core::time::Duration;

/// Temperature (in degrees Celsius) above which the monitor considers the environment too hot.
///
/// Shared by the alarm machine and the display, which evaluate it independently.
pub const TEMPERATURE_WARNING_THRESHOLD: f32 = 30.0;

pub const PROXIMITY_PERIOD: Duration = Duration::from_millis(10);
pub const VIBRATION_PERIOD: Duration = Duration::from_millis(100);
pub const TEMPERATURE_PERIOD: Duration = Duration::from_millis(500);
pub const DISPLAY_PERIOD: Duration = Duration::from_millis(1000);
pub const UPLOAD_PERIOD: Duration = Duration::from_millis(2000);

pub(crate) fn above_warning_threshold(temperature: f32) -> bool {
    temperature > TEMPERATURE_WARNING_THRESHOLD
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert!(!above_warning_threshold(29.9));
        assert!(!above_warning_threshold(30.0));
        assert!(above_warning_threshold(30.01));
        assert!(!above_warning_threshold(f32::NAN));
    }
}
