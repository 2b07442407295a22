//! Acquire-and-publish steps of the sensor sampling loops.
//!
//! Each sampler owns exactly one input and is the only writer of its shared fields. Waiting
//! between samples is left to the caller.

use crate::{
    aht30::{self, Aht30, Measurement},
    state::SharedState,
    stats::Statistics,
};
use embedded_hal::digital::InputPin;
use embedded_hal_async::{delay::DelayNs, i2c::I2c};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    pub fn is_active(&self, pin_high: bool) -> bool {
        match self {
            Polarity::ActiveHigh => pin_high,
            Polarity::ActiveLow => !pin_high,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum DigitalInput {
    /// IR obstacle sensor, pulls its output low when something is in front of it.
    Proximity,
    /// SW-420 vibration switch, output is high while shaken.
    Vibration,
}

impl DigitalInput {
    pub fn polarity(&self) -> Polarity {
        match self {
            DigitalInput::Proximity => Polarity::ActiveLow,
            DigitalInput::Vibration => Polarity::ActiveHigh,
        }
    }

    fn publish(&self, state: &SharedState, active: bool) {
        match self {
            DigitalInput::Proximity => state.set_object_detected(active),
            DigitalInput::Vibration => state.set_vibrating(active),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Sample {
    Unchanged(bool),
    Changed(bool),
    /// The pin could not be read, nothing was published.
    Failed,
}

pub struct DigitalSampler<P> {
    pin: P,
    input: DigitalInput,
    last: Option<bool>,
}

impl<P: InputPin> DigitalSampler<P> {
    pub fn new(pin: P, input: DigitalInput) -> Self {
        Self {
            pin,
            input,
            last: None,
        }
    }

    pub fn input(&self) -> DigitalInput {
        self.input
    }

    /// Reads the pin level and publishes it, after applying the input's polarity.
    pub fn sample(&mut self, state: &SharedState) -> Sample {
        let Ok(high) = self.pin.is_high() else {
            return Sample::Failed;
        };

        let active = self.input.polarity().is_active(high);
        self.input.publish(state, active);

        if self.last.replace(active) == Some(active) {
            Sample::Unchanged(active)
        } else {
            Sample::Changed(active)
        }
    }
}

pub struct TemperatureSampler<I, D> {
    sensor: Aht30<I, D>,
}

impl<I: I2c, D: DelayNs> TemperatureSampler<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            sensor: Aht30::new(i2c, delay),
        }
    }

    /// Device handshake, to be run once before the first sample.
    pub async fn init(&mut self) -> Result<(), aht30::Error> {
        self.sensor.init().await
    }

    /// Takes one measurement and publishes both temperature and humidity.
    ///
    /// On failure nothing is published and the previous values remain in the shared state.
    pub async fn sample(
        &mut self,
        state: &SharedState,
        stats: &Statistics,
    ) -> Result<Measurement, aht30::Error> {
        match self.sensor.measure().await {
            Ok(measurement) => {
                state.set_temperature(measurement.temperature);
                state.set_humidity(measurement.humidity);
                Statistics::count(&stats.temperature_samples);
                Ok(measurement)
            }
            Err(e) => {
                Statistics::count(&stats.temperature_failures);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        aht30::test::{MockBus, MockDelay},
        state::Readings,
    };
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct MockPin {
        levels: std::vec::IntoIter<Option<bool>>,
    }

    impl MockPin {
        fn new(levels: &[Option<bool>]) -> Self {
            Self {
                levels: levels.to_vec().into_iter(),
            }
        }
    }

    impl ErrorType for MockPin {
        type Error = ErrorKind;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.levels
                .next()
                .flatten()
                .ok_or(ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn proximity_is_active_low() {
        let state = SharedState::new();
        let mut sampler = DigitalSampler::new(
            MockPin::new(&[Some(true), Some(false), Some(false), Some(true)]),
            DigitalInput::Proximity,
        );

        assert_eq!(sampler.sample(&state), Sample::Changed(false));
        assert!(!state.object_detected());

        assert_eq!(sampler.sample(&state), Sample::Changed(true));
        assert!(state.object_detected());

        assert_eq!(sampler.sample(&state), Sample::Unchanged(true));
        assert!(state.object_detected());

        assert_eq!(sampler.sample(&state), Sample::Changed(false));
        assert!(!state.object_detected());

        // Only the proximity field is touched
        assert!(!state.vibrating());
    }

    #[test]
    fn vibration_is_active_high() {
        let state = SharedState::new();
        let mut sampler =
            DigitalSampler::new(MockPin::new(&[Some(true), Some(false)]), DigitalInput::Vibration);

        assert_eq!(sampler.sample(&state), Sample::Changed(true));
        assert!(state.vibrating());

        assert_eq!(sampler.sample(&state), Sample::Changed(false));
        assert!(!state.vibrating());

        assert!(!state.object_detected());
    }

    #[test]
    fn failed_pin_read_keeps_value() {
        let state = SharedState::new();
        let mut sampler =
            DigitalSampler::new(MockPin::new(&[Some(true), None]), DigitalInput::Vibration);

        assert_eq!(sampler.sample(&state), Sample::Changed(true));
        assert_eq!(sampler.sample(&state), Sample::Failed);
        assert!(state.vibrating());
    }

    #[test]
    fn polarity() {
        assert!(Polarity::ActiveHigh.is_active(true));
        assert!(!Polarity::ActiveHigh.is_active(false));
        assert!(!Polarity::ActiveLow.is_active(true));
        assert!(Polarity::ActiveLow.is_active(false));
    }

    fn seeded_state() -> SharedState {
        let state = SharedState::new();
        state.set_temperature(22.5);
        state.set_humidity(41.0);
        state.set_object_detected(true);
        state.set_vibrating(true);
        state
    }

    #[test]
    fn temperature_sample_publishes_both_fields() {
        let state = seeded_state();
        let stats = Statistics::new();

        let bus = MockBus {
            // 40 %RH, 25 C
            response: Some([0x1C, 0x66, 0x66, 0x66, 0x00, 0x00, 0x00]),
            ..Default::default()
        };
        let mut sampler = TemperatureSampler::new(bus, MockDelay::default());

        embassy_futures::block_on(sampler.init()).unwrap();
        let measurement = embassy_futures::block_on(sampler.sample(&state, &stats)).unwrap();

        assert_eq!(state.temperature(), measurement.temperature);
        assert_eq!(state.humidity(), measurement.humidity);
        assert!((state.temperature() - 25.0).abs() < 0.001);
        assert!(state.object_detected());
        assert!(state.vibrating());

        let report = stats.report();
        assert_eq!(report.temperature_samples, 1);
        assert_eq!(report.temperature_failures, 0);
    }

    #[test]
    fn failed_bus_transaction_keeps_prior_values() {
        let state = seeded_state();
        let before = state.snapshot();
        let stats = Statistics::new();

        // No response available: the read fails after the trigger was written
        let mut sampler = TemperatureSampler::new(MockBus::default(), MockDelay::default());

        let result = embassy_futures::block_on(sampler.sample(&state, &stats));
        assert!(result.is_err());
        assert_eq!(state.snapshot(), before);

        // Trigger is not acknowledged
        let bus = MockBus {
            fail_writes: true,
            ..Default::default()
        };
        let mut sampler = TemperatureSampler::new(bus, MockDelay::default());

        let result = embassy_futures::block_on(sampler.sample(&state, &stats));
        assert!(result.is_err());
        assert_eq!(
            state.snapshot(),
            Readings {
                temperature: 22.5,
                humidity: 41.0,
                object_detected: true,
                vibrating: true,
            }
        );

        let report = stats.report();
        assert_eq!(report.temperature_samples, 0);
        assert_eq!(report.temperature_failures, 2);
    }
}
