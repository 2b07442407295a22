use crate::{STATE, STATS, SharedI2c, duration};
use defmt::{debug, error, info, warn};
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Delay, Ticker, Timer};
use envmon_core::{
    PROXIMITY_PERIOD, TEMPERATURE_PERIOD, VIBRATION_PERIOD,
    sampler::{DigitalInput, DigitalSampler, Sample, TemperatureSampler},
};

#[embassy_executor::task]
pub(crate) async fn proximity_task(r: crate::ProximityResources) {
    let sampler = DigitalSampler::new(Input::new(r.pin, Pull::Up), DigitalInput::Proximity);
    poll_digital_input(sampler, PROXIMITY_PERIOD).await;
}

#[embassy_executor::task]
pub(crate) async fn vibration_task(r: crate::VibrationResources) {
    let sampler = DigitalSampler::new(Input::new(r.pin, Pull::Down), DigitalInput::Vibration);
    poll_digital_input(sampler, VIBRATION_PERIOD).await;
}

async fn poll_digital_input(
    mut sampler: DigitalSampler<Input<'static>>,
    period: core::time::Duration,
) -> ! {
    let mut tick = Ticker::every(duration(period));

    loop {
        match sampler.sample(&STATE) {
            Sample::Changed(active) => info!("{} input changed: active={}", sampler.input(), active),
            Sample::Unchanged(_) => {}
            Sample::Failed => warn!("Failed to read {} input", sampler.input()),
        }

        tick.next().await;
    }
}

#[embassy_executor::task]
pub(crate) async fn temperature_task(i2c: SharedI2c) {
    let mut sampler = TemperatureSampler::new(i2c, Delay);

    // The device still measures on its power-on calibration if this fails
    match sampler.init().await {
        Ok(()) => info!("AHT30 initialised"),
        Err(e) => warn!("AHT30 initialisation failed: {}", e),
    }

    loop {
        match sampler.sample(&STATE, &STATS).await {
            Ok(m) => debug!(
                "Temperature: {} C, humidity: {} %RH",
                m.temperature, m.humidity
            ),
            Err(e) => error!("AHT30 measurement failed: {}", e),
        }

        Timer::after(duration(TEMPERATURE_PERIOD)).await;
    }
}
