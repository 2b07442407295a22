use crate::STATE;
use defmt::{info, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Instant, Timer};
use envmon_core::alarm::{AlarmEvent, AlarmMachine};

#[embassy_executor::task]
pub(crate) async fn task(r: crate::AlarmResources) {
    let mut indicator = Output::new(r.indicator, Level::Low);
    let mut buzzer = Output::new(r.buzzer, Level::Low);

    let mut machine = AlarmMachine::new();

    loop {
        let step = machine.poll(Instant::now().as_millis(), STATE.temperature());

        indicator.set_level(step.outputs.indicator.into());
        buzzer.set_level(step.outputs.buzzer.into());

        match step.event {
            Some(AlarmEvent::WarningRaised) => {
                warn!("Temperature warning: {} C", STATE.temperature())
            }
            Some(AlarmEvent::WarningCleared) => info!("Temperature warning sequence complete"),
            None => {}
        }

        if step.refresh_display {
            crate::display::REFRESH.signal(());
        }

        Timer::at(Instant::from_millis(step.wake_at)).await;
    }
}
