mod boot_screen;

use self::boot_screen::BootScreen;
use crate::{STATE, SharedI2c, duration};
use defmt::{debug, info, warn};
use embassy_futures::select::select;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Timer;
use embedded_graphics::{Drawable, pixelcolor::BinaryColor};
use envmon_core::{
    DISPLAY_PERIOD,
    display::{Frame, Layout},
};
use ssd1306::{I2CDisplayInterface, Ssd1306Async, mode::BufferedGraphicsModeAsync, prelude::*};

/// Requests an immediate redraw, coalesced if the display task is busy.
pub(crate) static REFRESH: Signal<CriticalSectionRawMutex, ()> = Signal::new();

type Display = Ssd1306Async<
    I2CInterface<SharedI2c>,
    DisplaySize128x64,
    BufferedGraphicsModeAsync<DisplaySize128x64>,
>;

#[embassy_executor::task]
pub(crate) async fn task(i2c: SharedI2c) {
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();

    if display.init().await.is_err() {
        warn!("Failed to initialise display");
    }

    // Show the boot splash screen
    render(&mut display, &BootScreen).await;
    Timer::after_secs(2).await;

    let mut layout = None;

    loop {
        let frame = Frame::compose(&STATE.snapshot());

        if layout != Some(frame.layout()) {
            match frame.layout() {
                Layout::Critical => warn!("Display showing high temperature warning"),
                Layout::Normal => info!("Display showing readings"),
            }
            layout = Some(frame.layout());
        }

        render(&mut display, &frame).await;

        select(Timer::after(duration(DISPLAY_PERIOD)), REFRESH.wait()).await;
    }
}

async fn render<T>(display: &mut Display, drawable: &T)
where
    T: Drawable<Color = BinaryColor>,
{
    debug!("Display draw");

    display.clear_buffer();

    if drawable.draw(display).is_err() {
        warn!("Failed to draw to display buffer");
        return;
    }

    if display.flush().await.is_err() {
        warn!("Failed to flush display");
    }
}
