#![no_std]
#![no_main]

mod alarm;
mod display;
mod network;
mod sensors;

use assign_resources::assign_resources;
use defmt::{Format, info};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::asynch::i2c::I2cDevice;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::{
    Peri, bind_interrupts,
    i2c::{self, I2c},
    interrupt,
    interrupt::{InterruptExt, Priority},
    peripherals::{self, I2C0},
    watchdog::Watchdog,
};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embassy_time::{Duration, Instant, Timer};
use envmon_core::{state::SharedState, stats::Statistics};
#[cfg(feature = "panic-probe")]
use panic_probe as _;
use portable_atomic as _;
use static_cell::StaticCell;

assign_resources! {
    i2c: I2cResources {
        i2c: I2C0,
        sda: PIN_4,
        scl: PIN_5,
    },
    proximity: ProximityResources {
        pin: PIN_16,
    },
    vibration: VibrationResources {
        pin: PIN_17,
    },
    alarm: AlarmResources {
        buzzer: PIN_18,
        indicator: PIN_15,
    },
    wifi: WifiResources {
        pwr: PIN_23,
        cs: PIN_25,
        dio: PIN_24,
        clk: PIN_29,
        pio: PIO0,
        dma_ch: DMA_CH0,
    },
    status: StatusResources {
        watchdog: WATCHDOG,
    },
}

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// Latest sensor readings.
pub(crate) static STATE: SharedState = SharedState::new();

pub(crate) static STATS: Statistics = Statistics::new();

type I2cBus = Mutex<CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

/// Handle on the I2C bus shared by the temperature sensor and the display.
pub(crate) type SharedI2c =
    I2cDevice<'static, CriticalSectionRawMutex, I2c<'static, I2C0, i2c::Async>>;

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();

static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MEDIUM: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    unsafe { EXECUTOR_HIGH.on_interrupt() }
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    unsafe { EXECUTOR_MEDIUM.on_interrupt() }
}

#[cfg(not(feature = "panic-probe"))]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    use embassy_rp::gpio::{Level, Output};

    // Stop the interrupt executors, nothing else may drive the alarm outputs from here on
    interrupt::SWI_IRQ_1.disable();
    interrupt::SWI_IRQ_0.disable();

    let p = unsafe { embassy_rp::Peripherals::steal() };
    let r = split_resources!(p);

    // Silence the buzzer and keep the indicator lit until the watchdog resets the board
    let _buzzer = Output::new(r.alarm.buzzer, Level::Low);
    let _indicator = Output::new(r.alarm.indicator, Level::High);

    loop {
        embassy_time::block_for(Duration::from_millis(100));
    }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());
    let r = split_resources!(p);

    info!("{}", system_information());

    let mut config = i2c::Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_async(r.i2c.i2c, r.i2c.scl, r.i2c.sda, Irqs, config);
    let i2c_bus: &'static I2cBus = I2C_BUS.init(Mutex::new(i2c));

    // The alarm must stay responsive whatever else is going on
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner.must_spawn(alarm::task(r.alarm));

    interrupt::SWI_IRQ_0.set_priority(Priority::P3);
    let spawner = EXECUTOR_MEDIUM.start(interrupt::SWI_IRQ_0);
    spawner.must_spawn(sensors::proximity_task(r.proximity));
    spawner.must_spawn(sensors::vibration_task(r.vibration));
    spawner.must_spawn(sensors::temperature_task(I2cDevice::new(i2c_bus)));

    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(watchdog_feed_task(r.status));
        spawner.must_spawn(statistics_report_task());
        spawner.must_spawn(display::task(I2cDevice::new(i2c_bus)));
        spawner.must_spawn(network::task(r.wifi, spawner));
        spawner.must_spawn(network::upload::task());

        #[cfg(feature = "test-panic")]
        spawner.must_spawn(dummy_panic());
    })
}

/// Converts one of the shared period constants to an embassy duration.
pub(crate) fn duration(d: core::time::Duration) -> Duration {
    Duration::from_micros(d.as_micros() as u64)
}

#[embassy_executor::task]
async fn watchdog_feed_task(r: StatusResources) {
    let mut watchdog = Watchdog::new(r.watchdog);
    watchdog.start(Duration::from_secs(5));

    loop {
        watchdog.feed();
        Timer::after_secs(1).await;
    }
}

#[embassy_executor::task]
async fn statistics_report_task() {
    loop {
        Timer::after_secs(60).await;

        info!("{}", system_information());
        info!("{}", STATS.report());
    }
}

#[cfg(feature = "test-panic")]
#[embassy_executor::task]
async fn dummy_panic() {
    Timer::after_secs(5).await;
    panic!("oh dear, how sad. nevermind...");
}

#[derive(Format)]
struct SystemInformation {
    git_revision: heapless::String<20>,
    last_boot_reason: BootReason,
    uptime_milliseconds: u64,
}

#[derive(Format)]
enum BootReason {
    Normal,
    WatchdogTimeout,
    WatchdogForced,
}

fn system_information() -> SystemInformation {
    SystemInformation {
        git_revision: git_version::git_version!(fallback = "unknown")
            .try_into()
            .unwrap_or_default(),
        last_boot_reason: boot_reason(),
        uptime_milliseconds: Instant::now().as_millis(),
    }
}

fn boot_reason() -> BootReason {
    let reason = embassy_rp::pac::WATCHDOG.reason().read();

    if reason.force() {
        BootReason::WatchdogForced
    } else if reason.timer() {
        BootReason::WatchdogTimeout
    } else {
        BootReason::Normal
    }
}
