//! Over-temperature alarm.
//!
//! The machine is idle until the temperature exceeds [`TEMPERATURE_WARNING_THRESHOLD`], at which
//! point it lights the indicator and sounds [`PULSE_COUNT`] buzzer pulses. The full sequence is
//! always completed, whatever the temperature does in the meantime, before the machine returns to
//! idle and asks for the display to be refreshed.
//!
//! Time is passed in by the caller as milliseconds since boot, so the machine never sleeps itself.
//! The caller must poll again no later than [`Step::wake_at`]; polling earlier is harmless.
//!
//! Each phase is timed from the poll that started it. A caller that wakes late delays the rest of
//! the sequence, but never shortens or skips a pulse.
//!
//! [`TEMPERATURE_WARNING_THRESHOLD`]: crate::TEMPERATURE_WARNING_THRESHOLD

use core::time::Duration;

/// Milliseconds since boot.
pub type Instant = u64;

/// Interval between temperature checks while idle.
pub const IDLE_CHECK_PERIOD: Duration = Duration::from_millis(100);

pub const PULSE_COUNT: u8 = 5;
pub const PULSE_ON_TIME: Duration = Duration::from_millis(500);
pub const PULSE_OFF_TIME: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum AlarmState {
    Idle,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum AlarmEvent {
    WarningRaised,
    WarningCleared,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct Outputs {
    pub indicator: bool,
    pub buzzer: bool,
}

/// What the caller has to do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct Step {
    pub outputs: Outputs,
    pub refresh_display: bool,
    pub event: Option<AlarmEvent>,
    pub wake_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inner {
    Idle,
    Warning {
        pulses_completed: u8,
        buzzer: bool,
        deadline: Instant,
    },
}

#[derive(Debug)]
pub struct AlarmMachine {
    inner: Inner,
}

impl Default for AlarmMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlarmMachine {
    pub const fn new() -> Self {
        Self { inner: Inner::Idle }
    }

    pub fn state(&self) -> AlarmState {
        match self.inner {
            Inner::Idle => AlarmState::Idle,
            Inner::Warning { .. } => AlarmState::Warning,
        }
    }

    pub fn outputs(&self) -> Outputs {
        match self.inner {
            Inner::Idle => Outputs::default(),
            Inner::Warning { buzzer, .. } => Outputs {
                indicator: true,
                buzzer,
            },
        }
    }

    /// Advances the machine to `now`.
    ///
    /// `temperature` is only looked at while idle.
    pub fn poll(&mut self, now: Instant, temperature: f32) -> Step {
        let mut refresh_display = false;
        let mut event = None;

        let wake_at = match self.inner {
            Inner::Idle => {
                if crate::above_warning_threshold(temperature) {
                    let deadline = now + millis(PULSE_ON_TIME);
                    self.inner = Inner::Warning {
                        pulses_completed: 0,
                        buzzer: true,
                        deadline,
                    };
                    event = Some(AlarmEvent::WarningRaised);
                    deadline
                } else {
                    now + millis(IDLE_CHECK_PERIOD)
                }
            }
            Inner::Warning { deadline, .. } if now < deadline => deadline,
            Inner::Warning {
                pulses_completed,
                buzzer: true,
                ..
            } => {
                let deadline = now + millis(PULSE_OFF_TIME);
                self.inner = Inner::Warning {
                    pulses_completed,
                    buzzer: false,
                    deadline,
                };
                deadline
            }
            Inner::Warning {
                pulses_completed,
                buzzer: false,
                ..
            } => {
                let pulses_completed = pulses_completed + 1;

                if pulses_completed >= PULSE_COUNT {
                    self.inner = Inner::Idle;
                    refresh_display = true;
                    event = Some(AlarmEvent::WarningCleared);
                    now + millis(IDLE_CHECK_PERIOD)
                } else {
                    let deadline = now + millis(PULSE_ON_TIME);
                    self.inner = Inner::Warning {
                        pulses_completed,
                        buzzer: true,
                        deadline,
                    };
                    deadline
                }
            }
        };

        Step {
            outputs: self.outputs(),
            refresh_display,
            event,
            wake_at,
        }
    }
}

fn millis(d: Duration) -> Instant {
    d.as_millis() as Instant
}
