use core::sync::atomic::Ordering;
use portable_atomic::AtomicU64;

/// Counters of sampling and upload outcomes.
///
/// Diagnostics only: they are reported in the logs and never read by any control path.
#[derive(Default)]
pub struct Statistics {
    pub(crate) temperature_samples: AtomicU64,
    pub(crate) temperature_failures: AtomicU64,
    pub(crate) uploads_delivered: AtomicU64,
    pub(crate) uploads_failed: AtomicU64,
    pub(crate) uploads_skipped: AtomicU64,
}

impl Statistics {
    pub const fn new() -> Self {
        Self {
            temperature_samples: AtomicU64::new(0),
            temperature_failures: AtomicU64::new(0),
            uploads_delivered: AtomicU64::new(0),
            uploads_failed: AtomicU64::new(0),
            uploads_skipped: AtomicU64::new(0),
        }
    }

    pub fn report(&self) -> StatisticsReport {
        StatisticsReport {
            temperature_samples: self.temperature_samples.load(Ordering::Relaxed),
            temperature_failures: self.temperature_failures.load(Ordering::Relaxed),
            uploads_delivered: self.uploads_delivered.load(Ordering::Relaxed),
            uploads_failed: self.uploads_failed.load(Ordering::Relaxed),
            uploads_skipped: self.uploads_skipped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn count(counter: &AtomicU64) {
        counter.add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct StatisticsReport {
    pub temperature_samples: u64,
    pub temperature_failures: u64,
    pub uploads_delivered: u64,
    pub uploads_failed: u64,
    pub uploads_skipped: u64,
}
