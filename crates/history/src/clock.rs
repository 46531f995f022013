//! Clock abstraction for the debounce timer.
//!
//! Production code uses `RealClock`. Tests substitute a manual clock so
//! debounce windows can be crossed without sleeping.

use std::time::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Real clock using std::time::Instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
