//! Time source abstraction

use crate::Timestamp;
use chrono::Utc;

/// Source of "now" for every time-dependent transition.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
