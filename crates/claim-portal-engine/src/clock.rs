use chrono::{DateTime, Utc};

pub trait ClockAdapter: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockAdapter for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl ClockAdapter for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
