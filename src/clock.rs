use chrono::{DateTime, FixedOffset, Local, Utc};

/// Source of "now". Local offset matters for generated list names and history sections.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    pub fn utc(instant: DateTime<Utc>) -> Self {
        FixedClock(instant.fixed_offset())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_reports_its_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let clock = FixedClock::utc(instant);
        assert_eq!(clock.now_utc(), instant);
    }

    #[test]
    fn fixed_clock_keeps_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2026, 10, 19, 1, 0, 0).unwrap();
        let clock = FixedClock(local);
        assert_eq!(clock.now().offset(), &offset);
        assert_eq!(
            clock.now_utc(),
            Utc.with_ymd_and_hms(2026, 10, 18, 23, 0, 0).unwrap()
        );
    }
}
