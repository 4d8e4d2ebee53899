//! Reminder delivery seam.
//!
//! Stores only record reminder timestamps. Anything that actually wakes the
//! user up plugs in here, keyed by list id.

use chrono::{DateTime, Utc};
use log::info;

pub trait ReminderScheduler {
    fn schedule(&mut self, list_id: &str, at: DateTime<Utc>);
    fn cancel(&mut self, list_id: &str);
}

/// Drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl ReminderScheduler for NoopScheduler {
    fn schedule(&mut self, _list_id: &str, _at: DateTime<Utc>) {}

    fn cancel(&mut self, _list_id: &str) {}
}

/// Records requests in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScheduler;

impl ReminderScheduler for LogScheduler {
    fn schedule(&mut self, list_id: &str, at: DateTime<Utc>) {
        info!(
            "event=reminder_schedule module=reminder status=ok list_id={list_id} at={}",
            crate::model::iso8601::format(&at)
        );
    }

    fn cancel(&mut self, list_id: &str) {
        info!("event=reminder_cancel module=reminder status=ok list_id={list_id}");
    }
}
