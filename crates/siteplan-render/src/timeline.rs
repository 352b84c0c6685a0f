//! Timeline bucketer.
//!
//! Turns the dates found on a set of tasks into the ordered columns of a
//! Gantt header. The covered range is padded a few days on each side so bars
//! never touch the edges; a task list without any date falls back to a
//! fixed window starting today.

use chrono::NaiveDate;
use tracing::debug;

use siteplan_core::dates::{
    add_days, first_of_month, first_of_next_month, format_by_granularity, monday_on_or_before,
};
use siteplan_core::{Granularity, Locale, ScheduleTask, TimeBucket, Timeline};

/// Days added before the earliest task date
pub const LEAD_PADDING_DAYS: i64 = 3;

/// Days added after the latest task date
pub const TAIL_PADDING_DAYS: i64 = 7;

/// Length of the window used when no task has a date
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Timeline bucketer configuration
#[derive(Clone, Debug)]
pub struct Bucketer {
    pub granularity: Granularity,
    pub locale: Locale,
    pub lead_padding: i64,
    pub tail_padding: i64,
    pub default_window: i64,
}

impl Default for Bucketer {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            locale: Locale::default(),
            lead_padding: LEAD_PADDING_DAYS,
            tail_padding: TAIL_PADDING_DAYS,
            default_window: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl Bucketer {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            ..Self::default()
        }
    }

    /// Set the locale used for bucket labels
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Override the padding around the task dates
    pub fn padding(mut self, lead: i64, tail: i64) -> Self {
        self.lead_padding = lead.max(0);
        self.tail_padding = tail.max(0);
        self
    }

    /// Build the timeline for `tasks`.
    ///
    /// Every non-null planned and actual date takes part. With no dates at
    /// all the window is `today ..= today + 29`, unpadded.
    pub fn build(&self, tasks: &[ScheduleTask], today: NaiveDate) -> Timeline {
        let mut dates = tasks.iter().flat_map(ScheduleTask::known_dates);
        let range = dates.next().map(|first| {
            dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)))
        });

        let (first_day, last_day) = match range {
            Some((min, max)) => (
                add_days(min, -self.lead_padding),
                add_days(max, self.tail_padding),
            ),
            None => (today, add_days(today, self.default_window.max(1) - 1)),
        };

        let timeline = self.bucketize(first_day, last_day);
        debug!(
            granularity = %self.granularity,
            from = %first_day,
            to = %last_day,
            buckets = timeline.len(),
            "built timeline"
        );
        timeline
    }

    /// Cover `first_day ..= last_day` with contiguous buckets
    pub fn bucketize(&self, first_day: NaiveDate, last_day: NaiveDate) -> Timeline {
        let start = match self.granularity {
            Granularity::Day => first_day,
            Granularity::Week => monday_on_or_before(first_day),
            Granularity::Month => first_of_month(first_day),
        };

        let mut timeline = Timeline::single(
            self.granularity,
            TimeBucket {
                label: self.label(start),
                start,
                end: self.bucket_end(start).unwrap_or(start),
            },
        );

        while timeline.end() <= last_day {
            let next = timeline.end();
            let Some(end) = self.bucket_end(next) else {
                break;
            };
            if !timeline.push_next(self.label(next), end) {
                break;
            }
        }
        timeline
    }

    fn bucket_end(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self.granularity {
            Granularity::Day => start.succ_opt(),
            Granularity::Week => start.checked_add_days(chrono::Days::new(7)),
            Granularity::Month => first_of_next_month(start),
        }
    }

    fn label(&self, start: NaiveDate) -> String {
        format_by_granularity(start, self.granularity, self.locale)
    }
}

/// Build a timeline with the default locale and padding
pub fn build_timeline(
    tasks: &[ScheduleTask],
    granularity: Granularity,
    today: NaiveDate,
) -> Timeline {
    Bucketer::new(granularity).build(tasks, today)
}
