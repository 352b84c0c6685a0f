//! Bar position mapper.
//!
//! Maps a date range onto a timeline as percentages of its width. The span
//! runs from the start of its first day through the end of its last day.

use chrono::NaiveDate;

use siteplan_analytics::round2;
use siteplan_core::{parse_date, BarExtent, TimelineSpan};

/// Position of the bar for `start ..= end` on `span`.
///
/// `None` when either date is missing or the span is degenerate. Dates
/// outside the span are clamped to its edges; very short bars get the
/// minimum width, which may push `left + width` past 100.
pub fn bar_extent(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    span: TimelineSpan,
) -> Option<BarExtent> {
    let (start, end) = (start?, end?);
    if span.is_degenerate() {
        return None;
    }

    let total = span.total_days() as f64;
    let offset = |date: NaiveDate| {
        let fraction = (date - span.first_day).num_days() as f64 / total;
        fraction.clamp(0.0, 1.0) * 100.0
    };

    let left = offset(start);
    let right = offset(end);
    Some(BarExtent {
        left: round2(left),
        width: round2((right - left).max(BarExtent::MIN_WIDTH)),
    })
}

/// `bar_extent` over raw backend date strings
pub fn bar_extent_str(
    start: Option<&str>,
    end: Option<&str>,
    span: TimelineSpan,
) -> Option<BarExtent> {
    bar_extent(parse_date(start), parse_date(end), span)
}

/// Offset in percent of a single date, e.g. a milestone or the today line
pub fn marker_offset(date: Option<NaiveDate>, span: TimelineSpan) -> Option<f64> {
    bar_extent(date, date, span).map(|bar| bar.left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Bucketer;
    use pretty_assertions::assert_eq;
    use siteplan_core::{Granularity, ScheduleTask};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn january() -> TimelineSpan {
        TimelineSpan::new(date(2024, 1, 1), date(2024, 1, 31))
    }

    #[test]
    fn one_day_bar_gets_minimum_width() {
        let d = Some(date(2024, 1, 16));
        let bar = bar_extent(d, d, january()).unwrap();
        assert_eq!(bar.width, 0.5);
        assert_eq!(bar.left, 48.39);
    }

    #[test]
    fn missing_dates_have_no_bar() {
        assert_eq!(bar_extent(None, Some(date(2024, 1, 5)), january()), None);
        assert_eq!(bar_extent(Some(date(2024, 1, 5)), None, january()), None);
        assert_eq!(bar_extent(None, None, january()), None);
    }

    #[test]
    fn inverted_span_has_no_bar() {
        let d = Some(date(2024, 1, 5));
        let inverted = TimelineSpan::new(date(2024, 1, 31), date(2024, 1, 1));
        assert_eq!(bar_extent(d, d, inverted), None);
        assert_eq!(marker_offset(d, inverted), None);
    }

    #[test]
    fn one_day_timeline_keeps_its_bars() {
        let day = date(2024, 5, 15);
        let task = ScheduleTask::new(1).planned(day, day);
        let timeline = Bucketer::new(Granularity::Day)
            .padding(0, 0)
            .build(&[task], day);
        assert_eq!(timeline.len(), 1);

        let span = timeline.span();
        assert_eq!(span, TimelineSpan::new(day, day));

        let bar = bar_extent(Some(day), Some(day), span).unwrap();
        assert_eq!(bar.left, 0.0);
        assert_eq!(bar.width, 0.5);
        assert_eq!(marker_offset(Some(day), span), Some(0.0));
    }

    #[test]
    fn dates_outside_span_are_clamped() {
        let bar = bar_extent(Some(date(2023, 12, 1)), Some(date(2024, 3, 1)), january()).unwrap();
        assert_eq!(bar.left, 0.0);
        assert_eq!(bar.width, 100.0);

        let late = bar_extent(Some(date(2024, 5, 1)), Some(date(2024, 6, 1)), january()).unwrap();
        assert_eq!(late.left, 100.0);
        assert_eq!(late.width, 0.5);
        assert!(late.right() > 100.0);
    }

    #[test]
    fn regular_bar() {
        // 31-day span; day 10 to day 20
        let bar = bar_extent(Some(date(2024, 1, 11)), Some(date(2024, 1, 21)), january()).unwrap();
        assert_eq!(bar.left, 32.26);
        assert_eq!(bar.width, 32.26);
    }

    #[test]
    fn end_before_start_gets_minimum_width() {
        let bar = bar_extent(Some(date(2024, 1, 20)), Some(date(2024, 1, 10)), january()).unwrap();
        assert_eq!(bar.width, 0.5);
    }

    #[test]
    fn parses_backend_strings() {
        let bar = bar_extent_str(
            Some("2024-01-16T00:00:00.000Z"),
            Some("2024-01-16"),
            january(),
        )
        .unwrap();
        assert_eq!(bar.left, 48.39);
        assert_eq!(bar_extent_str(Some("not a date"), Some("2024-01-16"), january()), None);
        assert_eq!(bar_extent_str(Some(""), Some("2024-01-16"), january()), None);
    }

    #[test]
    fn marker_offset_matches_bar_left() {
        assert_eq!(marker_offset(Some(date(2024, 1, 1)), january()), Some(0.0));
        assert_eq!(marker_offset(None, january()), None);
    }
}
