//! Curve-S: cumulative planned vs. actual progress by month.
//!
//! The planned curve comes from a baseline snapshot, each item's value
//! spread linearly over its planned window. The actual curve comes from the
//! project's current progress: an item finished by the end of a period
//! contributes its actual cost (or quantity done); an item still running
//! contributes its planned value scaled by percent complete.
//!
//! Values are money when the baseline has planned costs, otherwise
//! quantities (an item without a quantity counts as one unit).
//!
//! Each month is independent of the others, so points are computed in
//! parallel.

use chrono::NaiveDate;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use siteplan_core::baseline::{ActualProgress, BaselineItem, BaselineSnapshot};
use siteplan_core::dates::{first_of_month, first_of_next_month, last_of_month};
use siteplan_core::{CurveSPoint, TaskId};

use crate::indicators::Variance;
use crate::round2;

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// One baseline item with both planned dates
struct PlannedItem<'a> {
    item: &'a BaselineItem,
    start: NaiveDate,
    end: NaiveDate,
}

/// Whether the curve is measured in money or quantities
#[derive(Clone, Copy, Debug, PartialEq)]
enum Basis {
    Cost(f64),
    Quantity(f64),
}

impl Basis {
    fn total(&self) -> f64 {
        match self {
            Basis::Cost(total) | Basis::Quantity(total) => *total,
        }
    }

    fn planned_value(&self, item: &BaselineItem) -> f64 {
        match self {
            Basis::Cost(_) => item.planned_cost.map(to_f64).unwrap_or(0.0),
            Basis::Quantity(_) => quantity_of(item),
        }
    }

    fn finished_value(&self, actual: &ActualProgress) -> f64 {
        match self {
            Basis::Cost(_) => to_f64(actual.actual_cost),
            Basis::Quantity(_) => to_f64(actual.quantity_done),
        }
    }
}

fn quantity_of(item: &BaselineItem) -> f64 {
    item.quantity
        .filter(|q| !q.is_zero())
        .map(to_f64)
        .unwrap_or(1.0)
}

fn percent_of(value: f64, base: f64) -> f64 {
    if base > 0.0 {
        round2(value / base * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Build the monthly Curve-S of `baseline` against `actuals`.
///
/// Only baseline items with both planned dates take part. Periods run from
/// the month of the earliest planned start through the month of the latest
/// planned end. Returns an empty series when no item is planned.
pub fn curve_s(baseline: &BaselineSnapshot, actuals: &[ActualProgress]) -> Vec<CurveSPoint> {
    let items: Vec<PlannedItem<'_>> = baseline
        .items
        .iter()
        .filter_map(|item| {
            let (start, end) = item.window()?;
            Some(PlannedItem { item, start, end })
        })
        .collect();

    let (Some(min_start), Some(max_end)) = (
        items.iter().map(|p| p.start).min(),
        items.iter().map(|p| p.end).max(),
    ) else {
        return Vec::new();
    };

    let total_cost: f64 = items
        .iter()
        .map(|p| p.item.planned_cost.map(to_f64).unwrap_or(0.0))
        .sum();
    let basis = if total_cost > 0.0 {
        Basis::Cost(total_cost)
    } else {
        Basis::Quantity(items.iter().map(|p| quantity_of(p.item)).sum())
    };

    let actual_by_id: HashMap<TaskId, &ActualProgress> =
        actuals.iter().map(|a| (a.id, a)).collect();

    let mut months = Vec::new();
    let mut cursor = first_of_month(min_start);
    while cursor <= max_end {
        months.push(cursor);
        match first_of_next_month(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    debug!(
        baseline = baseline.id,
        items = items.len(),
        periods = months.len(),
        "building curve-s"
    );

    months
        .par_iter()
        .map(|month| point(*month, &items, &actual_by_id, basis))
        .collect()
}

fn point(
    month: NaiveDate,
    items: &[PlannedItem<'_>],
    actual_by_id: &HashMap<TaskId, &ActualProgress>,
    basis: Basis,
) -> CurveSPoint {
    let period_end = last_of_month(month);
    let mut planned = 0.0;
    let mut actual = 0.0;

    for p in items {
        let value = basis.planned_value(p.item);

        if p.end <= period_end {
            planned += value;
        } else if p.start <= period_end {
            let duration = ((p.end - p.start).num_days() as f64).max(1.0);
            let elapsed = ((period_end - p.start).num_days() as f64).max(0.0);
            planned += value * (elapsed / duration).min(1.0);
        }

        let Some(progress) = actual_by_id.get(&p.item.id) else {
            continue;
        };
        if progress.actual_end.is_some_and(|end| end <= period_end) {
            actual += basis.finished_value(progress);
        } else if progress.percent_complete > 0 && p.start <= period_end {
            actual += value * f64::from(progress.percent_complete) / 100.0;
        }
    }

    CurveSPoint {
        period: month.format("%Y-%m").to_string(),
        planned_cumulative: round2(planned),
        actual_cumulative: round2(actual),
        planned_percent: percent_of(planned, basis.total()),
        actual_percent: percent_of(actual, basis.total()),
    }
}

/// Variance at the last point with any actual progress
pub fn latest_variance(points: &[CurveSPoint]) -> Option<(&CurveSPoint, Variance)> {
    points
        .iter()
        .rev()
        .find(|p| p.actual_percent > 0.0)
        .map(|p| (p, Variance::between(p.actual_percent, p.planned_percent)))
}
