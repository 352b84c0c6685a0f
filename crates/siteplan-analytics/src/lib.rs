//! # siteplan-analytics
//!
//! Schedule analytics over `siteplan_core` data.
//!
//! This crate provides:
//! - Schedule health aggregation with SPI (`health`)
//! - Monthly Curve-S series from a baseline and current progress (`curve_s`)
//! - Variance and SPI indicator classification (`indicators`)
//! - Concurrent loading of schedule views from a `PlanningSource` (`loader`)
//!
//! ## Example
//!
//! ```rust
//! use siteplan_analytics::indicators::{SpiBand, Variance, VarianceClass};
//!
//! let v = Variance::between(52.3, 50.0);
//! assert_eq!(v.display(), "+2.3");
//! assert_eq!(v.class, VarianceClass::Ahead);
//!
//! assert_eq!(SpiBand::from_ratio(Some(0.95)), SpiBand::Attention);
//! ```

pub mod curve_s;
pub mod health;
pub mod indicators;
pub mod loader;

pub use curve_s::{curve_s, latest_variance};
pub use health::ScheduleHealth;
pub use indicators::{SpiBand, Variance, VarianceClass};
pub use loader::{load_curve_s, load_schedule_view};

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round half away from zero to one decimal
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(round2(48.387_096), 48.39);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round1(2.299_999_999), 2.3);
        assert_eq!(round1(-0.2), -0.2);
    }
}
