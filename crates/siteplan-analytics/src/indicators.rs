//! Variance and SPI indicators.
//!
//! Pure classification of numbers the schedule pages display as badges.

use serde::{Deserialize, Serialize};
use siteplan_core::Locale;

use crate::round1;

/// Color of neutral badges
pub const NEUTRAL_COLOR: &str = "#94a3b8";
pub const GREEN: &str = "#22c55e";
pub const YELLOW: &str = "#eab308";
pub const RED: &str = "#ef4444";

// ============================================================================
// Variance
// ============================================================================

/// Direction of an actual-vs-planned difference
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceClass {
    Ahead,
    OnTime,
    Behind,
}

impl VarianceClass {
    pub fn color(&self) -> &'static str {
        match self {
            VarianceClass::Ahead => GREEN,
            VarianceClass::OnTime => NEUTRAL_COLOR,
            VarianceClass::Behind => RED,
        }
    }
}

/// Percentage-point difference between actual and planned progress
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variance {
    /// `actual - planned`, rounded to one decimal
    pub value: f64,
    pub class: VarianceClass,
}

impl Variance {
    /// Classify `actual - planned`.
    ///
    /// The difference is rounded to one decimal first; anything under half
    /// a point either way is on time.
    pub fn between(actual: f64, planned: f64) -> Self {
        let mut value = round1(actual - planned);
        if value == 0.0 {
            // drop the sign of -0.0
            value = 0.0;
        }
        let class = if value.abs() < 0.5 {
            VarianceClass::OnTime
        } else if value > 0.0 {
            VarianceClass::Ahead
        } else {
            VarianceClass::Behind
        };
        Self { value, class }
    }

    /// Signed, one decimal: `+2.3`, `-0.2`, `0.0`
    pub fn display(&self) -> String {
        if self.value > 0.0 {
            format!("+{:.1}", self.value)
        } else {
            format!("{:.1}", self.value)
        }
    }

    /// Badge text, e.g. `+2.3% adiantado` or `No prazo`
    pub fn label(&self, locale: Locale) -> String {
        let (on_time, ahead, behind) = match locale {
            Locale::PtBr => ("No prazo", "adiantado", "atrasado"),
            Locale::EnUs => ("On schedule", "ahead", "behind"),
            Locale::Es => ("A tiempo", "adelantado", "atrasado"),
        };
        match self.class {
            VarianceClass::OnTime => on_time.to_string(),
            VarianceClass::Ahead => format!("{}% {}", self.display(), ahead),
            VarianceClass::Behind => format!("{}% {}", self.display(), behind),
        }
    }
}

impl std::fmt::Display for Variance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

// ============================================================================
// SPI
// ============================================================================

/// Schedule Performance Index band
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpiBand {
    /// SPI >= 1.0
    OnSchedule,
    /// 0.9 <= SPI < 1.0
    Attention,
    /// SPI < 0.9
    Delayed,
    /// No planned value yet
    NotAvailable,
}

impl SpiBand {
    pub fn from_ratio(spi: Option<f64>) -> Self {
        match spi {
            Some(s) if s.is_nan() => SpiBand::NotAvailable,
            Some(s) if s >= 1.0 => SpiBand::OnSchedule,
            Some(s) if s >= 0.9 => SpiBand::Attention,
            Some(_) => SpiBand::Delayed,
            None => SpiBand::NotAvailable,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SpiBand::OnSchedule => GREEN,
            SpiBand::Attention => YELLOW,
            SpiBand::Delayed => RED,
            SpiBand::NotAvailable => NEUTRAL_COLOR,
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SpiBand::OnSchedule, Locale::PtBr) => "No prazo",
            (SpiBand::Attention, Locale::PtBr) => "Atenção",
            (SpiBand::Delayed, Locale::PtBr) => "Atrasado",
            (SpiBand::OnSchedule, Locale::EnUs) => "On schedule",
            (SpiBand::Attention, Locale::EnUs) => "Attention",
            (SpiBand::Delayed, Locale::EnUs) => "Delayed",
            (SpiBand::OnSchedule, Locale::Es) => "A tiempo",
            (SpiBand::Attention, Locale::Es) => "Atención",
            (SpiBand::Delayed, Locale::Es) => "Retrasado",
            (SpiBand::NotAvailable, _) => "N/A",
        }
    }
}

/// SPI formatted with two decimals, `N/A` when absent
pub fn format_spi(spi: Option<f64>) -> String {
    match spi {
        Some(s) if s.is_finite() => format!("{s:.2}"),
        _ => "N/A".to_string(),
    }
}

/// Fill of the SPI gauge in percent, capped at 100
pub fn spi_gauge_percent(spi: f64) -> f64 {
    (spi * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn variance_ahead() {
        let v = Variance::between(52.3, 50.0);
        assert_eq!(v.value, 2.3);
        assert_eq!(v.class, VarianceClass::Ahead);
        assert_eq!(v.display(), "+2.3");
        assert_eq!(v.label(Locale::PtBr), "+2.3% adiantado");
    }

    #[test]
    fn small_negative_variance_is_on_time() {
        let v = Variance::between(49.8, 50.0);
        assert_eq!(v.display(), "-0.2");
        assert_eq!(v.class, VarianceClass::OnTime);
        assert_eq!(v.label(Locale::PtBr), "No prazo");
    }

    #[test]
    fn behind_variance() {
        let v = Variance::between(40.0, 45.5);
        assert_eq!(v.display(), "-5.5");
        assert_eq!(v.class, VarianceClass::Behind);
        assert_eq!(v.label(Locale::EnUs), "-5.5% behind");
        assert_eq!(v.class.color(), RED);
    }

    #[test]
    fn zero_variance_has_no_sign() {
        assert_eq!(Variance::between(50.0, 50.0).display(), "0.0");
        assert_eq!(Variance::between(50.0, 50.04).display(), "0.0");
    }

    #[test]
    fn classification_uses_rounded_value() {
        // 0.46 displays as +0.5, which is no longer under half a point
        assert_eq!(Variance::between(50.46, 50.0).class, VarianceClass::Ahead);
        assert_eq!(Variance::between(50.44, 50.0).class, VarianceClass::OnTime);
    }

    #[test]
    fn spi_bands() {
        assert_eq!(SpiBand::from_ratio(Some(1.0)), SpiBand::OnSchedule);
        assert_eq!(SpiBand::from_ratio(Some(1.3)), SpiBand::OnSchedule);
        assert_eq!(SpiBand::from_ratio(Some(0.9)), SpiBand::Attention);
        assert_eq!(SpiBand::from_ratio(Some(0.89)), SpiBand::Delayed);
        assert_eq!(SpiBand::from_ratio(None), SpiBand::NotAvailable);
        assert_eq!(SpiBand::from_ratio(Some(f64::NAN)), SpiBand::NotAvailable);
    }

    #[test]
    fn spi_presentation() {
        assert_eq!(SpiBand::Attention.color(), "#eab308");
        assert_eq!(SpiBand::Delayed.label(Locale::PtBr), "Atrasado");
        assert_eq!(SpiBand::OnSchedule.label(Locale::Es), "A tiempo");
        assert_eq!(format_spi(Some(0.956)), "0.96");
        assert_eq!(format_spi(None), "N/A");
        assert_eq!(spi_gauge_percent(1.2), 100.0);
        assert_eq!(spi_gauge_percent(0.5), 50.0);
    }
}
