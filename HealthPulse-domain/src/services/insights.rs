//! Blood pressure classification and history-based insights
//!
//! Everything here is a pure function of its inputs: no storage, no clock.

use thiserror::Error;
use tracing::warn;

use crate::entities::blood_pressure::{BloodPressureCategory, BloodPressureReading, Severity};
use crate::entities::insight::{BloodPressureAnalysis, Insight, InsightKind, Metric};

/// Mean successive change (mmHg) above which a trend is reported
const TREND_THRESHOLD: f64 = 10.0;

/// Reading-to-reading jumps above these are flagged
const SYSTOLIC_CHANGE_THRESHOLD: i32 = 20;
const DIASTOLIC_CHANGE_THRESHOLD: i32 = 10;

/// Number of readings a trend is computed over
const TREND_WINDOW: usize = 3;

/// Classifier input errors
#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    /// Vital is not a positive whole number
    #[error("Invalid {field} value: {value}")]
    InvalidVitals { field: &'static str, value: f64 },
}

/// Categorize blood pressure based on measurements
///
/// Rules are checked from most to least severe; the first match wins.
pub fn get_blood_pressure_status(systolic: u16, diastolic: u16) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 120 {
        BloodPressureCategory::HypertensiveCrisis
    } else if systolic >= 140 || diastolic >= 90 {
        BloodPressureCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BloodPressureCategory::Hypertension1
    } else if systolic >= 120 && diastolic < 80 {
        BloodPressureCategory::Elevated
    } else {
        BloodPressureCategory::Normal
    }
}

/// Map a status label to its severity
///
/// Labels outside the five known categories map to `Normal`.
pub fn get_severity_level(status: &str) -> Severity {
    match BloodPressureCategory::from_label(status) {
        Some(category) => category.severity(),
        None => {
            warn!(status, "Unknown blood pressure status, defaulting severity to normal");
            Severity::Normal
        }
    }
}

/// Check raw vitals before classification
///
/// Rejects NaN, infinities, zero, negatives, fractions, and values too large
/// for a reading.
pub fn validate_vitals(systolic: f64, diastolic: f64) -> Result<(u16, u16), ClassifierError> {
    Ok((to_vital("systolic", systolic)?, to_vital("diastolic", diastolic)?))
}

fn to_vital(field: &'static str, value: f64) -> Result<u16, ClassifierError> {
    if !value.is_finite() || value <= 0.0 || value.fract() != 0.0 || value > f64::from(u16::MAX) {
        return Err(ClassifierError::InvalidVitals { field, value });
    }
    Ok(value as u16)
}

/// Validate and classify raw vitals
pub fn classify_vitals(systolic: f64, diastolic: f64) -> Result<BloodPressureCategory, ClassifierError> {
    let (systolic, diastolic) = validate_vitals(systolic, diastolic)?;
    Ok(get_blood_pressure_status(systolic, diastolic))
}

/// Detect a trend over the three most recent readings (newest first)
///
/// Returns `None` with fewer than three readings or when neither metric
/// moves more than 10 mmHg per reading on average.
pub fn analyze_trend(readings: &[BloodPressureReading]) -> Option<Insight> {
    if readings.len() < TREND_WINDOW {
        return None;
    }
    let window = &readings[..TREND_WINDOW];

    let systolic = mean_successive_delta(window.iter().map(|r| r.systolic));
    let diastolic = mean_successive_delta(window.iter().map(|r| r.diastolic));

    let rising: Vec<Metric> = [(Metric::Systolic, systolic), (Metric::Diastolic, diastolic)]
        .into_iter()
        .filter(|(_, delta)| *delta > TREND_THRESHOLD)
        .map(|(metric, _)| metric)
        .collect();
    if !rising.is_empty() {
        return Some(Insight {
            kind: InsightKind::TrendingUp,
            message: "Your blood pressure is trending upward significantly".to_string(),
            severity: Severity::High,
            metrics: rising,
        });
    }

    let falling: Vec<Metric> = [(Metric::Systolic, systolic), (Metric::Diastolic, diastolic)]
        .into_iter()
        .filter(|(_, delta)| *delta < -TREND_THRESHOLD)
        .map(|(metric, _)| metric)
        .collect();
    if !falling.is_empty() {
        return Some(Insight {
            kind: InsightKind::TrendingDown,
            message: "Your blood pressure is trending downward significantly".to_string(),
            severity: Severity::Moderate,
            metrics: falling,
        });
    }

    None
}

/// Mean of chronological deltas for values given newest first
fn mean_successive_delta(newest_first: impl DoubleEndedIterator<Item = u16>) -> f64 {
    let chronological: Vec<f64> = newest_first.rev().map(f64::from).collect();
    if chronological.len() < 2 {
        return 0.0;
    }
    let total: f64 = chronological.windows(2).map(|pair| pair[1] - pair[0]).sum();
    total / (chronological.len() - 1) as f64
}

/// Flag a large jump between two consecutive readings
pub fn check_significant_change(
    latest: &BloodPressureReading,
    previous: &BloodPressureReading,
) -> Option<Insight> {
    let systolic_delta = i32::from(latest.systolic) - i32::from(previous.systolic);
    let diastolic_delta = i32::from(latest.diastolic) - i32::from(previous.diastolic);

    let mut metrics = Vec::new();
    let mut details = Vec::new();
    if systolic_delta.abs() > SYSTOLIC_CHANGE_THRESHOLD {
        metrics.push(Metric::Systolic);
        details.push(format!("Systolic {:+} mmHg", systolic_delta));
    }
    if diastolic_delta.abs() > DIASTOLIC_CHANGE_THRESHOLD {
        metrics.push(Metric::Diastolic);
        details.push(format!("Diastolic {:+} mmHg", diastolic_delta));
    }

    if metrics.is_empty() {
        return None;
    }

    Some(Insight {
        kind: InsightKind::SignificantChange,
        message: format!("Significant change since your previous reading: {}", details.join(", ")),
        severity: Severity::High,
        metrics,
    })
}

/// Classify the newest reading and collect insights from the history
///
/// `readings` must be ordered newest first. Returns `None` for an empty slice.
pub fn analyze_readings(readings: &[BloodPressureReading]) -> Option<BloodPressureAnalysis> {
    let latest = readings.first()?;
    let status = get_blood_pressure_status(latest.systolic, latest.diastolic);

    let mut insights = Vec::new();
    if let Some(previous) = readings.get(1) {
        insights.extend(check_significant_change(latest, previous));
    }
    insights.extend(analyze_trend(readings));

    Some(BloodPressureAnalysis {
        status,
        severity: status.severity(),
        recommendation: status.recommendation().to_string(),
        insights,
    })
}
