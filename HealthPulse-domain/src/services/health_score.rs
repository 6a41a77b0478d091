use crate::entities::blood_pressure::{BloodPressureCategory, BloodPressureReading};
use crate::entities::health_score::{HealthScore, SampleCounts, ScoreComponents};
use crate::entities::medication::{MedicationEvent, MedicationEventStatus};
use crate::entities::mood::MoodEntry;
use crate::services::insights::get_blood_pressure_status;

/// Aggregate readings, moods and medication events into a 0-100 score
///
/// Each dimension scores 0 when it has no records; `samples` tells callers
/// which zeros are real.
pub fn calculate_health_score(
    readings: &[BloodPressureReading],
    moods: &[MoodEntry],
    events: &[MedicationEvent],
) -> HealthScore {
    let blood_pressure = blood_pressure_score(readings);
    let mood = mood_score(moods);
    let medication = medication_score(events);

    let overall = round_score((f64::from(blood_pressure) + f64::from(mood) + f64::from(medication)) / 3.0);

    HealthScore {
        overall,
        components: ScoreComponents {
            blood_pressure,
            mood,
            medication,
        },
        samples: SampleCounts {
            readings: readings.len(),
            mood_entries: moods.len(),
            medication_events: events.len(),
        },
    }
}

/// Share of readings classified Normal
pub fn blood_pressure_score(readings: &[BloodPressureReading]) -> u8 {
    let normal = readings
        .iter()
        .filter(|r| get_blood_pressure_status(r.systolic, r.diastolic) == BloodPressureCategory::Normal)
        .count();
    percentage(normal, readings.len())
}

/// Mean of mapped mood values; unknown labels count as 0
pub fn mood_score(moods: &[MoodEntry]) -> u8 {
    if moods.is_empty() {
        return 0;
    }
    let total: f64 = moods
        .iter()
        .map(|entry| entry.mood().map(|m| f64::from(m.score())).unwrap_or(0.0))
        .sum();
    round_score(total / moods.len() as f64)
}

/// Share of medication events marked taken
pub fn medication_score(events: &[MedicationEvent]) -> u8 {
    let taken = events
        .iter()
        .filter(|e| e.status == MedicationEventStatus::Taken)
        .count();
    percentage(taken, events.len())
}

fn percentage(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    round_score(100.0 * part as f64 / total as f64)
}

/// Round half away from zero and clamp into 0..=100
fn round_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
