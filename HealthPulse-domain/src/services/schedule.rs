//! Next-dose computation and schedule formatting helpers

use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;
use tracing::warn;

use crate::entities::medication::{Frequency, Medication};

/// Weekly reminders always fire at this hour
pub const WEEKLY_DOSE_HOUR: u32 = 9;

/// Reasons a medication's schedule cannot be computed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid time of day: {0:?}")]
    InvalidTime(String),

    #[error("Twice-daily schedule needs two times, got {0:?}")]
    InvalidTwiceDaily(String),

    #[error("Invalid weekday list: {0:?}")]
    InvalidWeekdays(String),

    #[error("Unknown frequency")]
    UnknownFrequency,
}

/// Compute the next dose time after `reference`
///
/// When the schedule cannot be computed (unknown frequency, malformed time
/// field) the reference time is returned unchanged and a warning is logged,
/// so the reminder becomes due immediately rather than silently vanishing.
pub fn calculate_next_dose(medication: &Medication, reference: NaiveDateTime) -> NaiveDateTime {
    match try_next_dose(medication, reference) {
        Ok(next) => next,
        Err(e) => {
            warn!(
                medication = %medication.name,
                frequency = %medication.frequency,
                time = %medication.time,
                "Cannot schedule medication ({}), keeping reference time", e
            );
            reference
        }
    }
}

/// The dose that follows one just taken at `reference`
///
/// Same as [`calculate_next_dose`] except that a twice-daily slot which is
/// not after `reference` advances to the following slot.
pub fn next_dose_after(medication: &Medication, reference: NaiveDateTime) -> NaiveDateTime {
    if medication.frequency == Frequency::TwiceDaily {
        if let Ok((morning, evening)) = parse_twice_daily(&medication.time) {
            return following_twice_daily_slot(morning, evening, reference);
        }
    }
    calculate_next_dose(medication, reference)
}

/// Compute the next dose time, reporting why a schedule is unusable
pub fn try_next_dose(medication: &Medication, reference: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
    match medication.frequency {
        Frequency::Daily => {
            let time = parse_time_of_day(&medication.time)?;
            Ok(next_daily(time, reference))
        }
        Frequency::TwiceDaily => {
            let (morning, evening) = parse_twice_daily(&medication.time)?;
            Ok(next_twice_daily(morning, evening, reference))
        }
        Frequency::Weekly => {
            let days = parse_weekdays(&medication.time)?;
            Ok(next_weekly(&days, reference))
        }
        Frequency::Unknown => Err(ScheduleError::UnknownFrequency),
    }
}

/// Today at `time`, or tomorrow if that is not after `reference`
fn next_daily(time: NaiveTime, reference: NaiveDateTime) -> NaiveDateTime {
    let today = reference.date().and_time(time);
    if today > reference {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Morning slot before noon, evening slot from noon, both on the reference date
fn next_twice_daily(morning: NaiveTime, evening: NaiveTime, reference: NaiveDateTime) -> NaiveDateTime {
    let date = reference.date();
    if reference.hour() < 12 {
        date.and_time(morning)
    } else {
        date.and_time(evening)
    }
}

/// First slot strictly after `reference`, searching from the slot
/// [`next_twice_daily`] would pick
fn following_twice_daily_slot(morning: NaiveTime, evening: NaiveTime, reference: NaiveDateTime) -> NaiveDateTime {
    let date = reference.date();
    let tomorrow = date + Duration::days(1);
    let slots = [
        date.and_time(morning),
        date.and_time(evening),
        tomorrow.and_time(morning),
        tomorrow.and_time(evening),
    ];
    let first = if reference.hour() < 12 { 0 } else { 1 };

    slots[first..]
        .iter()
        .copied()
        .find(|slot| *slot > reference)
        .unwrap_or(slots[3])
}

/// Smallest listed weekday strictly after today, else the first listed
/// entry next week, at 09:00
fn next_weekly(days: &[u32], reference: NaiveDateTime) -> NaiveDateTime {
    let today = reference.weekday().num_days_from_sunday();
    let target = days
        .iter()
        .copied()
        .filter(|day| *day > today)
        .min()
        .unwrap_or(days[0]);

    let mut offset = (target + 7 - today) % 7;
    if offset == 0 {
        offset = 7;
    }

    let dose_time = NaiveTime::from_hms_opt(WEEKLY_DOSE_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    (reference.date() + Duration::days(i64::from(offset))).and_time(dose_time)
}

/// Parse `HH:MM` (24-hour)
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

/// Parse `HH:MM,HH:MM` into (morning, evening)
pub fn parse_twice_daily(raw: &str) -> Result<(NaiveTime, NaiveTime), ScheduleError> {
    let parts: Vec<&str> = raw.split(',').collect();
    match parts.as_slice() {
        [morning, evening] => Ok((parse_time_of_day(morning)?, parse_time_of_day(evening)?)),
        _ => Err(ScheduleError::InvalidTwiceDaily(raw.to_string())),
    }
}

/// Parse a comma-separated weekday list (0 = Sunday .. 6 = Saturday),
/// keeping list order and dropping repeats
pub fn parse_weekdays(raw: &str) -> Result<Vec<u32>, ScheduleError> {
    let mut days = Vec::new();
    for part in raw.split(',') {
        let day: u32 = part
            .trim()
            .parse()
            .map_err(|_| ScheduleError::InvalidWeekdays(raw.to_string()))?;
        if day > 6 {
            return Err(ScheduleError::InvalidWeekdays(raw.to_string()));
        }
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(ScheduleError::InvalidWeekdays(raw.to_string()));
    }
    Ok(days)
}

fn weekday_name(day: u32) -> &'static str {
    match day {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        _ => "Sat",
    }
}

/// Short human form of a dose time, e.g. `Wed 09:00`
pub fn format_dose_time(time: NaiveDateTime) -> String {
    let day = weekday_name(time.weekday().num_days_from_sunday());
    format!("{} {:02}:{:02}", day, time.hour(), time.minute())
}

/// Human description of a medication's schedule
pub fn describe_schedule(medication: &Medication) -> String {
    match medication.frequency {
        Frequency::Daily => format!("Daily at {}", medication.time.trim()),
        Frequency::TwiceDaily => match parse_twice_daily(&medication.time) {
            Ok((morning, evening)) => format!(
                "Twice daily at {} and {}",
                morning.format("%H:%M"),
                evening.format("%H:%M")
            ),
            Err(_) => format!("Twice daily ({})", medication.time),
        },
        Frequency::Weekly => match parse_weekdays(&medication.time) {
            Ok(mut days) => {
                days.sort_unstable();
                let names: Vec<&str> = days.iter().map(|d| weekday_name(*d)).collect();
                format!("Weekly on {} at {:02}:00", names.join(", "), WEEKLY_DOSE_HOUR)
            }
            Err(_) => format!("Weekly ({})", medication.time),
        },
        Frequency::Unknown => format!("Custom schedule ({})", medication.time),
    }
}
