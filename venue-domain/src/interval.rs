use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A reservation's occupied window as minutes since local midnight.
///
/// All conflict checks across every resource kind go through this one type;
/// no other module parses or formats the 12-hour time labels directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_minutes: u32,
    pub duration_minutes: u32,
}

impl TimeSlot {
    /// Build a slot from a `"H:MM AM/PM"` label and a whole-hour duration.
    ///
    /// A slot whose end would pass midnight is rejected: bookings are
    /// single-day and the overlap math does not account for day rollover.
    /// The duration is bounded to a day up front so the minute arithmetic
    /// below cannot overflow on a hostile value.
    pub fn from_label(label: &str, duration_hours: u32) -> Result<Self, DomainError> {
        if duration_hours == 0 {
            return Err(DomainError::validation("duration must be at least one hour"));
        }
        if duration_hours > 24 {
            return Err(DomainError::validation(
                "duration may not exceed 24 hours",
            ));
        }
        let start_minutes = parse_time_label(label)?;
        let duration_minutes = duration_hours * 60;
        if start_minutes + duration_minutes > MINUTES_PER_DAY {
            return Err(DomainError::validation(
                "reservation may not cross midnight",
            ));
        }
        Ok(Self {
            start_minutes,
            duration_minutes,
        })
    }

    pub fn end_minutes(&self) -> u32 {
        self.start_minutes + self.duration_minutes
    }

    /// Half-open interval overlap: touching endpoints do not conflict.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start_minutes < other.end_minutes() && other.start_minutes < self.end_minutes()
    }

    pub fn end_label(&self) -> String {
        format_time_label(self.end_minutes() % MINUTES_PER_DAY)
    }
}

/// Parse a 12-hour labelled time (`"H:MM AM/PM"`) into minutes since
/// midnight. Hour 12 AM maps to 0, hour 12 PM stays 12, otherwise PM adds 12.
pub fn parse_time_label(label: &str) -> Result<u32, DomainError> {
    let invalid = || DomainError::validation(format!("invalid time label: {label:?}"));

    let mut parts = label.trim().splitn(2, ' ');
    let clock = parts.next().ok_or_else(invalid)?;
    let meridiem = parts.next().ok_or_else(invalid)?.trim();

    let (hour_str, minute_str) = clock.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour_str.parse().map_err(|_| invalid())?;
    let minute: u32 = minute_str.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hour) || minute > 59 || minute_str.len() != 2 {
        return Err(invalid());
    }

    let hour24 = if meridiem.eq_ignore_ascii_case("AM") {
        if hour == 12 {
            0
        } else {
            hour
        }
    } else if meridiem.eq_ignore_ascii_case("PM") {
        if hour == 12 {
            12
        } else {
            hour + 12
        }
    } else {
        return Err(invalid());
    };

    Ok(hour24 * 60 + minute)
}

/// Inverse of [`parse_time_label`], used for end-time display.
pub fn format_time_label(minutes: u32) -> String {
    let hour24 = (minutes / 60) % 24;
    let minute = minutes % 60;
    let (hour12, meridiem) = match hour24 {
        0 => (12, "AM"),
        1..=11 => (hour24, "AM"),
        12 => (12, "PM"),
        _ => (hour24 - 12, "PM"),
    };
    format!("{hour12}:{minute:02} {meridiem}")
}

/// Calendar dates travel as plain `YYYY-MM-DD` strings so that no time-zone
/// offset can shift them between client and server; this validates the
/// format and yields the date for weekday/block-window checks.
pub fn parse_booking_date(date: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("invalid booking date: {date:?}")))
}
