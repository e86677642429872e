use crate::error::TimesheetError;
use chrono::NaiveTime;
use chrono::Timelike;
use std::fmt::Display;
use std::str::FromStr;

/// Pattern accepted for extra-hours text
pub const TIME_FORMAT: &str = "%H:%M";

/// Hours and minutes of an extra-hours cell, ordered by hour then minute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Builds a time, `None` outside 00:00..=23:59
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Hard-coded band bounds
    pub(crate) const fn at(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Parses `HH:MM` text; anything else (including `HH:MM:SS`) is a `FormatError`.
    pub fn parse(text: &str) -> Result<Self, TimesheetError> {
        let time = NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|error| {
            TimesheetError::FormatError(format!("time data '{text}' does not match format '{TIME_FORMAT}': {error}"))
        })?;
        Ok(Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        })
    }
}

impl FromStr for TimeOfDay {
    type Err = TimesheetError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_and_minutes() {
        let time = TimeOfDay::parse("02:30").unwrap();
        assert_eq!((time.hour(), time.minute()), (2, 30));
        assert_eq!(time.to_string(), "02:30");
        assert_eq!("23:59".parse::<TimeOfDay>().unwrap(), TimeOfDay::at(23, 59));
    }

    #[test]
    fn rejects_other_patterns() {
        for text in ["02:30:00", "2h30", "24:00", "02:60", "", "abc", "02:30 "] {
            assert!(
                matches!(TimeOfDay::parse(text), Err(TimesheetError::FormatError(_))),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn orders_by_hour_then_minute() {
        let mut times: Vec<TimeOfDay> = ["04:00", "02:59", "03:00", "02:00", "00:45"]
            .iter()
            .map(|text| TimeOfDay::parse(text).unwrap())
            .collect();
        times.sort();
        let sorted: Vec<String> = times.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, vec!["00:45", "02:00", "02:59", "03:00", "04:00"]);
        assert!(TimeOfDay::at(2, 59) < TimeOfDay::at(3, 0));
    }

    #[test]
    fn new_checks_range() {
        assert_eq!(TimeOfDay::new(4, 1), Some(TimeOfDay::at(4, 1)));
        assert_eq!(TimeOfDay::new(24, 0), None);
        assert_eq!(TimeOfDay::new(1, 60), None);
    }
}
