//! Recurrence rules attached to templates
//!
//! A `Schedule` is plain data, it may be malformed (e.g. `interval == 0`)
//! since it comes straight from storage. Consumers call `validate` and
//! treat a malformed schedule as one that never occurs.

use std::fmt;
use std::str::FromStr;

use crate::date::{Date, Weekday};

/// Length of the base period of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for Frequency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        Ok(match s {
            "day" | "days" | "daily" => Frequency::Daily,
            "week" | "weeks" | "weekly" => Frequency::Weekly,
            "month" | "months" | "monthly" => Frequency::Monthly,
            "year" | "years" | "yearly" => Frequency::Yearly,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub enabled: bool,
    pub frequency: Frequency,
    /// every `interval`-th period, must be at least 1
    pub interval: i32,
    /// anchor of all derived fields
    pub start: Date,
    /// inclusive, `None` is open-ended
    pub end: Option<Date>,
    /// 1..=31, only read by `Monthly`
    pub day_of_month: Option<u8>,
    /// 0 (Sunday) ..= 6 (Saturday), only read by `Weekly`
    pub day_of_week: Option<u8>,
}

/// Ways in which a stored schedule can be unusable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    NonPositiveInterval(i32),
    EndBeforeStart { start: Date, end: Date },
    InvalidDayOfMonth(u8),
    InvalidDayOfWeek(u8),
}

/// Lifecycle of a template, derived from its schedule and the current date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateState {
    /// still generating occurrences
    Active,
    /// `end` is in the past, typically after a fork
    Ended,
    /// explicitly turned off
    Deactivated,
}

impl Schedule {
    /// Every `interval` periods starting on `start`, with no end and
    /// the anchors taken from `start`
    pub fn new(frequency: Frequency, interval: i32, start: Date) -> Self {
        Self {
            enabled: true,
            frequency,
            interval,
            start,
            end: None,
            day_of_month: None,
            day_of_week: None,
        }
    }

    /// Schedule for an entry flagged with the legacy "recurring" marker:
    /// same day of every month from `date` onwards
    pub fn monthly_from(date: Date) -> Self {
        Self {
            day_of_month: Some(date.day()),
            ..Self::new(Frequency::Monthly, 1, date)
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.interval < 1 {
            return Err(ScheduleError::NonPositiveInterval(self.interval));
        }
        if let Some(end) = self.end {
            if end < self.start {
                return Err(ScheduleError::EndBeforeStart { start: self.start, end });
            }
        }
        match self.frequency {
            Frequency::Monthly => match self.day_of_month {
                Some(d) if !(1..=31).contains(&d) => Err(ScheduleError::InvalidDayOfMonth(d)),
                _ => Ok(()),
            },
            Frequency::Weekly => match self.day_of_week {
                Some(d) if d > 6 => Err(ScheduleError::InvalidDayOfWeek(d)),
                _ => Ok(()),
            },
            Frequency::Daily | Frequency::Yearly => Ok(()),
        }
    }

    pub fn state(&self, today: Date) -> TemplateState {
        if !self.enabled {
            TemplateState::Deactivated
        } else if self.end.map_or(false, |end| end < today) {
            TemplateState::Ended
        } else {
            TemplateState::Active
        }
    }

    /// Enabled, and `date` is within `start ..= end`
    pub fn is_running_on(&self, date: Date) -> bool {
        self.enabled && self.start <= date && self.end.map_or(true, |end| date <= end)
    }

    /// Day of the week of weekly occurrences
    pub fn weekday(&self) -> Weekday {
        self.day_of_week
            .and_then(Weekday::from_sunday_index)
            .unwrap_or_else(|| self.start.weekday())
    }

    /// Target day of monthly occurrences, before clamping
    pub fn monthday(&self) -> u8 {
        self.day_of_month.unwrap_or_else(|| self.start.day())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {} {}", self.interval, self.frequency)?;
        if self.interval != 1 {
            write!(f, "s")?;
        }
        match self.frequency {
            Frequency::Weekly => write!(f, " on {}", self.weekday())?,
            Frequency::Monthly => write!(f, " on day {}", self.monthday())?,
            Frequency::Daily | Frequency::Yearly => (),
        }
        write!(f, " from {}", self.start)?;
        if let Some(end) = self.end {
            write!(f, " until {}", end)?;
        }
        Ok(())
    }
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ScheduleError::*;
        match self {
            NonPositiveInterval(n) => write!(f, "interval {} is not positive", n),
            EndBeforeStart { start, end } => write!(f, "ends on {} before starting on {}", end, start),
            InvalidDayOfMonth(d) => write!(f, "{} is not a day of the month", d),
            InvalidDayOfWeek(d) => write!(f, "{} is not a day of the week", d),
        }
    }
}

impl ScheduleError {
    /// What message to show to help fix the schedule
    pub fn fix_hint(&self) -> String {
        use ScheduleError::*;
        match self {
            NonPositiveInterval(_) => "use an interval of at least 1".to_string(),
            EndBeforeStart { start, .. } => format!("choose an end date on or after {}", start),
            InvalidDayOfMonth(_) => "days of the month are 1 ..= 31".to_string(),
            InvalidDayOfWeek(_) => "days of the week are 0 (Sunday) ..= 6 (Saturday)".to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::date::Month::*;

    #[test]
    fn malformed() {
        let mut s = Schedule::new(Frequency::Daily, 0, dt!(2026-Jan-1));
        assert_eq!(s.validate(), Err(ScheduleError::NonPositiveInterval(0)));
        s.interval = 1;
        assert_eq!(s.validate(), Ok(()));
        s.end = Some(dt!(2025-Dec-31));
        assert!(matches!(s.validate(), Err(ScheduleError::EndBeforeStart { .. })));
        s.end = Some(dt!(2026-Jan-1));
        assert_eq!(s.validate(), Ok(()));
    }

    #[test]
    fn irrelevant_anchors_ignored() {
        let s = Schedule {
            day_of_month: Some(40),
            day_of_week: Some(9),
            ..Schedule::new(Frequency::Daily, 1, dt!(2026-Jan-1))
        };
        assert_eq!(s.validate(), Ok(()));
        let monthly = Schedule { frequency: Frequency::Monthly, ..s.clone() };
        assert_eq!(monthly.validate(), Err(ScheduleError::InvalidDayOfMonth(40)));
        let weekly = Schedule { frequency: Frequency::Weekly, ..s };
        assert_eq!(weekly.validate(), Err(ScheduleError::InvalidDayOfWeek(9)));
    }

    #[test]
    fn derived_state() {
        let mut s = Schedule::new(Frequency::Monthly, 1, dt!(2026-Jan-15));
        assert_eq!(s.state(dt!(2030-Jan-1)), TemplateState::Active);
        s.end = Some(dt!(2026-Feb-14));
        assert_eq!(s.state(dt!(2026-Feb-14)), TemplateState::Active);
        assert_eq!(s.state(dt!(2026-Feb-15)), TemplateState::Ended);
        s.enabled = false;
        assert_eq!(s.state(dt!(2026-Jan-1)), TemplateState::Deactivated);
    }

    #[test]
    fn running_on() {
        let mut s = Schedule::new(Frequency::Monthly, 1, dt!(2026-Jan-15));
        assert!(!s.is_running_on(dt!(2026-Jan-14)));
        assert!(s.is_running_on(dt!(2026-Jan-15)));
        assert!(s.is_running_on(dt!(2040-Jan-1)));
        s.end = Some(dt!(2026-Mar-14));
        assert!(s.is_running_on(dt!(2026-Mar-14)));
        assert!(!s.is_running_on(dt!(2026-Mar-15)));
        s.enabled = false;
        assert!(!s.is_running_on(dt!(2026-Feb-1)));
    }

    #[test]
    fn legacy_conversion() {
        let s = Schedule::monthly_from(dt!(2025-Jan-31));
        assert_eq!(s.frequency, Frequency::Monthly);
        assert_eq!(s.interval, 1);
        assert_eq!(s.start, dt!(2025-Jan-31));
        assert_eq!(s.day_of_month, Some(31));
        assert_eq!(s.end, None);
        assert!(s.enabled);
    }

    #[test]
    fn default_anchors() {
        let s = Schedule::new(Frequency::Weekly, 1, dt!(2026-Jan-5));
        assert_eq!(s.weekday(), Weekday::Mon);
        assert_eq!(Schedule { day_of_week: Some(5), ..s.clone() }.weekday(), Weekday::Fri);
        assert_eq!(s.monthday(), 5);
    }
}
