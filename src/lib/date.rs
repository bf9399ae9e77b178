//! Day-precise time management, with a focus on edge cases
//!
//! Dates are `YYYY-MM-DD`, not number of seconds, and provide an interface
//! for dealing with durations that are expressed in number of days, weeks, months
//! or years.
//!
//! All arithmetic is checked: any operation that would leave the supported
//! range of years returns `None` instead of wrapping.
//!
//! The textual form is ISO 8601 and nothing else, so that comparing two
//! formatted dates as strings gives the same answer as comparing the dates.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use pest::Parser;
use pest_derive::Parser;
use std::fmt;
use std::str::FromStr;

/// A date with day-precision
///
/// Supports years in the range 1000..=9999.
///
/// All methods execute in constant time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month.number(), self.day)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// Month from its calendar number (`1` is January)
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(Self::from_usize)
    }

    /// Calendar number of the month (`1` is January)
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Month directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::from_u8((self as u8 + 1) % 12).unwrap_or(Month::Jan)
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => if is_leap(year) { 29 } else { 28 },
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Weekday with Monday-first week convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum Weekday {
    Mon = 0,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Weekday directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::from_u8((self as u8 + 1) % 7).unwrap_or(Weekday::Mon)
    }

    /// Convert from the `0 = Sunday ..= 6 = Saturday` numbering
    /// used by stored schedules
    pub fn from_sunday_index(n: u8) -> Option<Self> {
        if n > 6 {
            None
        } else {
            Self::from_u8((n + 6) % 7)
        }
    }

    /// Inverse of `from_sunday_index`
    pub fn sunday_index(self) -> u8 {
        (self as u8 + 1) % 7
    }

    /// Days elapsed since the Monday of the same week
    pub fn offset(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateError {
    /// year is outside of 1000..=9999
    UnsupportedYear(usize),
    /// month outside of 1..=12
    InvalidMonth(usize),
    /// Feb 29 of a non-leap year
    NotBissextile(usize),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    MonthTooShort(Month, usize),
    /// day outside of 1..=31
    InvalidDay(usize),
    /// not of the form `YYYY-MM-DD`
    Malformed(String),
}

#[derive(Parser)]
#[grammar = "lib/grammar-date.pest"]
struct DateParser;

impl Date {
    pub const MIN: Date = Date { year: 1000, month: Month::Jan, day: 1 };
    pub const MAX: Date = Date { year: 9999, month: Month::Dec, day: 31 };

    /// Validate year-month-day into date
    pub fn from(year: usize, month: Month, day: usize) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year as u16) as usize {
            Ok(Self { year: year as u16, month, day: day as u8 })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// `self.day` accessor
    pub fn day(&self) -> u8 {
        self.day
    }

    /// `self.month` accessor
    pub fn month(&self) -> Month {
        self.month
    }

    /// `self.year` accessor
    pub fn year(&self) -> u16 {
        self.year
    }

    /// Biject the dates with integers
    ///
    /// This indexing is guaranteed consistent in the sense that
    /// for any date `d` except `Date::MAX`,
    ///
    ///     # use cadence::date::{Date, Month};
    ///     # let d = Date::from(2020, Month::Feb, 28).unwrap();
    ///     assert_eq!(d.index() + 1, d.next().unwrap().index());
    pub fn index(self) -> i64 {
        let year = self.year as i64;
        // each leap year strictly before the current date adds one day
        let leaps = if self.month <= Month::Feb {
            leaps_upto(year - 1)
        } else {
            leaps_upto(year)
        };
        year * 365 + CUMULATIVE_DAYS[self.month as usize] + self.day as i64 + leaps
    }

    /// Inverse of `index`
    pub fn from_index(n: i64) -> Option<Self> {
        if n < Self::MIN.index() || n > Self::MAX.index() {
            return None;
        }
        // underestimates the year by a handful at most
        let mut year = n / 366;
        while first_of_year(year + 1) <= n {
            year += 1;
        }
        let mut offset = n - first_of_year(year);
        let mut month = Month::Jan;
        loop {
            let len = month.count(year as u16) as i64;
            if offset < len {
                break;
            }
            offset -= len;
            month = month.next();
        }
        Some(Self { year: year as u16, month, day: offset as u8 + 1 })
    }

    /// Number of days from `self` to `other` (negative if `other` comes first)
    pub fn days_until(self, other: Self) -> i64 {
        other.index() - self.index()
    }

    /// Get day of week
    pub fn weekday(self) -> Weekday {
        let offset = 2; // essentially the weekday of 0000-Jan-01
        Weekday::from_i64((self.index() - offset).rem_euclid(7)).unwrap_or(Weekday::Mon)
    }

    pub fn next(self) -> Option<Self> {
        if self.month.count(self.year) == self.day {
            if self.month == Month::Dec {
                (self.year < 9999).then(|| Self { year: self.year + 1, month: Month::Jan, day: 1 })
            } else {
                Some(Self { month: self.month.next(), day: 1, ..self })
            }
        } else {
            Some(Self { day: self.day + 1, ..self })
        }
    }

    pub fn prev(self) -> Option<Self> {
        self.jump_day(-1)
    }

    /// `count` days before/after current date
    pub fn jump_day(self, count: i64) -> Option<Self> {
        Self::from_index(self.index().checked_add(count)?)
    }

    /// `count` months before/after current date
    ///
    /// Day will be truncated to fit in the new month:
    /// adding one month to `2000-01-31` makes it `2000-02-29`
    pub fn jump_month(self, count: i64) -> Option<Self> {
        Self::from_month_ordinal(self.month_ordinal().checked_add(count)?, self.day)
    }

    /// `count` years before/after current date
    ///
    /// Day will be truncated in the rare case it is needed:
    /// adding one year to `2000-02-29` makes it `2001-02-28`
    pub fn jump_year(self, count: i64) -> Option<Self> {
        let year = (self.year as i64).checked_add(count)?;
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let year = year as u16;
        Some(Self { year, day: self.day.min(self.month.count(year)), ..self })
    }

    /// Months elapsed since year 0, used to count months across years
    pub fn month_ordinal(self) -> i64 {
        self.year as i64 * 12 + self.month as i64
    }

    /// Date in the month `ordinal` (see `month_ordinal`) with the given day,
    /// clamped to the last day of that month
    pub fn from_month_ordinal(ordinal: i64, day: u8) -> Option<Self> {
        let year = ordinal.div_euclid(12);
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let month = Month::from_i64(ordinal.rem_euclid(12))?;
        Some(Self { year: year as u16, month, day: 1 }.with_day_clamped(day))
    }

    /// Same month, with the day replaced by `day` truncated to the month's length
    pub fn with_day_clamped(self, day: u8) -> Self {
        Self { day: day.clamp(1, self.month.count(self.year)), ..self }
    }

    /// Get date of the first day of the current month
    pub fn start_of_month(self) -> Self {
        Self { day: 1, ..self }
    }

    /// Get date of the last day of the current month
    pub fn end_of_month(self) -> Self {
        Self { day: self.month.count(self.year), ..self }
    }

    /// First Monday before the current date
    pub fn start_of_week(self) -> Option<Self> {
        self.jump_day(-self.weekday().offset())
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        let malformed = || DateError::Malformed(s.to_string());
        let date = DateParser::parse(Rule::iso_date, s)
            .map_err(|_| malformed())?
            .next()
            .ok_or_else(malformed)?;
        let (mut year, mut month, mut day) = (0, 0, 0);
        for field in date.into_inner() {
            // grammar guarantees digits only
            let value = || field.as_str().parse::<usize>().map_err(|_| malformed());
            match field.as_rule() {
                Rule::year => year = value()?,
                Rule::month => month = value()?,
                Rule::day => day = value()?,
                _ => (),
            }
        }
        let month = Month::from_number(month).ok_or(DateError::InvalidMonth(month))?;
        Date::from(year, month, day)
    }
}

const CUMULATIVE_DAYS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Number of leap years in `1..=year`
fn leaps_upto(year: i64) -> i64 {
    year / 4 - year / 100 + year / 400
}

/// Index of Jan 1st of `year`
fn first_of_year(year: i64) -> i64 {
    year * 365 + 1 + leaps_upto(year - 1)
}

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

impl fmt::Display for DateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DateError::*;
        match self {
            UnsupportedYear(y) => write!(f, "{} is outside of the supported range for years", y),
            InvalidMonth(m) => write!(f, "{} is not a valid month number", m),
            NotBissextile(y) => write!(f, "{} is not bissextile, Feb 29 does not exist", y),
            MonthTooShort(m, d) => write!(
                f,
                "{} is a short month, it does not have a {}th day",
                m, d,
            ),
            InvalidDay(d) => write!(f, "{} is not a valid day", d),
            Malformed(s) => write!(f, "'{}' is not a date", s),
        }
    }
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            InvalidMonth(_) => "months are numbered 01 to 12".to_string(),
            NotBissextile(y) => format!("did you mean {y}-02-28 or {y}-03-01 ?", y = y),
            MonthTooShort(m, d) => format!("{} is only {} days long", m,
                if *m == Month::Feb { 28.max(d - 1) } else { 30 }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
            Malformed(_) => "dates are written YYYY-MM-DD".to_string(),
        }
    }
}
