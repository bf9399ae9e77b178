//! An inclusive range of dates

use std::fmt;

use crate::date::{Date, Month};

/// `Period(a, b)` is the range of dates from `a` to `b` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period(pub Date, pub Date);

impl Period {
    /// The whole calendar month containing `date`
    pub fn month_of(date: Date) -> Self {
        Self(date.start_of_month(), date.end_of_month())
    }

    pub fn contains(&self, date: Date) -> bool {
        self.0 <= date && date <= self.1
    }

    pub fn is_empty(&self) -> bool {
        self.0 > self.1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (start, end) = (self.0, self.1);
        let whole_months = start.day() == 1 && end == end.end_of_month();
        if start == end {
            write!(f, "{}", start)
        } else if whole_months && start.year() == end.year()
            && start.month() == Month::Jan && end.month() == Month::Dec
        {
            write!(f, "{}", start.year())
        } else if whole_months && start.month_ordinal() == end.month_ordinal() {
            write!(f, "{:04}-{:02}", start.year(), start.month().number())
        } else {
            write!(f, "{}..{}", start, end)
        }
    }
}
