//! Fixtures shared by the unit tests

use crate::{
    date::Date,
    entry::{Amount, Category, Entry, EntryId, Kind},
    schedule::Schedule,
};

macro_rules! dt {
    ( $y:tt - $m:tt - $d:tt ) => {
        crate::date::Date::from($y, $m, $d).unwrap()
    };
}

fn rent(id: &str, date: Date) -> Entry {
    Entry {
        id: EntryId::from(id),
        kind: Kind::Expense,
        name: "Rent".to_string(),
        category: Category("housing".to_string()),
        amount: Amount(100000),
        date,
        status: None,
        notes: None,
        schedule: None,
        source_template: None,
    }
}

/// Rent template anchored on the start of its schedule
pub fn template(id: &str, schedule: Schedule) -> Entry {
    Entry {
        schedule: Some(schedule.clone()),
        ..rent(id, schedule.start)
    }
}

/// Rent instance materialized from `source`
pub fn linked(id: &str, source: &str, date: Date) -> Entry {
    Entry {
        source_template: Some(EntryId::from(source)),
        ..rent(id, date)
    }
}

/// Rent instance entered before instances carried a link
pub fn unlinked(id: &str, date: Date) -> Entry {
    rent(id, date)
}
