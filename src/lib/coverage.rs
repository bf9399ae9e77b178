//! Which occurrences already exist in the ledger
//!
//! Read-side suppression shared by the projector and the past-due
//! materializer: an occurrence that is covered is never proposed again.
//! The index is rebuilt from the snapshot on every call, there is no
//! cursor to get out of sync with entries edited or deleted elsewhere.

use std::collections::HashMap;

use crate::{
    date::Date,
    entry::{Entry, EntryId},
    schedule::Frequency,
    template::Template,
};

/// `template id -> dates` of the instances linked to each template,
/// plus the instances that predate template links
#[derive(Debug, Default)]
pub struct Coverage<'e> {
    linked: HashMap<&'e EntryId, Vec<Date>>,
    unlinked: Vec<&'e Entry>,
}

impl<'e> Coverage<'e> {
    pub fn index(entries: &'e [Entry]) -> Self {
        let mut coverage = Self::default();
        for entry in entries.iter().filter(|e| e.is_instance()) {
            match &entry.source_template {
                Some(id) => coverage.linked.entry(id).or_default().push(entry.date),
                None => coverage.unlinked.push(entry),
            }
        }
        coverage
    }

    /// Is the occurrence of `template` on `date` already in the ledger?
    ///
    /// Exact matches on the date always count. For monthly and yearly
    /// templates a linked instance anywhere in the same month (resp. year)
    /// counts too, so that moving a materialized instance by a few days
    /// does not bring the original slot back.
    pub fn covers(&self, template: &Template, date: Date) -> bool {
        if template.anchor() == date {
            return true;
        }
        let same_slot = |other: &Date| match template.schedule().frequency {
            Frequency::Monthly => other.month_ordinal() == date.month_ordinal(),
            Frequency::Yearly => other.year() == date.year(),
            Frequency::Daily | Frequency::Weekly => *other == date,
        };
        let linked = self
            .linked
            .get(template.id())
            .map_or(false, |dates| dates.iter().any(same_slot));
        linked || self.unlinked.iter().any(|e| e.date == date && same_values(e, template.entry()))
    }
}

/// Legacy instances carry no link, they are recognized by their values
fn same_values(instance: &Entry, template: &Entry) -> bool {
    instance.kind == template.kind
        && instance.name == template.name
        && instance.category == template.category
        && instance.amount == template.amount
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        date::Month::*,
        entry::Amount,
        schedule::Schedule,
        testing::*,
    };

    #[test]
    fn exact_and_anchor() {
        let entries = vec![
            template("rent", Schedule::monthly_from(dt!(2025-Jan-15))),
            linked("r2", "rent", dt!(2025-Feb-15)),
        ];
        let coverage = Coverage::index(&entries);
        let rent = Template::of(&entries[0]).unwrap();
        assert!(coverage.covers(&rent, dt!(2025-Jan-15)));
        assert!(coverage.covers(&rent, dt!(2025-Feb-15)));
        assert!(!coverage.covers(&rent, dt!(2025-Mar-15)));
    }

    #[test]
    fn moved_within_month() {
        let entries = vec![
            template("disney", Schedule::monthly_from(dt!(2025-Jan-5))),
            linked("d2", "disney", dt!(2025-Feb-10)),
        ];
        let coverage = Coverage::index(&entries);
        let disney = Template::of(&entries[0]).unwrap();
        assert!(coverage.covers(&disney, dt!(2025-Feb-5)));
        assert!(!coverage.covers(&disney, dt!(2025-Mar-5)));
    }

    #[test]
    fn weekly_needs_exact_date() {
        let entries = vec![
            template("gym", Schedule::new(Frequency::Weekly, 1, dt!(2025-Jan-6))),
            linked("g2", "gym", dt!(2025-Jan-14)),
        ];
        let coverage = Coverage::index(&entries);
        let gym = Template::of(&entries[0]).unwrap();
        assert!(!coverage.covers(&gym, dt!(2025-Jan-13)));
    }

    #[test]
    fn legacy_unlinked() {
        let entries = vec![
            template("rent", Schedule::monthly_from(dt!(2025-Jan-15))),
            unlinked("old", dt!(2025-Feb-15)),
        ];
        let coverage = Coverage::index(&entries);
        let rent = Template::of(&entries[0]).unwrap();
        assert!(coverage.covers(&rent, dt!(2025-Feb-15)));
        let mut edited = entries.clone();
        edited[1].amount = Amount(1);
        let coverage = Coverage::index(&edited);
        let rent = Template::of(&edited[0]).unwrap();
        assert!(!coverage.covers(&rent, dt!(2025-Feb-15)));
    }

    #[test]
    fn other_template_does_not_cover() {
        let entries = vec![
            template("rent", Schedule::monthly_from(dt!(2025-Jan-15))),
            template("gym", Schedule::monthly_from(dt!(2025-Jan-15))),
            linked("g2", "gym", dt!(2025-Feb-15)),
        ];
        let coverage = Coverage::index(&entries);
        let rent = Template::of(&entries[0]).unwrap();
        assert!(!coverage.covers(&rent, dt!(2025-Feb-15)));
    }
}
