//! Turn a confirmed virtual occurrence into an instance draft
//!
//! No existence check happens here: refusing to write the same
//! occurrence twice is the job of the write path (see `Session::confirm`).

use crate::{
    entry::{InstanceDraft, Status},
    projection::VirtualOccurrence,
};

pub fn materialize(occurrence: &VirtualOccurrence) -> InstanceDraft {
    InstanceDraft {
        kind: occurrence.kind,
        name: occurrence.name.clone(),
        category: occurrence.category.clone(),
        amount: occurrence.amount,
        date: occurrence.date,
        status: Status::default(),
        notes: None,
        source_template: Some(occurrence.template_id.clone()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        date::Month::*,
        entry::EntryId,
        projection::project,
        schedule::Schedule,
        testing::*,
    };

    #[test]
    fn copies_fields_and_links() {
        let entries = vec![template("rent", Schedule::monthly_from(dt!(2025-Jan-15)))];
        let virtuals = project(&entries, dt!(2025-Jan-20));
        let draft = materialize(&virtuals[0]);
        assert_eq!(draft.date, dt!(2025-Feb-15));
        assert_eq!(draft.name, "Rent");
        assert_eq!(draft.amount, entries[0].amount);
        assert_eq!(draft.category, entries[0].category);
        assert_eq!(draft.status, Status::Paid);
        assert_eq!(draft.source_template, Some(EntryId::from("rent")));
        let entry = draft.into_entry(EntryId::from("r2"));
        assert!(entry.is_instance());
        assert!(entry.is_linked_to(&EntryId::from("rent")));
    }

    #[test]
    fn no_existence_check() {
        let entries = vec![template("rent", Schedule::monthly_from(dt!(2025-Jan-15)))];
        let virtuals = project(&entries, dt!(2025-Jan-20));
        assert_eq!(materialize(&virtuals[0]), materialize(&virtuals[0]));
    }
}
