//! Borrowed view of the entries that carry a schedule

use crate::{
    date::Date,
    entry::{Entry, EntryId, InstanceDraft, Status},
    schedule::{Schedule, TemplateState},
};

/// An entry known to carry a schedule
#[derive(Debug, Clone, Copy)]
pub struct Template<'e> {
    entry: &'e Entry,
    schedule: &'e Schedule,
}

impl<'e> Template<'e> {
    /// `None` for instances
    pub fn of(entry: &'e Entry) -> Option<Self> {
        entry.schedule.as_ref().map(|schedule| Self { entry, schedule })
    }

    pub fn id(&self) -> &'e EntryId {
        &self.entry.id
    }

    pub fn entry(&self) -> &'e Entry {
        self.entry
    }

    pub fn schedule(&self) -> &'e Schedule {
        self.schedule
    }

    /// Anchor occurrence, held by the template itself
    pub fn anchor(&self) -> Date {
        self.entry.date
    }

    pub fn state(&self, today: Date) -> TemplateState {
        self.schedule.state(today)
    }

    /// Instance of this template on `date`, with the template's values
    pub fn draft_at(&self, date: Date) -> InstanceDraft {
        InstanceDraft {
            kind: self.entry.kind,
            name: self.entry.name.clone(),
            category: self.entry.category.clone(),
            amount: self.entry.amount,
            date,
            status: Status::default(),
            notes: self.entry.notes.clone(),
            source_template: Some(self.entry.id.clone()),
        }
    }
}

/// All templates of a ledger snapshot, in snapshot order
pub fn templates(entries: &[Entry]) -> impl Iterator<Item = Template<'_>> {
    entries.iter().filter_map(Template::of)
}

/// Look up a template by id
pub fn find<'e>(entries: &'e [Entry], id: &EntryId) -> Option<Template<'e>> {
    templates(entries).find(|t| t.id() == id)
}
