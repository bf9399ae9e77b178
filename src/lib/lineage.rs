//! Which template an instance comes from
//!
//! Instances created before instances carried a link to their template
//! can only be matched by their values. That match is a guess: it must
//! not drive a fork without the user confirming it.

use crate::{
    entry::{Entry, EntryId},
    template,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage<'e> {
    /// recorded on the instance
    Linked(&'e EntryId),
    /// first template running on the date of the instance, with the
    /// same name and category
    Inferred(&'e EntryId),
    Unknown,
}

impl<'e> Lineage<'e> {
    pub fn template(self) -> Option<&'e EntryId> {
        match self {
            Lineage::Linked(id) | Lineage::Inferred(id) => Some(id),
            Lineage::Unknown => None,
        }
    }

    pub fn is_certain(self) -> bool {
        matches!(self, Lineage::Linked(_))
    }
}

pub fn lineage<'e>(entry: &'e Entry, entries: &'e [Entry]) -> Lineage<'e> {
    if entry.is_template() {
        return Lineage::Unknown;
    }
    if let Some(id) = &entry.source_template {
        return Lineage::Linked(id);
    }
    infer_template(entry, entries).map_or(Lineage::Unknown, Lineage::Inferred)
}

/// First match wins, in snapshot order
///
/// Only templates whose schedule is running on `entry.date` are
/// candidates, so that after a split the instance goes to the half
/// it falls in.
pub fn infer_template<'e>(entry: &Entry, entries: &'e [Entry]) -> Option<&'e EntryId> {
    template::templates(entries)
        .filter(|t| t.schedule().is_running_on(entry.date))
        .find(|t| t.entry().name == entry.name && t.entry().category == entry.category)
        .map(|t| t.id())
}
