//! Where entries live
//!
//! The engine only reads snapshots and returns drafts and updates.
//! A `Ledger` is what turns those into entries.

use std::collections::HashSet;
use std::fmt;

use log::debug;

use crate::{
    entry::{Entry, EntryId, InstanceDraft, TemplateDraft},
    fork::{ScheduleUpdate, SeriesFork},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// no template has this id
    UnknownTemplate(EntryId),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::UnknownTemplate(id) => write!(f, "no template '{}' in the ledger", id),
        }
    }
}

/// Storage of entries, assigning ids
pub trait Ledger {
    /// Current snapshot
    fn entries(&self) -> &[Entry];

    fn add_instance(&mut self, draft: InstanceDraft) -> EntryId;

    fn add_template(&mut self, draft: TemplateDraft) -> EntryId;

    fn apply(&mut self, update: &ScheduleUpdate) -> Result<(), LedgerError>;

    /// Close the original series and open its continuation
    fn commit_fork(&mut self, fork: SeriesFork) -> Result<EntryId, LedgerError> {
        self.apply(&fork.end)?;
        Ok(self.add_template(fork.template))
    }
}

/// Ledger held in memory, ids are `e1`, `e2`, ... skipping the taken ones
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Vec<Entry>,
    taken: HashSet<EntryId>,
    counter: usize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries are kept as is, ids are assumed distinct
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let taken = entries.iter().map(|e| e.id.clone()).collect();
        Self {
            entries,
            taken,
            counter: 0,
        }
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    fn fresh_id(&mut self) -> EntryId {
        loop {
            self.counter += 1;
            let id = EntryId(format!("e{}", self.counter));
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }
}

impl Ledger for MemoryLedger {
    fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn add_instance(&mut self, draft: InstanceDraft) -> EntryId {
        let id = self.fresh_id();
        debug!("add instance '{}' on {}", id, draft.date);
        self.entries.push(draft.into_entry(id.clone()));
        id
    }

    fn add_template(&mut self, draft: TemplateDraft) -> EntryId {
        let id = self.fresh_id();
        debug!("add template '{}' {}", id, draft.schedule);
        self.entries.push(draft.into_entry(id.clone()));
        id
    }

    fn apply(&mut self, update: &ScheduleUpdate) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.is_template() && &e.id == update.template())
            .ok_or_else(|| LedgerError::UnknownTemplate(update.template().clone()))?;
        update.apply_to(entry);
        Ok(())
    }
}
