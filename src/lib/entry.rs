//! Ledger entries: templates (carrying a schedule) and instances
//!
//! The engine never creates an `Entry` itself, it only produces drafts
//! (`InstanceDraft`, `TemplateDraft`) that the ledger turns into entries
//! once it has assigned them an id.

use std::fmt;

use crate::{date::Date, schedule::Schedule};

/// Amount of money in hundredths of the currency unit
///
/// Always positive: the direction of the flow is given by `Kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(pub i64);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.0.abs() / 100, self.0.abs() % 100)
    }
}

/// Direction of the flow of money
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Income,
    Expense,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Income => write!(f, "income"),
            Kind::Expense => write!(f, "expense"),
        }
    }
}

/// Settlement state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Paid,
    Pending,
    Planned,
}

impl Default for Status {
    fn default() -> Self {
        Status::Paid
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Paid => write!(f, "paid"),
            Status::Pending => write!(f, "pending"),
            Status::Planned => write!(f, "planned"),
        }
    }
}

/// Opaque category identifier, owned by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(pub String);

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A persisted ledger entry
///
/// With `schedule` set this is a template, otherwise an instance
/// (possibly linked to the template it came from).
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub kind: Kind,
    pub name: String,
    pub category: Category,
    pub amount: Amount,
    pub date: Date,
    pub status: Option<Status>,
    pub notes: Option<String>,
    pub schedule: Option<Schedule>,
    pub source_template: Option<EntryId>,
}

impl Entry {
    pub fn is_template(&self) -> bool {
        self.schedule.is_some()
    }

    pub fn is_instance(&self) -> bool {
        self.schedule.is_none()
    }

    /// Instance produced by (or edited from) template `id`
    pub fn is_linked_to(&self, id: &EntryId) -> bool {
        self.is_instance() && self.source_template.as_ref() == Some(id)
    }
}

/// A not-yet-persisted instance
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDraft {
    pub kind: Kind,
    pub name: String,
    pub category: Category,
    pub amount: Amount,
    pub date: Date,
    pub status: Status,
    pub notes: Option<String>,
    pub source_template: Option<EntryId>,
}

impl InstanceDraft {
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            kind: self.kind,
            name: self.name,
            category: self.category,
            amount: self.amount,
            date: self.date,
            status: Some(self.status),
            notes: self.notes,
            schedule: None,
            source_template: self.source_template,
        }
    }
}

/// A not-yet-persisted template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub kind: Kind,
    pub name: String,
    pub category: Category,
    pub amount: Amount,
    pub notes: Option<String>,
    pub schedule: Schedule,
}

impl TemplateDraft {
    /// The anchor date of a template is the start of its schedule
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry {
            id,
            kind: self.kind,
            name: self.name,
            category: self.category,
            amount: self.amount,
            date: self.schedule.start,
            status: None,
            notes: self.notes,
            schedule: Some(self.schedule),
            source_template: None,
        }
    }
}
