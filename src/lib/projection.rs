//! Upcoming occurrences that do not exist in the ledger yet
//!
//! Virtual occurrences are recomputed on every read and never stored.
//! At most one is produced per template: the nearest one that is not
//! already covered by a real instance.

use log::{debug, warn};

use crate::{
    coverage::Coverage,
    date::Date,
    entry::{Amount, Category, Entry, EntryId, Kind},
    issue::Issue,
    limits::Limits,
    period::Period,
    recurrence::next_occurrence,
    template::{self, Template},
};

/// Projection of a template on a date, for preview and confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualOccurrence {
    pub template_id: EntryId,
    pub date: Date,
    pub kind: Kind,
    pub name: String,
    pub category: Category,
    pub amount: Amount,
}

/// Result of a projection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// at most one per template, in template order
    pub virtuals: Vec<VirtualOccurrence>,
    /// templates whose walk was abandoned
    pub issues: Vec<Issue>,
}

/// Either a persisted instance or a projected one
#[derive(Debug, Clone, PartialEq)]
pub enum Occurrence<'e> {
    Real(&'e Entry),
    Virtual(VirtualOccurrence),
}

impl Occurrence<'_> {
    pub fn is_virtual(&self) -> bool {
        matches!(self, Occurrence::Virtual(_))
    }

    pub fn date(&self) -> Date {
        match self {
            Occurrence::Real(entry) => entry.date,
            Occurrence::Virtual(v) => v.date,
        }
    }
}

impl VirtualOccurrence {
    fn of(template: &Template, date: Date) -> Self {
        let entry = template.entry();
        Self {
            template_id: entry.id.clone(),
            date,
            kind: entry.kind,
            name: entry.name.clone(),
            category: entry.category.clone(),
            amount: entry.amount,
        }
    }
}

/// Next uncovered occurrence of every enabled template, on or after `today`
///
/// Month-agnostic: filtering by month is left to the caller
/// (see `month_view`).
pub fn project(entries: &[Entry], today: Date) -> Vec<VirtualOccurrence> {
    project_with(entries, today, &Limits::default()).virtuals
}

/// Same as `project`, with explicit bounds on the walk past covered
/// occurrences and the templates for which the bound was reached
pub fn project_with(entries: &[Entry], today: Date, limits: &Limits) -> Projection {
    let coverage = Coverage::index(entries);
    let mut projection = Projection::default();
    for template in template::templates(entries) {
        if !template.schedule().enabled {
            continue;
        }
        match first_uncovered(&template, &coverage, today, limits) {
            Ok(Some(date)) => {
                debug!("projected '{}' on {}", template.id(), date);
                projection.virtuals.push(VirtualOccurrence::of(&template, date));
            }
            Ok(None) => (),
            Err(issue) => {
                warn!("{}", issue);
                projection.issues.push(issue);
            }
        }
    }
    projection
}

/// `Ok(None)` when the schedule has no occurrence left
fn first_uncovered(
    template: &Template,
    coverage: &Coverage,
    today: Date,
    limits: &Limits,
) -> Result<Option<Date>, Issue> {
    let schedule = template.schedule();
    let mut candidate = next_occurrence(schedule, today);
    for _ in 0..limits.max_walk {
        let date = match candidate {
            Some(date) => date,
            None => return Ok(None),
        };
        if !coverage.covers(template, date) {
            return Ok(Some(date));
        }
        candidate = date.next().and_then(|after| next_occurrence(schedule, after));
    }
    match candidate {
        None => Ok(None),
        Some(_) => Err(Issue::Exhausted {
            template: template.id().clone(),
            from: today,
            limit: limits.max_walk,
        }),
    }
}

/// Real entries and virtual occurrences falling within `month`, by date
///
/// Templates count as real on their own date: that occurrence is the
/// template itself, never projected.
pub fn month_view<'e>(
    entries: &'e [Entry],
    virtuals: &[VirtualOccurrence],
    month: Period,
) -> Vec<Occurrence<'e>> {
    let mut view = entries
        .iter()
        .filter(|e| month.contains(e.date))
        .map(Occurrence::Real)
        .chain(
            virtuals
                .iter()
                .filter(|v| month.contains(v.date))
                .cloned()
                .map(Occurrence::Virtual),
        )
        .collect::<Vec<_>>();
    view.sort_by_key(Occurrence::date);
    view
}
