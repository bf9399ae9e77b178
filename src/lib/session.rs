//! Per-session write path
//!
//! The past-due collection runs once per session, and a projected
//! occurrence is written at most once however many times it is confirmed.
//! Both are guarded here against the ledger, never inside the engine.

use log::info;

use crate::{
    backfill::collect_past_due,
    coverage::Coverage,
    date::Date,
    entry::EntryId,
    issue::Issue,
    ledger::Ledger,
    limits::Limits,
    materialize::materialize,
    projection::VirtualOccurrence,
    template,
};

/// State carried from one call to the next within a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    past_due_done: bool,
}

/// What the startup collection wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// in date order
    pub created: Vec<EntryId>,
    pub issues: Vec<Issue>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn past_due_done(&self) -> bool {
        self.past_due_done
    }

    /// Persist every past-due occurrence, the first time only
    ///
    /// `None` if this session already did it.
    pub fn start<L: Ledger>(&mut self, ledger: &mut L, today: Date, limits: &Limits) -> Option<StartupReport> {
        if self.past_due_done {
            return None;
        }
        self.past_due_done = true;
        let backfill = collect_past_due(ledger.entries(), today, limits);
        let created = backfill
            .drafts
            .into_iter()
            .map(|draft| ledger.add_instance(draft))
            .collect::<Vec<_>>();
        info!("session start on {}: {} entries created", today, created.len());
        Some(StartupReport {
            created,
            issues: backfill.issues,
        })
    }

    /// Persist a projected occurrence the user confirmed
    ///
    /// `None` if the ledger already holds it.
    pub fn confirm<L: Ledger>(ledger: &mut L, occurrence: &VirtualOccurrence) -> Option<EntryId> {
        let covered = {
            let entries = ledger.entries();
            match template::find(entries, &occurrence.template_id) {
                Some(template) => Coverage::index(entries).covers(&template, occurrence.date),
                None => entries
                    .iter()
                    .any(|e| e.is_linked_to(&occurrence.template_id) && e.date == occurrence.date),
            }
        };
        if covered {
            info!("'{}' on {} is already in the ledger", occurrence.template_id, occurrence.date);
            return None;
        }
        Some(ledger.add_instance(materialize(occurrence)))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        date::Month::*,
        ledger::MemoryLedger,
        projection::project,
        schedule::Schedule,
        testing::*,
    };

    #[test]
    fn start_runs_once() {
        let mut ledger = MemoryLedger::from_entries(vec![template(
            "rent",
            Schedule::monthly_from(dt!(2025-Jan-15)),
        )]);
        let mut session = Session::new();
        assert!(!session.past_due_done());
        let report = session.start(&mut ledger, dt!(2025-Mar-20), &Limits::default()).unwrap();
        assert_eq!(report.created, vec![EntryId::from("e1"), EntryId::from("e2")]);
        assert!(report.issues.is_empty());
        assert!(session.past_due_done());
        assert_eq!(session.start(&mut ledger, dt!(2025-Apr-20), &Limits::default()), None);
        assert_eq!(ledger.entries().len(), 3);
        // a new session picks up from the ledger
        let report = Session::new().start(&mut ledger, dt!(2025-Apr-20), &Limits::default()).unwrap();
        assert_eq!(report.created.len(), 1);
        assert_eq!(ledger.entries()[3].date, dt!(2025-Apr-15));
    }

    #[test]
    fn confirm_once() {
        let mut ledger = MemoryLedger::from_entries(vec![template(
            "rent",
            Schedule::monthly_from(dt!(2025-Jan-15)),
        )]);
        let virtuals = project(ledger.entries(), dt!(2025-Jan-20));
        let occurrence = virtuals[0].clone();
        assert_eq!(Session::confirm(&mut ledger, &occurrence), Some(EntryId::from("e1")));
        assert_eq!(Session::confirm(&mut ledger, &occurrence), None);
        assert_eq!(ledger.entries().len(), 2);
        // the projection moves on to the next occurrence
        let virtuals = project(ledger.entries(), dt!(2025-Jan-20));
        assert_eq!(virtuals[0].date, dt!(2025-Mar-15));
    }

    #[test]
    fn confirm_after_template_removed() {
        let mut ledger = MemoryLedger::from_entries(vec![template(
            "rent",
            Schedule::monthly_from(dt!(2025-Jan-15)),
        )]);
        let occurrence = project(ledger.entries(), dt!(2025-Jan-20))[0].clone();
        let mut entries = ledger.into_entries();
        entries.clear();
        let mut ledger = MemoryLedger::from_entries(entries);
        assert!(Session::confirm(&mut ledger, &occurrence).is_some());
        assert!(Session::confirm(&mut ledger, &occurrence).is_none());
    }
}
