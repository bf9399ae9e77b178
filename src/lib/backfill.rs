//! Past-due materialization
//!
//! Computes every occurrence up to and including today that has no
//! instance in the ledger yet, and turns each into a draft. Nothing is
//! written: the caller persists the drafts, once per session.
//!
//! Idempotence comes only from the existence check against the snapshot.
//! Calling twice on the same snapshot gives the same drafts, calling
//! again after persisting them gives none.

use log::{debug, info, warn};

use crate::{
    coverage::Coverage,
    date::Date,
    entry::{Entry, InstanceDraft},
    issue::Issue,
    limits::Limits,
    recurrence::next_occurrence,
    template::{self, Template},
};

/// Result of a past-due collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backfill {
    /// by date, ties in template order
    pub drafts: Vec<InstanceDraft>,
    /// templates skipped or cut short
    pub issues: Vec<Issue>,
}

impl Backfill {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Drafts for all unconfirmed occurrences on or before `today`
pub fn collect_past_due(entries: &[Entry], today: Date, limits: &Limits) -> Backfill {
    let coverage = Coverage::index(entries);
    // covered occurrences each use up a distinct entry
    let max_steps = limits.max_walk.saturating_add(entries.len());
    let mut backfill = Backfill::default();
    for template in template::templates(entries) {
        if !template.schedule().enabled {
            continue;
        }
        if let Err(reason) = template.schedule().validate() {
            let issue = Issue::Malformed { template: template.id().clone(), reason };
            warn!("{}", issue);
            backfill.issues.push(issue);
            continue;
        }
        walk(&template, &coverage, today, limits.max_walk, max_steps, &mut backfill);
    }
    backfill.drafts.sort_by_key(|draft| draft.date);
    info!(
        "{} past-due occurrences up to {}, {} issues",
        backfill.drafts.len(),
        today,
        backfill.issues.len()
    );
    backfill
}

fn walk(
    template: &Template,
    coverage: &Coverage,
    today: Date,
    max_drafts: usize,
    max_steps: usize,
    backfill: &mut Backfill,
) {
    let schedule = template.schedule();
    let mut emitted = 0;
    let mut candidate = next_occurrence(schedule, schedule.start);
    for _ in 0..max_steps {
        let date = match candidate {
            Some(date) if date <= today => date,
            _ => return,
        };
        if !coverage.covers(template, date) {
            if emitted == max_drafts {
                truncated(template, date, max_drafts, backfill);
                return;
            }
            debug!("past-due '{}' on {}", template.id(), date);
            backfill.drafts.push(template.draft_at(date));
            emitted += 1;
        }
        candidate = date.next().and_then(|after| next_occurrence(schedule, after));
    }
    if let Some(date) = candidate.filter(|date| *date <= today) {
        truncated(template, date, max_drafts, backfill);
    }
}

fn truncated(template: &Template, date: Date, limit: usize, backfill: &mut Backfill) {
    let issue = Issue::Truncated {
        template: template.id().clone(),
        last: backfill
            .drafts
            .iter()
            .rev()
            .find(|d| d.source_template.as_ref() == Some(template.id()))
            .map_or(date, |d| d.date),
        limit,
    };
    warn!("{}", issue);
    backfill.issues.push(issue);
}
