//! Editing recurring series
//!
//! Three ways to edit: one occurrence only, this occurrence and all the
//! following ones, or stop the series altogether. None of them writes
//! anything, they return the drafts and updates for the ledger to apply.

use std::fmt;

use crate::{
    date::Date,
    entry::{Amount, Category, Entry, EntryId, InstanceDraft, Kind, Status, TemplateDraft},
    schedule::{Frequency, Schedule, ScheduleError},
    template::Template,
};

/// New values for the fields of an entry, `None` keeps the current one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPatch {
    pub kind: Option<Kind>,
    pub name: Option<String>,
    pub category: Option<Category>,
    pub amount: Option<Amount>,
    pub notes: Option<String>,
    /// only read by `fork_single`
    pub status: Option<Status>,
}

/// New recurrence for the continuation of a series, `None` keeps the
/// current one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulePatch {
    pub frequency: Option<Frequency>,
    pub interval: Option<i32>,
    pub day_of_month: Option<u8>,
    pub day_of_week: Option<u8>,
}

/// Mutation of the schedule of an existing template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleUpdate {
    /// last occurrence on or before `end`
    EndOn { template: EntryId, end: Date },
    /// no occurrence ever again
    Disable { template: EntryId },
}

impl ScheduleUpdate {
    pub fn template(&self) -> &EntryId {
        match self {
            ScheduleUpdate::EndOn { template, .. } | ScheduleUpdate::Disable { template } => template,
        }
    }

    /// Apply to `entry`, does nothing if it is not a template
    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(schedule) = &mut entry.schedule {
            match self {
                ScheduleUpdate::EndOn { end, .. } => schedule.end = Some(*end),
                ScheduleUpdate::Disable { .. } => schedule.enabled = false,
            }
        }
    }
}

/// Result of splitting a series in two
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFork {
    /// closes the original template the day before the edit point
    pub end: ScheduleUpdate,
    /// continues the series from the edit point with the new values
    pub template: TemplateDraft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkError {
    /// the first occurrence is the template itself
    AtOrBeforeStart { start: Date, date: Date },
    /// the series is already over at that point
    PastEnd { end: Date, date: Date },
    /// deactivated series are not edited, only their past instances
    Disabled(EntryId),
    /// the continuation would not be a usable schedule
    Malformed(ScheduleError),
}

impl fmt::Display for ForkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForkError::AtOrBeforeStart { start, date } => {
                write!(f, "cannot split a series starting on {} at {}", start, date)
            }
            ForkError::PastEnd { end, date } => {
                write!(f, "cannot split a series ending on {} at {}", end, date)
            }
            ForkError::Disabled(id) => write!(f, "template '{}' is deactivated", id),
            ForkError::Malformed(e) => write!(f, "the new schedule is malformed: {}", e),
        }
    }
}

impl ForkError {
    /// What message to show to help fix the edit
    pub fn fix_hint(&self) -> String {
        match self {
            ForkError::AtOrBeforeStart { .. } => "edit the template itself instead".to_string(),
            ForkError::PastEnd { end, .. } => format!("pick an occurrence on or before {}", end),
            ForkError::Disabled(_) => "edit its past instances one at a time".to_string(),
            ForkError::Malformed(e) => e.fix_hint(),
        }
    }
}

/// Edit only the occurrence of `template` on `date`
///
/// The template is untouched and keeps its slot on `date`: the instance
/// returned here is what suppresses it once persisted.
pub fn fork_single(template: &Template, date: Date, patch: &EntryPatch) -> InstanceDraft {
    let base = template.draft_at(date);
    InstanceDraft {
        kind: patch.kind.unwrap_or(base.kind),
        name: patch.name.clone().unwrap_or(base.name),
        category: patch.category.clone().unwrap_or(base.category),
        amount: patch.amount.unwrap_or(base.amount),
        status: patch.status.unwrap_or(base.status),
        notes: patch.notes.clone().or(base.notes),
        ..base
    }
}

/// Edit the occurrence of `template` on `date` and all following ones
///
/// History strictly before `date` stays with the original template.
pub fn fork_series(
    template: &Template,
    date: Date,
    patch: &EntryPatch,
    schedule_patch: &SchedulePatch,
) -> Result<SeriesFork, ForkError> {
    let original = template.schedule();
    if !original.enabled {
        return Err(ForkError::Disabled(template.id().clone()));
    }
    if date <= original.start {
        return Err(ForkError::AtOrBeforeStart { start: original.start, date });
    }
    if let Some(end) = original.end {
        if date > end {
            return Err(ForkError::PastEnd { end, date });
        }
    }
    // date > start >= Date::MIN
    let last = date.prev().ok_or(ForkError::AtOrBeforeStart { start: original.start, date })?;
    let schedule = continuation(original, date, schedule_patch);
    schedule.validate().map_err(ForkError::Malformed)?;
    let entry = template.entry();
    Ok(SeriesFork {
        end: ScheduleUpdate::EndOn {
            template: entry.id.clone(),
            end: last,
        },
        template: TemplateDraft {
            kind: patch.kind.unwrap_or(entry.kind),
            name: patch.name.clone().unwrap_or_else(|| entry.name.clone()),
            category: patch.category.clone().unwrap_or_else(|| entry.category.clone()),
            amount: patch.amount.unwrap_or(entry.amount),
            notes: patch.notes.clone().or_else(|| entry.notes.clone()),
            schedule,
        },
    })
}

/// Schedule of the second half of a split series
///
/// When the frequency is kept, so are the effective anchors: a series
/// that was following its start date keeps the same day even though the
/// new start is an occurrence that may have been clamped.
fn continuation(original: &Schedule, start: Date, patch: &SchedulePatch) -> Schedule {
    let frequency = patch.frequency.unwrap_or(original.frequency);
    let same = frequency == original.frequency;
    Schedule {
        enabled: true,
        frequency,
        interval: patch.interval.unwrap_or(original.interval),
        start,
        end: None,
        day_of_month: patch
            .day_of_month
            .or_else(|| same.then(|| original.monthday())),
        day_of_week: patch
            .day_of_week
            .or_else(|| same.then(|| original.weekday().sunday_index())),
    }
}

/// Stop `template` from ever producing occurrences again
///
/// Instances already in the ledger are not affected.
pub fn deactivate(template: &Template) -> ScheduleUpdate {
    ScheduleUpdate::Disable {
        template: template.id().clone(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        backfill::collect_past_due,
        date::Month::*,
        limits::Limits,
        projection::project,
        recurrence::{next_occurrence, occurrences},
        schedule::TemplateState,
        testing::*,
    };

    fn amount(patch: i64) -> EntryPatch {
        EntryPatch {
            amount: Some(Amount(patch)),
            ..EntryPatch::default()
        }
    }

    #[test]
    fn single_keeps_template() {
        let entries = vec![template("rent", Schedule::monthly_from(dt!(2026-Jan-15)))];
        let rent = Template::of(&entries[0]).unwrap();
        let patch = EntryPatch {
            status: Some(Status::Pending),
            ..amount(120000)
        };
        let draft = fork_single(&rent, dt!(2026-Feb-15), &patch);
        assert_eq!(draft.date, dt!(2026-Feb-15));
        assert_eq!(draft.amount, Amount(120000));
        assert_eq!(draft.status, Status::Pending);
        assert_eq!(draft.name, "Rent");
        assert_eq!(draft.source_template, Some(EntryId::from("rent")));
        // the edited instance suppresses the slot, the next one is unchanged
        let mut entries = entries.clone();
        entries.push(draft.into_entry(EntryId::from("r2")));
        let virtuals = project(&entries, dt!(2026-Feb-1));
        assert_eq!(virtuals[0].date, dt!(2026-Mar-15));
        assert_eq!(virtuals[0].amount, Amount(100000));
    }

    #[test]
    fn series_split() {
        let mut entries = vec![template("rent", Schedule::monthly_from(dt!(2026-Jan-15)))];
        entries[0].amount = Amount(10000);
        let fork = {
            let rent = Template::of(&entries[0]).unwrap();
            fork_series(&rent, dt!(2026-Mar-15), &amount(15000), &SchedulePatch::default()).unwrap()
        };
        assert_eq!(
            fork.end,
            ScheduleUpdate::EndOn { template: EntryId::from("rent"), end: dt!(2026-Mar-14) }
        );
        assert_eq!(fork.template.schedule.start, dt!(2026-Mar-15));
        assert_eq!(fork.template.schedule.end, None);
        assert_eq!(fork.template.amount, Amount(15000));
        fork.end.apply_to(&mut entries[0]);
        entries.push(fork.template.into_entry(EntryId::from("rent2")));

        let old = entries[0].schedule.as_ref().unwrap();
        let dates = occurrences(old, dt!(2026-Jan-1)).collect::<Vec<_>>();
        assert_eq!(dates, vec![dt!(2026-Jan-15), dt!(2026-Feb-15)]);
        let new = entries[1].schedule.as_ref().unwrap();
        assert_eq!(next_occurrence(new, dt!(2026-Jan-1)), Some(dt!(2026-Mar-15)));
        assert_eq!(next_occurrence(new, dt!(2026-Mar-16)), Some(dt!(2026-Apr-15)));

        let backfill = collect_past_due(&entries, dt!(2026-Apr-20), &Limits::default());
        let got = backfill
            .drafts
            .iter()
            .map(|d| (d.date, d.amount))
            .collect::<Vec<_>>();
        // Mar 15 is the anchor of the new template
        assert_eq!(got, vec![(dt!(2026-Feb-15), Amount(10000)), (dt!(2026-Apr-15), Amount(15000))]);
        assert_eq!(entries[0].schedule.as_ref().unwrap().state(dt!(2026-Apr-20)), TemplateState::Ended);
    }

    #[test]
    fn series_keeps_effective_day() {
        let entries = vec![template(
            "rent",
            Schedule::new(Frequency::Monthly, 1, dt!(2026-Jan-31)),
        )];
        let rent = Template::of(&entries[0]).unwrap();
        let fork = fork_series(&rent, dt!(2026-Feb-28), &EntryPatch::default(), &SchedulePatch::default())
            .unwrap();
        assert_eq!(fork.template.schedule.day_of_month, Some(31));
        assert_eq!(next_occurrence(&fork.template.schedule, dt!(2026-Mar-1)), Some(dt!(2026-Mar-31)));
        let weekly = SchedulePatch {
            frequency: Some(Frequency::Weekly),
            ..SchedulePatch::default()
        };
        let fork = fork_series(&rent, dt!(2026-Feb-28), &EntryPatch::default(), &weekly).unwrap();
        assert_eq!(fork.template.schedule.day_of_month, None);
        assert_eq!(fork.template.schedule.day_of_week, None);
        assert_eq!(fork.template.schedule.frequency, Frequency::Weekly);
    }

    #[test]
    fn series_bounds() {
        let schedule = Schedule {
            end: Some(dt!(2026-Jun-30)),
            ..Schedule::monthly_from(dt!(2026-Jan-15))
        };
        let entries = vec![template("rent", schedule)];
        let rent = Template::of(&entries[0]).unwrap();
        let none = (&EntryPatch::default(), &SchedulePatch::default());
        assert_eq!(
            fork_series(&rent, dt!(2026-Jan-15), none.0, none.1),
            Err(ForkError::AtOrBeforeStart { start: dt!(2026-Jan-15), date: dt!(2026-Jan-15) })
        );
        assert_eq!(
            fork_series(&rent, dt!(2026-Jul-15), none.0, none.1),
            Err(ForkError::PastEnd { end: dt!(2026-Jun-30), date: dt!(2026-Jul-15) })
        );
        assert!(fork_series(&rent, dt!(2026-Jun-30), none.0, none.1).is_ok());
    }

    #[test]
    fn series_rejects_bad_continuation() {
        let entries = vec![template("gym", Schedule::new(Frequency::Weekly, 1, dt!(2026-Jan-5)))];
        let gym = Template::of(&entries[0]).unwrap();
        let zero = SchedulePatch {
            interval: Some(0),
            ..SchedulePatch::default()
        };
        let fork = fork_series(&gym, dt!(2026-Jan-12), &EntryPatch::default(), &zero);
        assert_eq!(fork, Err(ForkError::Malformed(ScheduleError::NonPositiveInterval(0))));
        let ninth_day = SchedulePatch {
            day_of_week: Some(9),
            ..SchedulePatch::default()
        };
        let fork = fork_series(&gym, dt!(2026-Jan-12), &EntryPatch::default(), &ninth_day);
        assert_eq!(fork, Err(ForkError::Malformed(ScheduleError::InvalidDayOfWeek(9))));
        assert_eq!(fork.unwrap_err().fix_hint(), ScheduleError::InvalidDayOfWeek(9).fix_hint());
    }

    #[test]
    fn series_of_deactivated_template() {
        let mut entries = vec![template("rent", Schedule::monthly_from(dt!(2026-Jan-15)))];
        deactivate(&Template::of(&entries[0]).unwrap()).apply_to(&mut entries[0]);
        let rent = Template::of(&entries[0]).unwrap();
        assert_eq!(
            fork_series(&rent, dt!(2026-Mar-15), &amount(15000), &SchedulePatch::default()),
            Err(ForkError::Disabled(EntryId::from("rent")))
        );
    }

    #[test]
    fn deactivate_and_state() {
        let mut entries = vec![template("rent", Schedule::monthly_from(dt!(2026-Jan-15)))];
        let update = deactivate(&Template::of(&entries[0]).unwrap());
        assert_eq!(update.template(), &EntryId::from("rent"));
        update.apply_to(&mut entries[0]);
        let rent = Template::of(&entries[0]).unwrap();
        assert_eq!(rent.state(dt!(2026-Jan-1)), TemplateState::Deactivated);
        // instances are not templates, nothing to update
        let mut instance = linked("r2", "rent", dt!(2026-Feb-15));
        update.apply_to(&mut instance);
        assert!(instance.is_instance());
    }
}
