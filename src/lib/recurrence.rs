//! Evaluate a schedule: when does it next occur?
//!
//! Every candidate is derived from `schedule.start` by a whole number of
//! periods, never from the previous occurrence, so that clamping in short
//! months does not drift (`Jan 31 -> Feb 28 -> Mar 31`, not `Mar 28`).
//!
//! Nothing here reads the clock: the reference date is always an argument.

use crate::{
    date::Date,
    period::Period,
    schedule::{Frequency, Schedule},
};

/// First occurrence of `schedule` on or after `on_or_after`
///
/// `None` if the schedule is disabled or malformed, or if the
/// occurrence would fall after `schedule.end`.
pub fn next_occurrence(schedule: &Schedule, on_or_after: Date) -> Option<Date> {
    if !schedule.enabled || schedule.validate().is_err() {
        return None;
    }
    let target = on_or_after.max(schedule.start);
    if let Some(end) = schedule.end {
        if target > end {
            return None;
        }
    }
    let candidate = match schedule.frequency {
        Frequency::Daily => next_daily(schedule, target),
        Frequency::Weekly => next_weekly(schedule, target),
        Frequency::Monthly => next_monthly(schedule, target),
        Frequency::Yearly => next_yearly(schedule, target),
    }?;
    match schedule.end {
        Some(end) if candidate > end => None,
        _ => Some(candidate),
    }
}

// In each of the following `target >= schedule.start` and `interval >= 1`.
// `k` counts periods since the start; its first estimate never overshoots
// and the candidate of period `k + 1` is always past `target`.

fn next_daily(schedule: &Schedule, target: Date) -> Option<Date> {
    let interval = schedule.interval as i64;
    let elapsed = schedule.start.days_until(target);
    let k = (elapsed + interval - 1) / interval;
    schedule.start.jump_day(k * interval)
}

fn next_weekly(schedule: &Schedule, target: Date) -> Option<Date> {
    let interval = schedule.interval as i64;
    let first_week = schedule.start.start_of_week()?;
    let offset = schedule.weekday().offset();
    let candidate = |k: i64| first_week.jump_day(7 * k * interval + offset);
    let k = first_week.days_until(target) / 7 / interval;
    match candidate(k)? {
        date if date >= target => Some(date),
        _ => candidate(k + 1),
    }
}

fn next_monthly(schedule: &Schedule, target: Date) -> Option<Date> {
    let interval = schedule.interval as i64;
    let first_month = schedule.start.month_ordinal();
    let day = schedule.monthday();
    let candidate = |k: i64| Date::from_month_ordinal(first_month + k * interval, day);
    let k = (target.month_ordinal() - first_month) / interval;
    match candidate(k)? {
        date if date >= target => Some(date),
        _ => candidate(k + 1),
    }
}

fn next_yearly(schedule: &Schedule, target: Date) -> Option<Date> {
    let interval = schedule.interval as i64;
    let candidate = |k: i64| schedule.start.jump_year(k * interval);
    let k = (target.year() as i64 - schedule.start.year() as i64) / interval;
    match candidate(k)? {
        date if date >= target => Some(date),
        _ => candidate(k + 1),
    }
}

/// Successive occurrences of a schedule
///
/// Ends when the schedule does (see `next_occurrence`), it is up to
/// the caller to bound open-ended schedules.
#[derive(Debug, Clone)]
pub struct Occurrences<'s> {
    schedule: &'s Schedule,
    next: Option<Date>,
}

impl Iterator for Occurrences<'_> {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next?;
        self.next = current
            .next()
            .and_then(|after| next_occurrence(self.schedule, after));
        Some(current)
    }
}

/// All occurrences of `schedule` on or after `from`
pub fn occurrences(schedule: &Schedule, from: Date) -> Occurrences<'_> {
    Occurrences {
        schedule,
        next: next_occurrence(schedule, from),
    }
}

/// Occurrences that fall within `period`
pub fn occurrences_between(schedule: &Schedule, period: Period) -> Vec<Date> {
    occurrences(schedule, period.0)
        .take_while(|date| *date <= period.1)
        .collect()
}
