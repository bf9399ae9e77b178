//! Recurring entries of a budget ledger
//!
//! Templates are entries that carry a `Schedule`. From a snapshot of the
//! ledger and the current date the engine computes what is due, what is
//! coming, and how to split a series when it is edited. It never writes:
//! everything it produces is a draft or an update that a `Ledger` applies.
//!
//! All operations are pure functions of their arguments, including the
//! date, which is never read from the clock here.

#[cfg(test)]
#[macro_use]
mod testing;

pub mod backfill;
pub mod coverage;
pub mod date;
pub mod entry;
pub mod fork;
pub mod issue;
pub mod ledger;
pub mod limits;
pub mod lineage;
pub mod materialize;
pub mod period;
pub mod projection;
pub mod recurrence;
pub mod schedule;
pub mod session;
pub mod template;

pub use backfill::{collect_past_due, Backfill};
pub use date::{Date, Month};
pub use entry::{Entry, EntryId, InstanceDraft, TemplateDraft};
pub use fork::{deactivate, fork_series, fork_single, ScheduleUpdate};
pub use issue::Issue;
pub use ledger::{Ledger, MemoryLedger};
pub use limits::Limits;
pub use materialize::materialize;
pub use projection::{project, VirtualOccurrence};
pub use recurrence::next_occurrence;
pub use schedule::{Frequency, Schedule};
pub use session::Session;
