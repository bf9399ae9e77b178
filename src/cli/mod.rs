//! Command-line front end

pub mod table;

use chrono::Datelike;
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

use cadence::{
    backfill::collect_past_due,
    date::{Date, Month},
    entry::Entry,
    issue::Issue,
    ledger::{Ledger, MemoryLedger},
    limits::Limits,
    lineage::{lineage, Lineage},
    period::Period,
    projection::{month_view, project_with, Occurrence},
    recurrence::{next_occurrence, occurrences},
    session::Session,
    template,
};

use crate::load::{self, error};
use table::Table;

pub fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("cadence")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recurring entries of a budget ledger")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("FILE")
                .help("Ledger file to read")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("today")
                .long("today")
                .value_name("YYYY-MM-DD")
                .takes_value(true)
                .help("Reference date, defaults to the local date"),
        )
        .arg(
            Arg::with_name("max-walk")
                .long("max-walk")
                .value_name("N")
                .takes_value(true)
                .help("Occurrences visited per template before giving up"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("More logging, repeat for more"),
        )
        .subcommand(
            SubCommand::with_name("upcoming")
                .about("Entries and projected occurrences of a month")
                .arg(
                    Arg::with_name("month")
                        .long("month")
                        .value_name("YYYY-MM")
                        .takes_value(true)
                        .help("Month to show, defaults to the current one"),
                ),
        )
        .subcommand(SubCommand::with_name("backfill").about("Create the past-due occurrences"))
        .subcommand(
            SubCommand::with_name("schedule")
                .about("Next occurrences of every template")
                .arg(
                    Arg::with_name("count")
                        .long("count")
                        .value_name("N")
                        .takes_value(true)
                        .default_value("3"),
                ),
        )
        .subcommand(SubCommand::with_name("check").about("Validate the ledger and its templates"))
}

/// Level from `-v` occurrences, overridden by `RUST_LOG`
pub fn init_logger(verbosity: u64) -> Result<LoggerHandle, FlexiLoggerError> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    Logger::try_with_env_or_str(level)?.log_to_stderr().start()
}

pub fn run(matches: &ArgMatches) -> error::Record {
    let mut errs = error::Record::new();
    let filename = matches.value_of("FILE").unwrap_or_default();
    let today = match matches.value_of("today") {
        Some(s) => parse_date(&mut errs, "--today", s),
        None => local_today(&mut errs),
    };
    let limits = match matches.value_of("max-walk") {
        Some(s) => parse_count(&mut errs, "--max-walk", s).map(|max_walk| Limits { max_walk }),
        None => Some(Limits::default()),
    };
    let (today, limits) = match (today, limits) {
        (Some(today), Some(limits)) => (today, limits),
        _ => return errs,
    };
    let entries = match load::read_entries(filename, &mut errs) {
        Some(entries) => entries,
        None => return errs,
    };
    match matches.subcommand() {
        ("upcoming", Some(sub)) => {
            let month = match sub.value_of("month") {
                Some(s) => match parse_date(&mut errs, "--month", &format!("{}-01", s)) {
                    Some(date) => Period::month_of(date),
                    None => return errs,
                },
                None => Period::month_of(today),
            };
            upcoming(&mut errs, &entries, today, month, &limits);
        }
        ("backfill", Some(_)) => backfill(&mut errs, entries, today, &limits),
        ("schedule", Some(sub)) => {
            let count = sub.value_of("count").map_or(Some(3), |s| parse_count(&mut errs, "--count", s));
            if let Some(count) = count {
                schedule(&entries, today, count);
            }
        }
        ("check", Some(_)) => check(&mut errs, &entries, today, &limits),
        _ => unreachable!(),
    }
    errs
}

fn local_today(errs: &mut error::Record) -> Option<Date> {
    let now = chrono::Local::now().date_naive();
    let date = Month::from_number(now.month() as usize)
        .and_then(|month| Date::from(now.year() as usize, month, now.day() as usize).ok());
    if date.is_none() {
        errs.make("Unsupported date")
            .text(format!("The local date {} is out of range", now))
            .hint("pass the reference date with --today");
    }
    date
}

fn parse_date(errs: &mut error::Record, flag: &str, s: &str) -> Option<Date> {
    match s.parse::<Date>() {
        Ok(date) => Some(date),
        Err(e) => {
            errs.make("Invalid argument")
                .text(format!("{} '{}': {}", flag, s, e))
                .hint(e.fix_hint());
            None
        }
    }
}

fn parse_count(errs: &mut error::Record, flag: &str, s: &str) -> Option<usize> {
    match s.parse::<usize>() {
        Ok(n) => Some(n),
        Err(e) => {
            errs.make("Invalid argument")
                .text(format!("{} '{}': {}", flag, s, e))
                .hint("expected a nonnegative number");
            None
        }
    }
}

/// Engine issues have no location in the file
///
/// Malformed schedules were already reported by the loader.
fn register(errs: &mut error::Record, issues: &[Issue]) {
    for issue in issues {
        let label = match issue {
            Issue::Malformed { .. } => continue,
            Issue::Truncated { .. } => "Incomplete backfill",
            Issue::Exhausted { .. } => "Incomplete projection",
        };
        errs.make(label).nonfatal().text(issue).hint(issue.fix_hint());
    }
}

fn origin(entry: &Entry, entries: &[Entry]) -> String {
    if entry.is_template() {
        return entry.id.to_string();
    }
    match lineage(entry, entries) {
        Lineage::Linked(id) => id.to_string(),
        Lineage::Inferred(id) => format!("{}?", id),
        Lineage::Unknown => String::new(),
    }
}

fn upcoming(errs: &mut error::Record, entries: &[Entry], today: Date, month: Period, limits: &Limits) {
    let projection = project_with(entries, today, limits);
    register(errs, &projection.issues);
    let view = month_view(entries, &projection.virtuals, month);
    let mut table = Table::with_columns(&["Date", "Name", "Category", "Kind", "Amount", "Template", "Status"])
        .with_title(format!("Entries of {}", month))
        .right_align(4);
    for occurrence in &view {
        let row = match occurrence {
            Occurrence::Real(e) => vec![
                e.date.to_string(),
                e.name.clone(),
                e.category.to_string(),
                e.kind.to_string(),
                e.amount.to_string(),
                origin(e, entries),
                if e.is_template() {
                    "template".to_string()
                } else {
                    e.status.unwrap_or_default().to_string()
                },
            ],
            Occurrence::Virtual(v) => vec![
                v.date.to_string(),
                v.name.clone(),
                v.category.to_string(),
                v.kind.to_string(),
                v.amount.to_string(),
                v.template_id.to_string(),
                "projected".to_string(),
            ],
        };
        table.push(row);
    }
    println!("{}", table);
}

fn backfill(errs: &mut error::Record, entries: Vec<Entry>, today: Date, limits: &Limits) {
    let mut ledger = MemoryLedger::from_entries(entries);
    let report = match Session::new().start(&mut ledger, today, limits) {
        Some(report) => report,
        None => return,
    };
    register(errs, &report.issues);
    if report.created.is_empty() {
        println!("Nothing past due on {}", today);
        return;
    }
    // lines ready to be appended to the ledger file
    for entry in ledger.entries().iter().filter(|e| report.created.contains(&e.id)) {
        println!("{}", load::format_entry(entry));
    }
}

fn schedule(entries: &[Entry], today: Date, count: usize) {
    let mut table = Table::with_columns(&["Template", "Schedule", "Next"])
        .with_title(format!("Occurrences from {}", today));
    for template in template::templates(entries) {
        let dates = occurrences(template.schedule(), today)
            .take(count)
            .map(|d| d.to_string())
            .collect::<Vec<_>>();
        table.push(vec![
            template.id().to_string(),
            template.schedule().to_string(),
            dates.join(" "),
        ]);
    }
    println!("{}", table);
}

fn check(errs: &mut error::Record, entries: &[Entry], today: Date, limits: &Limits) {
    let mut table = Table::with_columns(&["Template", "Name", "State", "Next", "Past due"])
        .right_align(4);
    let backfill = collect_past_due(entries, today, limits);
    for template in template::templates(entries) {
        let due = backfill
            .drafts
            .iter()
            .filter(|d| d.source_template.as_ref() == Some(template.id()))
            .count();
        table.push(vec![
            template.id().to_string(),
            template.entry().name.clone(),
            format!("{:?}", template.state(today)),
            next_occurrence(template.schedule(), today).map_or_else(String::new, |d| d.to_string()),
            due.to_string(),
        ]);
    }
    register(errs, &backfill.issues);
    println!("{}", table);
    let inferred = entries
        .iter()
        .filter(|e| matches!(lineage(e, entries), Lineage::Inferred(_)))
        .count();
    if inferred > 0 {
        println!("{} unlinked entries look like they come from a template", inferred);
    }
}
