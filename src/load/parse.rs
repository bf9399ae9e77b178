//! Convert the contents of a ledger file into entries

#![allow(clippy::upper_case_acronyms)]

use std::collections::HashMap;

use pest::Parser;
use pest_derive::Parser;

use cadence::{
    date::Date,
    entry::{Amount, Category, Entry, EntryId, Kind, Status},
    schedule::{Frequency, Schedule},
};

use crate::load::error;

type Pair<'i> = pest::iterators::Pair<'i, Rule>;

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/ledger.pest"]
pub struct LedgerParser;

/// Entries of `contents`, in file order
///
/// Entries that failed validation are left out. The caller should
/// check `errs.is_fatal()` rather than the length of the result.
pub fn extract<'i>(path: &'i str, errs: &mut error::Record, contents: &'i str) -> Vec<Entry> {
    let pairs = match LedgerParser::parse(Rule::program, contents) {
        Ok(pairs) => pairs,
        Err(e) => {
            errs.make("Parsing failure").from(e.with_path(path));
            return Vec::new();
        }
    };
    let mut lines = Vec::new();
    for pair in pairs {
        let loc = (path, pair.as_span());
        let entry = match pair.as_rule() {
            Rule::template_line => validate_template(path, errs, pair),
            Rule::entry_line => validate_entry(path, errs, pair),
            Rule::EOI => break,
            _ => unreachable!(),
        };
        if let Some(entry) = entry {
            lines.push((loc, entry));
        }
    }
    check_ids(errs, &lines);
    check_links(errs, &lines);
    lines.into_iter().map(|(_, entry)| entry).collect()
}

// head and rest of inner
macro_rules! decapitate {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No head"));
        (fst, items)
    }};
}

// sole element of inner
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        assert!(items.next().is_none(), "Several subrules");
        fst
    }};
}

/// Fields shared by templates and instances
struct Values {
    kind: Kind,
    name: String,
    category: Category,
    amount: Amount,
    date: Date,
}

/// `id: values (recurrence | recurring) note?`
fn validate_template(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Entry> {
    let (id, mut rest) = decapitate!(pair);
    let id = EntryId::from(id.as_str());
    let values = validate_values(path, errs, rest.next()?)?;
    let recurrence = rest.next()?;
    let loc = (path, recurrence.as_span());
    let schedule = match recurrence.as_rule() {
        Rule::legacy => Schedule::monthly_from(values.date),
        Rule::recurrence => validate_recurrence(path, errs, values.date, recurrence)?,
        _ => unreachable!("{:?}", recurrence),
    };
    if let Err(e) = schedule.validate() {
        errs.make("Malformed schedule")
            .nonfatal()
            .span(&loc, format!("in template '{}'", id))
            .text(format!("This schedule {} and will never occur", e))
            .hint(e.fix_hint());
    }
    let notes = rest.next().map(|note| subrule!(subrule!(note)).as_str().to_string());
    Some(Entry {
        id,
        kind: values.kind,
        name: values.name,
        category: values.category,
        amount: values.amount,
        date: values.date,
        status: None,
        notes,
        schedule: Some(schedule),
        source_template: None,
    })
}

/// `id: values status? source? note?`
fn validate_entry(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Entry> {
    let (id, rest) = decapitate!(pair);
    let mut entry = None;
    let mut status = None;
    let mut source_template = None;
    let mut notes = None;
    for item in rest {
        match item.as_rule() {
            Rule::values => entry = Some(validate_values(path, errs, item)?),
            Rule::status => status = Some(read_status(item.as_str())),
            Rule::source => source_template = Some(EntryId::from(subrule!(item).as_str())),
            Rule::note => notes = Some(subrule!(subrule!(item)).as_str().to_string()),
            _ => unreachable!("{:?}", item),
        }
    }
    let values = entry?;
    Some(Entry {
        id: EntryId::from(id.as_str()),
        kind: values.kind,
        name: values.name,
        category: values.category,
        amount: values.amount,
        date: values.date,
        status,
        notes,
        schedule: None,
        source_template,
    })
}

/// `kind "name" category amount on date`
fn validate_values(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Values> {
    let mut items = pair.into_inner();
    let (kind, name, category, amount, date) =
        (items.next()?, items.next()?, items.next()?, items.next()?, items.next()?);
    Some(Values {
        kind: match kind.as_str() {
            "income" => Kind::Income,
            "expense" => Kind::Expense,
            _ => unreachable!(),
        },
        name: subrule!(name).as_str().to_string(),
        category: Category(category.as_str().to_string()),
        amount: validate_amount(path, errs, amount)?,
        date: validate_date(path, errs, date)?,
    })
}

fn read_status(s: &str) -> Status {
    match s {
        "paid" => Status::Paid,
        "pending" => Status::Pending,
        "planned" => Status::Planned,
        _ => unreachable!(),
    }
}

fn validate_date(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Date> {
    let loc = (path, pair.as_span());
    match pair.as_str().parse::<Date>() {
        Ok(date) => Some(date),
        Err(e) => {
            errs.make("Invalid date")
                .span(&loc, "provided here")
                .text(format!("{}", e))
                .hint("choose a date that exists")
                .hint(e.fix_hint());
            None
        }
    }
}

/// Numbers that do not fit are errors, out of range ones only make
/// the schedule malformed
fn validate_number<T>(path: &str, errs: &mut error::Record, pair: Pair) -> Option<T>
where
    T: std::str::FromStr,
{
    let loc = (path, pair.as_span());
    match pair.as_str().parse::<T>() {
        Ok(n) => Some(n),
        Err(_) => {
            errs.make("Number too large")
                .span(&loc, "provided here")
                .text(format!("'{}' is out of range", pair.as_str()));
            None
        }
    }
}

/// Exact number of cents, without going through floating point
///
/// The grammar ensures digits with at most two decimals.
fn validate_amount(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Amount> {
    let text = pair.as_str();
    let (units, fraction) = text.split_once('.').unwrap_or((text, ""));
    let cents = fraction
        .chars()
        .chain(std::iter::repeat('0'))
        .take(2)
        .try_fold(0_i64, |acc, c| acc.checked_mul(10)?.checked_add(c.to_digit(10)? as i64));
    let total = units
        .chars()
        .try_fold(0_i64, |acc, c| acc.checked_mul(10)?.checked_add(c.to_digit(10)? as i64))
        .and_then(|units| units.checked_mul(100))
        .zip(cents)
        .and_then(|(units, cents)| units.checked_add(cents));
    if total.is_none() {
        let loc = (path, pair.as_span());
        errs.make("Number too large")
            .span(&loc, "provided here")
            .text(format!("'{}' is out of range", text))
            .hint("amounts are limited to 92233720368547758.07");
    }
    total.map(Amount)
}

/// `every N unit (dom D | dow W | until date | disabled)*`
///
/// The schedule starts on the date of the template.
fn validate_recurrence(
    path: &str,
    errs: &mut error::Record,
    start: Date,
    pair: Pair,
) -> Option<Schedule> {
    let (every, options) = decapitate!(pair);
    let mut every = every.into_inner();
    let (interval, unit) = (every.next()?, every.next()?);
    let interval = validate_number::<i32>(path, errs, interval)?;
    let frequency = match unit.as_str().parse::<Frequency>() {
        Ok(f) => f,
        Err(()) => unreachable!(),
    };
    let mut schedule = Schedule::new(frequency, interval, start);
    for option in options {
        let loc = (path, option.as_span());
        let ignored = match option.as_rule() {
            Rule::day_of_month => {
                schedule.day_of_month = Some(validate_number(path, errs, subrule!(option))?);
                frequency != Frequency::Monthly
            }
            Rule::day_of_week => {
                schedule.day_of_week = Some(validate_number(path, errs, subrule!(option))?);
                frequency != Frequency::Weekly
            }
            Rule::until => {
                schedule.end = Some(validate_date(path, errs, subrule!(option))?);
                false
            }
            Rule::disabled => {
                schedule.enabled = false;
                false
            }
            _ => unreachable!("{:?}", option),
        };
        if ignored {
            errs.make("Unused option")
                .nonfatal()
                .span(&loc, "provided here")
                .text(format!("A schedule repeating every {} does not read this option", frequency))
                .hint("remove it or change the frequency");
        }
    }
    Some(schedule)
}

/// Identifiers are unique across templates and instances
fn check_ids(errs: &mut error::Record, lines: &[(error::Loc, Entry)]) {
    let mut seen: HashMap<&EntryId, &error::Loc> = HashMap::new();
    for (loc, entry) in lines {
        if let Some(first) = seen.get(&entry.id) {
            errs.make("Duplicate identifier")
                .span(loc, format!("'{}' defined again", entry.id))
                .span(first, "first defined here")
                .hint("rename one of them");
        } else {
            seen.insert(&entry.id, loc);
        }
    }
}

/// Instances should point to a template of the same file
fn check_links(errs: &mut error::Record, lines: &[(error::Loc, Entry)]) {
    let templates = lines
        .iter()
        .filter(|(_, e)| e.is_template())
        .map(|(_, e)| &e.id)
        .collect::<Vec<_>>();
    for (loc, entry) in lines {
        if let Some(source) = &entry.source_template {
            if !templates.contains(&source) {
                errs.make("Unknown template")
                    .nonfatal()
                    .span(loc, format!("linked to '{}'", source))
                    .text("No template has this identifier")
                    .hint(format!("declare '{}' with 'template {}: ...'", source, source));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cadence::date::Month::*;

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        };
    }

    macro_rules! load {
        ( $text:expr ) => {{
            let mut errs = error::Record::new();
            let entries = extract("test", &mut errs, $text);
            (entries, errs)
        }};
    }

    const LEDGER: &str = r#"
# monthly rent, second half of the year only
template rent: expense "Rent" housing 1000.00 on 2026-01-15 every 1 month dom 15 until 2026-12-31
template gym: expense "Gym" sport 30 on 2026-01-05 every 2 weeks dow 1 note "downtown"
template pay: income "Salary" work 2500.5 on 2026-01-31 every 1 month disabled

entry r2: expense "Rent" housing 1000.00 on 2026-02-15 paid from rent
entry coffee: expense "Coffee" food 2.40 on 2026-02-16   # unlinked
"#;

    #[test]
    fn full_ledger() {
        let (entries, errs) = load!(LEDGER);
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(entries.len(), 5);
        let rent = &entries[0];
        assert_eq!(rent.id, EntryId::from("rent"));
        assert_eq!(rent.amount, Amount(100000));
        let schedule = rent.schedule.as_ref().unwrap();
        assert_eq!(schedule.frequency, Frequency::Monthly);
        assert_eq!(schedule.start, dt!(2026-Jan-15));
        assert_eq!(schedule.end, Some(dt!(2026-Dec-31)));
        assert_eq!(schedule.day_of_month, Some(15));
        let gym = &entries[1];
        assert_eq!(gym.notes.as_deref(), Some("downtown"));
        assert_eq!(gym.amount, Amount(3000));
        assert_eq!(gym.schedule.as_ref().unwrap().interval, 2);
        assert_eq!(gym.schedule.as_ref().unwrap().day_of_week, Some(1));
        let pay = &entries[2];
        assert_eq!(pay.kind, Kind::Income);
        assert_eq!(pay.amount, Amount(250050));
        assert!(!pay.schedule.as_ref().unwrap().enabled);
        assert!(entries[3].is_linked_to(&EntryId::from("rent")));
        assert_eq!(entries[3].status, Some(Status::Paid));
        assert_eq!(entries[4].status, None);
        assert_eq!(entries[4].source_template, None);
        assert_eq!(entries[4].name, "Coffee");
    }

    #[test]
    fn parse_failure() {
        let (entries, errs) = load!("entry x: expense \"X\" misc on 2026-01-01\n");
        assert!(entries.is_empty());
        assert!(errs.is_fatal());
    }

    #[test]
    fn invalid_date() {
        let (_, errs) = load!("entry x: expense \"X\" misc 1.00 on 2025-02-29\n");
        assert!(errs.is_fatal());
        assert_eq!(errs.count_errors(), 1);
    }

    #[test]
    fn duplicate_id() {
        let (_, errs) = load!(
            "entry x: expense \"X\" misc 1.00 on 2025-02-28\nentry x: expense \"Y\" misc 1.00 on 2025-02-28\n"
        );
        assert!(errs.is_fatal());
    }

    #[test]
    fn exact_amounts() {
        let (entries, errs) = load!(
            r#"entry a: expense "A" misc 12.3 on 2026-01-01
entry b: expense "B" misc 0.07 on 2026-01-01
entry c: income "C" misc 92233720368547758.07 on 2026-01-01"#
        );
        assert!(errs.is_empty(), "{}", errs);
        assert_eq!(entries[0].amount, Amount(1230));
        assert_eq!(entries[1].amount, Amount(7));
        assert_eq!(entries[2].amount, Amount(i64::MAX));
    }

    #[test]
    fn amount_too_large() {
        for text in [
            "entry x: expense \"X\" misc 99999999999999999999 on 2026-01-01\n",
            "entry x: expense \"X\" misc 92233720368547758.08 on 2026-01-01\n",
        ] {
            let (entries, errs) = load!(text);
            assert!(entries.is_empty());
            assert!(errs.is_fatal());
            assert!(errs.to_string().contains("Number too large"));
        }
    }

    #[test]
    fn legacy_recurring() {
        let (entries, errs) = load!(
            "template t: expense \"X\" misc 1.00 on 2025-01-31 recurring note \"old\"\n"
        );
        assert!(errs.is_empty(), "{}", errs);
        let schedule = entries[0].schedule.as_ref().unwrap();
        assert_eq!(schedule, &Schedule::monthly_from(dt!(2025-Jan-31)));
        assert_eq!(schedule.day_of_month, Some(31));
        assert!(schedule.enabled);
        assert_eq!(entries[0].notes.as_deref(), Some("old"));
    }

    #[test]
    fn warnings() {
        let (entries, errs) = load!(
            r#"template bad: expense "X" misc 1.00 on 2026-01-01 every 0 days
template odd: expense "Y" misc 1.00 on 2026-01-01 every 1 week dom 3
entry x: expense "X" misc 1.00 on 2026-01-02 from nowhere"#
        );
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 3);
        assert_eq!(entries.len(), 3);
    }
}
