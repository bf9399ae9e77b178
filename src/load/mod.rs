//! Reading a ledger file

pub mod error;
pub mod parse;

use cadence::entry::Entry;

/// Entries of `filename`, `None` if any fatal error was recorded
pub fn read_entries(filename: &str, errs: &mut error::Record) -> Option<Vec<Entry>> {
    let contents = match std::fs::read_to_string(filename) {
        Ok(contents) => contents,
        Err(e) => {
            errs.make("File not found")
                .text(format!("Could not read '{}': {}", filename, e))
                .hint("check the path of the ledger file");
            return None;
        }
    };
    let entries = parse::extract(filename, errs, &contents);
    log::info!("{} entries loaded from '{}'", entries.len(), filename);
    if errs.is_fatal() {
        None
    } else {
        Some(entries)
    }
}

/// Line of the ledger file describing `entry`
pub fn format_entry(entry: &Entry) -> String {
    let mut line = format!(
        "{} {}: {} \"{}\" {} {} on {}",
        if entry.is_template() { "template" } else { "entry" },
        entry.id,
        entry.kind,
        entry.name,
        entry.category,
        entry.amount,
        entry.date,
    );
    if let Some(schedule) = &entry.schedule {
        line.push_str(&format!(" every {} {}", schedule.interval, schedule.frequency));
        if let Some(d) = schedule.day_of_month {
            line.push_str(&format!(" dom {}", d));
        }
        if let Some(d) = schedule.day_of_week {
            line.push_str(&format!(" dow {}", d));
        }
        if let Some(end) = schedule.end {
            line.push_str(&format!(" until {}", end));
        }
        if !schedule.enabled {
            line.push_str(" disabled");
        }
    }
    if let Some(status) = entry.status {
        line.push_str(&format!(" {}", status));
    }
    if let Some(source) = &entry.source_template {
        line.push_str(&format!(" from {}", source));
    }
    if let Some(notes) = &entry.notes {
        line.push_str(&format!(" note \"{}\"", notes));
    }
    line
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn written_lines_read_back() {
        let text = r#"template rent: expense "Rent" housing 1000.00 on 2026-01-15 every 1 month dom 15 until 2026-12-31 disabled note "flat"
entry r2: income "Refund" misc 12.30 on 2026-02-15 pending from rent
"#;
        let mut errs = error::Record::new();
        let entries = parse::extract("test", &mut errs, text);
        assert!(errs.is_empty(), "{}", errs);
        let written = entries.iter().map(format_entry).collect::<Vec<_>>();
        assert_eq!(written.join("\n") + "\n", text);
    }
}
