//! Diagnostics for the ledger file
//!
//! Wraps `pest::error::Error::new_from_span` for the code excerpts and
//! adds aggregation and colors on top.
//!
//! ```txt
//! --> Warning: Unknown template
//!  |     --> ledger.txt:7:54
//!  |      |
//!  |    7 | entry g1: expense "Gym" sport 30.00 on 2026-01-12 from gym
//!  |      |                                                    ^------^
//!  |      |
//!  |      = linked to 'gym'
//!  |  No template has this identifier
//!  |      ? hint: declare 'gym' with 'template gym: ...'
//! ```

use std::fmt;

use crate::load::parse::Rule;

/// File and span within that file
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single problem
///
/// Every message (the label, texts and hints) should fit on one line,
/// use several `text` or `hint` for more.
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// error (red) or warning (yellow)
    fatal: bool,
    label: String,
    items: Vec<Item>,
}

#[derive(Debug)]
enum Item {
    /// excerpt of the file
    Block(Box<pest::error::Error<Rule>>),
    Text(String),
    Hint(String),
}

/// All problems found while loading and checking one ledger
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    /// fatal errors among `contents[..contents.len() - 1]`
    fatal: usize,
    contents: Vec<Error>,
}

impl Error {
    fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Take over a parsing failure
    pub fn from(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items.push(Item::Block(Box::new(err.renamed_rules(rule_rename))));
        self
    }

    /// Downgrade to a warning
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Block(Box::new(
            pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: msg.to_string(),
                },
                loc.1.clone(),
            )
            .with_path(loc.0),
        )));
        self
    }

    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    /// How to fix
    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal > 0 || self.last_is_fatal()
    }

    fn last_is_fatal(&self) -> bool {
        self.contents.last().map_or(false, |e| e.fatal)
    }

    pub fn count_errors(&self) -> usize {
        self.fatal + usize::from(self.last_is_fatal())
    }

    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Open a new report, fatal unless marked otherwise
    pub fn make<S>(&mut self, msg: S) -> &mut Error
    where
        S: ToString,
    {
        if self.last_is_fatal() {
            self.fatal += 1;
        }
        self.contents.push(Error::new(msg));
        let last = self.contents.len() - 1;
        &mut self.contents[last]
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, header) = if self.fatal {
            (RED, "--> Error")
        } else {
            (YELLOW, "--> Warning")
        };
        writeln!(f, "{}{}:{} {}{}", color, header, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(err) => {
                    // re-indent the excerpt under the report's margin
                    let mut align = "   ".to_string();
                    let mut align_found = false;
                    for line in err.to_string().split('\n') {
                        write!(f, " {}|{}  {}", color, if align_found { &align } else { "" }, BLUE)?;
                        for c in line.chars() {
                            match c {
                                '-' if !align_found => {
                                    align_found = true;
                                    write!(f, "{}-", align)?;
                                }
                                ' ' if !align_found => {
                                    align.pop();
                                    write!(f, " ")?;
                                }
                                '|' => write!(f, "|{}", NONE)?,
                                '=' => write!(f, "={}", NONE)?,
                                '^' => write!(f, "{}^", color)?,
                                '␊' => (),
                                _ => write!(f, "{}", c)?,
                            }
                        }
                        writeln!(f)?;
                    }
                }
                Item::Text(txt) => writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?,
                Item::Hint(txt) => writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        // only the most severe kind is shown
        let fatal = self.is_fatal();
        let count = if fatal {
            self.count_errors()
        } else {
            self.count_warnings()
        };
        let color = if fatal { RED } else { YELLOW };
        let trunc = 10;
        for err in self.contents.iter().filter(|err| err.fatal == fatal).take(trunc) {
            writeln!(f, "{}", err)?;
        }
        if count > trunc {
            writeln!(f, "{} And {} more.", color, count - trunc)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        let (kind, what) = if fatal {
            ("Fatal", "error")
        } else {
            ("Nonfatal", "warning")
        };
        writeln!(f, "{}{}: {}{} {}{} emitted{}", color, kind, WHITE, count, what, plural, NONE)
    }
}

fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "end of file",
        Rule::number => "a number",
        Rule::identifier => "an identifier composed of a..zA..Z0..9-_",
        Rule::string => "a string of non-'\"' characters",
        Rule::quoted => "a name ('\"Rent\"')",
        Rule::money_amount => "an amount ('XXX.XX')",
        Rule::date => "a date YYYY-MM-DD",
        Rule::kind => "'income' or 'expense'",
        Rule::status => "one of 'paid', 'pending', 'planned'",
        Rule::frequency => "one of 'day', 'week', 'month', 'year'",
        Rule::values => "kind, name, category, amount and date",
        Rule::every => "a recurrence 'every N month'",
        Rule::day_of_month => "a day of the month 'dom D'",
        Rule::day_of_week => "a day of the week 'dow W'",
        Rule::until => "an end date 'until YYYY-MM-DD'",
        Rule::disabled => "the 'disabled' marker",
        Rule::recurrence => "a recurrence and its options",
        Rule::legacy => "the 'recurring' marker",
        Rule::source => "a link to a template 'from ID'",
        Rule::note => "a note 'note \"...\"'",
        Rule::template_line => "a template 'template ID: ...'",
        Rule::entry_line => "an entry 'entry ID: ...'",
        _ => "a newline",
    })
}
