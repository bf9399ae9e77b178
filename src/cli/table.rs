//! Box-drawn tables for the terminal

use std::fmt;

/// Rows of cells under a header line
pub struct Table {
    title: Option<String>,
    columns: Vec<ColFmt>,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    right: bool,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

impl Table {
    pub fn with_columns(labels: &[&str]) -> Self {
        Self {
            title: None,
            columns: labels
                .iter()
                .map(|l| ColFmt::with_label(BoxFmt::from(l.to_string())))
                .collect(),
        }
    }

    pub fn with_title<S: ToString>(mut self, title: S) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Align the contents of column `idx` (e.g. amounts) to the right
    pub fn right_align(mut self, idx: usize) -> Self {
        if let Some(c) = self.columns.get_mut(idx) {
            c.right = true;
        }
        self
    }

    /// Missing cells are left blank, extra ones are dropped
    pub fn push(&mut self, cells: Vec<String>) {
        let mut cells = cells.into_iter();
        for c in &mut self.columns {
            c.push(BoxFmt::from(cells.next().unwrap_or_default()));
        }
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, ColFmt::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }

    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let pad = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", pad, self.text)
        } else {
            write!(f, " {}{} ", self.text, pad)
        }
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt) -> Self {
        Self {
            width: label.width,
            right: false,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn write_label(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.label.write(f, self.width, false)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize) -> fmt::Result {
        self.boxes[idx].write(f, self.width, self.right)
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

impl Table {
    /// One horizontal border, `joins` is (left, middle, right)
    fn border(&self, f: &mut fmt::Formatter, joins: (&str, &str, &str)) -> fmt::Result {
        write!(f, "{}", joins.0)?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", joins.1)?;
            }
            c.hline(f)?;
        }
        writeln!(f, "{}", joins.2)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "{}", title)?;
        }
        self.border(f, (ULCORNER, LOJOIN, URCORNER))?;
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f)?;
        }
        writeln!(f, "{}", VLINE)?;
        self.border(f, (RTJOIN, CROSS, LTJOIN))?;
        for idx in 0..self.len() {
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        self.border(f, (DLCORNER, HIJOIN, DRCORNER))
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout() {
        let mut table = Table::with_columns(&["Date", "Amount"]).right_align(1);
        table.push(vec!["2026-01-15".to_string(), "1000.00".to_string()]);
        table.push(vec!["2026-02-15".to_string(), "5.00".to_string()]);
        let shown = table.to_string();
        let lines = shown.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "┌────────────┬─────────┐");
        assert_eq!(lines[1], "│ Date       │ Amount  │");
        assert_eq!(lines[3], "│ 2026-01-15 │ 1000.00 │");
        assert_eq!(lines[4], "│ 2026-02-15 │    5.00 │");
        assert_eq!(lines[5], "└────────────┴─────────┘");
    }

    #[test]
    fn ragged_rows() {
        let mut table = Table::with_columns(&["A", "B"]).with_title("Title");
        assert!(table.is_empty());
        table.push(vec!["x".to_string()]);
        table.push(vec!["y".to_string(), "z".to_string(), "dropped".to_string()]);
        assert_eq!(table.len(), 2);
        let shown = table.to_string();
        assert!(shown.starts_with("Title\n"));
        assert!(!shown.contains("dropped"));
    }
}
