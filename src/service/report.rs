use crossterm::style::Stylize;
use json::JsonValue;

use crate::model::{
    game::Game,
    message::{Entry, Severity},
};

const MSG_DELIMITER: char = ':';

/// Ordered accumulator for every log line produced by a run. Each entry is
/// mirrored to the live console the moment it is pushed; the stored list is
/// what the notifiers render after all check-ins are done.
pub struct Report {
    entries: Vec<Entry>,
    has_errors: bool,
    current_account: Option<usize>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            has_errors: false,
            current_account: None,
        }
    }

    /// Marks the start of an account (1-based) and logs its banner entry.
    /// All entries logged afterwards are tagged with this account.
    pub fn begin_account(&mut self, index: usize) {
        self.current_account = Some(index);
        self.push(
            Severity::Info,
            format!("-- CHECKING IN FOR ACCOUNT {} --", index),
            true,
        );
    }

    pub fn log(&mut self, severity: Severity, text: impl Into<String>) {
        self.push(severity, text.into(), false);
    }

    /// Game-labeled entry: the code is uppercased and suffixed with the delimiter.
    pub fn log_game(&mut self, severity: Severity, game: Game, text: &str) {
        self.push(severity, format!("{}{} {}", game.label(), MSG_DELIMITER, text), false);
    }

    fn push(&mut self, severity: Severity, text: String, marker: bool) {
        echo(severity, &text);

        // debug entries are stored but never flip the error flag
        if severity == Severity::Error {
            self.has_errors = true;
        }

        self.entries.push(Entry {
            severity,
            account: self.current_account,
            marker,
            text,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }
}

// Live console mirror, warn/error on stderr like the usual console streams.
fn echo(severity: Severity, text: &str) {
    match severity {
        Severity::Debug => println!("{}", text.dark_grey()),
        Severity::Info => println!("{}", text),
        Severity::Warn => eprintln!("{}", text.yellow()),
        Severity::Error => eprintln!("{}", text.red()),
    }
}

/// Pretty-prints a JSON value for a log entry, stripping one enclosing quote
/// character from each end so bare strings read as plain text.
pub fn render_json(value: &JsonValue) -> String {
    let pretty = value.pretty(2);
    let stripped = pretty.strip_prefix('"').unwrap_or(&pretty);
    let stripped = stripped.strip_suffix('"').unwrap_or(stripped);
    stripped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_entries_are_labeled() {
        let mut report = Report::new();
        report.log_game(Severity::Info, Game::Gi, "Successfully checked in!");
        assert_eq!(report.entries()[0].text, "GI: Successfully checked in!");
    }

    #[test]
    fn only_errors_flip_the_flag() {
        let mut report = Report::new();
        report.log(Severity::Debug, "noise");
        report.log(Severity::Info, "fine");
        report.log(Severity::Warn, "hm");
        assert!(!report.has_errors());

        report.log(Severity::Error, "broken");
        assert!(report.has_errors());

        report.log(Severity::Info, "still fine");
        assert!(report.has_errors());
    }

    #[test]
    fn debug_entries_are_stored() {
        let mut report = Report::new();
        report.log(Severity::Debug, "detail");
        assert_eq!(report.entries().len(), 1);
        assert_eq!(report.entries()[0].severity, Severity::Debug);
    }

    #[test]
    fn entries_carry_the_current_account() {
        let mut report = Report::new();
        report.log(Severity::Info, "before any account");
        report.begin_account(1);
        report.log(Severity::Info, "first");
        report.begin_account(2);
        report.log(Severity::Error, "second");

        let entries = report.entries();
        assert_eq!(entries[0].account, None);
        assert!(entries[1].marker);
        assert_eq!(entries[1].account, Some(1));
        assert_eq!(entries[2].account, Some(1));
        assert_eq!(entries[4].account, Some(2));
        assert!(!entries[4].marker);
    }

    #[test]
    fn render_json_strips_enclosing_quotes() {
        assert_eq!(render_json(&JsonValue::from("hello")), "hello");
        let object = json::object! { retcode: 0 };
        assert_eq!(render_json(&object), "{\n  \"retcode\": 0\n}");
    }
}
