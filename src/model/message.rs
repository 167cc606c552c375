#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }
}

/// One accumulated log line. Entries are append-only and never mutated.
///
/// `account` is the account that was current when the entry was logged (never
/// reset, so entries logged after the last account still belong to it). `marker`
/// is set only on the per-account banner entry, which opens an account group in
/// the Telegram report without being repeated inside it.
#[derive(Debug, Clone)]
pub struct Entry {
    pub severity: Severity,
    pub account: Option<usize>,
    pub marker: bool,
    pub text: String,
}
