use std::fmt::{self, Debug, Display, Formatter};

use thiserror::Error;

/// A single parse-level problem found while reading an INI stream.
///
/// Diagnostics are accumulated rather than returned eagerly: parsing
/// continues or stops afterward according to the configured
/// [`ErrorLevel`](crate::ErrorLevel).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// The 1-based line on which the problem was found.
    pub line: u32,
    /// What went wrong.
    pub code: ErrorCode,
    /// Whether this diagnostic is fatal under the active error level.
    pub severity: Severity,
}

impl Diagnostic {
    pub(crate) fn new(line: u32, code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            line,
            code,
            severity,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: line {}: {}", self.severity, self.line, self.code)
    }
}

/// The severity of a [`Diagnostic`].
///
/// This is a dedicated field rather than a bit smuggled into the error
/// code, unlike the `0xA0000000` warning bit used on the wire by the
/// system this crate's behavior is grounded on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        })
    }
}

/// A kind of problem encountered while parsing a line of an INI stream.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A physical line was longer than the configured buffer size.
    #[error("line is too long")]
    LongData,
    /// A section header line had no closing `]`.
    #[error("section is missing a closing bracket")]
    NoCloseSec,
    /// A section header's brackets contained only whitespace.
    #[error("section name is empty")]
    NoSection,
    /// A section name exceeded the maximum key length.
    #[error("section name is too long")]
    SectionLong,
    /// A key-value line had no `=`.
    #[error("line has no '=' separator")]
    NoEqual,
    /// A key-value line's `=` was the first character.
    #[error("line has no key before '='")]
    NoKey,
    /// A key's name exceeded the maximum key length.
    #[error("key name is too long")]
    LongKey,
    /// Reading from the underlying stream failed.
    #[error("error reading input")]
    Read,
    /// A non-empty line began with whitespace but had no key to fold into,
    /// or a leading space was rejected by `no_space`.
    #[error("unexpected leading whitespace")]
    Space,
    /// A leading tab was rejected by `no_tab`.
    #[error("leading tab is not allowed")]
    Tab,
    /// A leading form-feed or vertical-tab character is never allowed.
    #[error("special whitespace character is not allowed")]
    Special,
    /// A key was repeated within one textual section.
    #[error("duplicate key in section")]
    DupKey,
    /// A key collided while merging a repeated section into the original.
    #[error("duplicate key while merging section")]
    DupKeySec,
    /// A section name was repeated.
    #[error("duplicate section")]
    DupSection,
    /// A C-style block comment `/* ... */` was not closed before EOF.
    #[error("unterminated block comment")]
    BadComment,
}

impl ErrorCode {
    /// The severity a code carries absent an explicit override.
    ///
    /// The system this crate's behavior is grounded on bakes severity into
    /// each numeric error constant rather than setting it per occurrence
    /// (the driver itself never ORs in the warning bit; every `save_error`
    /// call site passes a literal error-vs-warning label). Lacking that
    /// header's constant table, leading-whitespace strictness violations
    /// (`Space`, `Tab`, `Special`) are treated as warnings — a line shape
    /// the caller can tighten via flags, not a structural defect — and
    /// everything else as an error.
    pub(crate) fn default_severity(self) -> Severity {
        match self {
            ErrorCode::Space | ErrorCode::Tab | ErrorCode::Special => Severity::Warning,
            _ => Severity::Error,
        }
    }
}
