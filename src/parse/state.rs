use crate::diagnostic::{Diagnostic, ErrorCode, Severity};
use crate::flags::{CollisionFlags, ErrorLevel, ParseFlags};
use crate::parse::Action;
use crate::section::Section;
use crate::value::{CommentBlock, Value};
use crate::Config;

/// A key whose value is still being accumulated: its fragments may still
/// grow via line folding, and it has not yet been inserted into a
/// section.
pub(super) struct PendingValue {
    pub(super) key: String,
    pub(super) fragments: Vec<Vec<u8>>,
    pub(super) origin_line: u32,
}

/// How the run will conclude if nothing worse happens before EOF.
///
/// Corresponds to the three values `po->ret` takes on: `0`, `EILSEQ`, and
/// `EIO`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum RunStatus {
    Ok,
    Warnings,
    Errors,
}

/// All of the parser's working state between `Action::Read` and
/// `Action::Done`.
///
/// Corresponds to `struct parser_obj`, with the generic collection-based
/// storage replaced by the crate's typed [`Config`]/[`Section`]/[`Value`],
/// and the action queue replaced by `next`.
pub(super) struct ParserState {
    pub(super) config: Config,
    /// The section currently being built, if a `[header]` has been seen
    /// (or a default section was created for orphan keys).
    pub(super) current_section: Option<Section>,
    pub(super) pending_value: Option<PendingValue>,
    /// Comment lines accumulated since the last value or section header
    /// was completed.
    pub(super) pending_comment: Option<CommentBlock>,
    /// Whether the reader is inside an unterminated `/* ... */` block.
    pub(super) inside_c_comment: bool,

    pub(super) key_line: u32,
    pub(super) sec_line: u32,

    pub(super) error_level: ErrorLevel,
    pub(super) collision_flags: CollisionFlags,
    pub(super) parse_flags: ParseFlags,
    /// The caller's preferred re-emission wrap column, stamped onto every
    /// [`Value`] built during this parse. Corresponds to `po->boundary`.
    pub(super) wrap_boundary: Option<u32>,

    pub(super) last_error: Option<ErrorCode>,
    pub(super) error_line: u32,
    pub(super) status: RunStatus,
    /// A duplicate recorded under a `Detect` policy, surfaced only if
    /// nothing worse happens by the time parsing ends.
    pub(super) merge_error: Option<ErrorCode>,
    pub(super) next: Action,
}

impl ParserState {
    pub(super) fn new(
        error_level: ErrorLevel,
        collision_flags: CollisionFlags,
        parse_flags: ParseFlags,
        wrap_boundary: Option<u32>,
    ) -> Self {
        ParserState {
            config: Config::new(),
            current_section: None,
            pending_value: None,
            pending_comment: None,
            inside_c_comment: false,
            key_line: 0,
            sec_line: 0,
            error_level,
            collision_flags,
            parse_flags,
            wrap_boundary,
            last_error: None,
            error_line: 0,
            status: RunStatus::Ok,
            merge_error: None,
            next: Action::Read,
        }
    }

    pub(super) fn take_pending_comment(&mut self) -> Option<CommentBlock> {
        self.pending_comment.take()
    }

    pub(super) fn push_comment_line(&mut self, line: &[u8]) {
        self.pending_comment
            .get_or_insert_with(CommentBlock::new)
            .push_line(line);
    }

    /// Records a diagnostic and sets it up to be dispatched by
    /// `Action::Error`, which consults `error_level` to decide whether to
    /// keep reading or stop. Corresponds to setting `po->last_error` and
    /// enqueueing `PARSE_ERROR`.
    pub(super) fn fail(&mut self, line: u32, error: ErrorCode) {
        self.last_error = Some(error);
        self.error_line = line;
        self.next = Action::Error;
    }

    /// Attaches whatever comment has been accumulated to a just-finished
    /// [`Value`], consuming it.
    pub(super) fn attach_pending_comment(&mut self, value: &mut Value) {
        if let Some(comment) = self.take_pending_comment() {
            value.set_comment(comment);
        }
    }

    pub(super) fn push_diagnostic(&mut self, line: u32, code: ErrorCode, severity: Severity) {
        self.config.push_diagnostic(Diagnostic::new(line, code, severity));
    }
}
