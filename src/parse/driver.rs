use std::io::BufRead;

use crate::config::Config;
use crate::diagnostic::{Diagnostic, ErrorCode};
use crate::flags::{CollisionFlags, ErrorLevel, InvalidCollisionFlags, ParseFlags};
use crate::parse::classify::inspect;
use crate::parse::collision::{close_current_section, finish_pending_value};
use crate::parse::input::{LineSource, ReadLine};
use crate::parse::state::{ParserState, RunStatus};
use crate::parse::Action;

/// How a parse run concluded.
///
/// Corresponds to the `0` / `EILSEQ` / `EEXIST` / `EIO` family returned
/// from `ini_config_parse`, split into one variant per case so a caller
/// can match exhaustively instead of comparing error codes.
#[derive(Debug)]
pub enum ParseOutcome {
    /// No diagnostics at all.
    Ok(Config),
    /// At least one warning-severity diagnostic, nothing worse.
    Warnings(Config),
    /// A `Detect`-policy collision was recorded and nothing worse
    /// happened; the collision was still resolved (the duplicate data
    /// kept), this only flags that it occurred.
    DuplicateDetected(Config),
    /// Parsing stopped on an error-severity diagnostic or an
    /// `Error`-policy collision. No config tree is returned — only the
    /// diagnostics accumulated up to the point of failure.
    Fatal(Vec<Diagnostic>),
}

/// Parses a complete INI stream.
///
/// Corresponds to `ini_config_parse`/`parser_run`. `collision_flags` is
/// validated before anything is read; all other failure modes are
/// reported through the returned [`ParseOutcome`] rather than this
/// function's `Result`, since they are ordinary parse-level conditions
/// here, not infrastructure failures.
///
/// `wrap_boundary` is the caller's preferred re-emission wrap column,
/// stamped onto every [`Value`](crate::Value) built during this parse.
/// It corresponds to `co->boundary`, which the source copies onto the
/// parser from the target config object before parsing begins; since
/// this crate builds a fresh [`Config`] per call instead of parsing into
/// a caller-supplied one, the setting is passed in directly instead.
pub fn parse<R: BufRead>(
    input: R,
    error_level: ErrorLevel,
    collision_flags: CollisionFlags,
    parse_flags: ParseFlags,
    wrap_boundary: Option<u32>,
) -> Result<ParseOutcome, InvalidCollisionFlags> {
    collision_flags.validate()?;

    let mut source = LineSource::new(input);
    let mut state = ParserState::new(error_level, collision_flags, parse_flags, wrap_boundary);
    let mut line_buf: Vec<u8> = Vec::new();

    loop {
        match state.next {
            Action::Read => run_read(&mut state, &mut source, &mut line_buf),
            Action::Inspect => {
                state.next = inspect(&mut state, source.line, &line_buf);
            }
            Action::Post => {
                state.next = run_post(&mut state);
            }
            Action::Error => {
                state.next = run_error(&mut state);
            }
            Action::Done => break,
        }
    }

    Ok(match state.status {
        RunStatus::Errors => ParseOutcome::Fatal(state.config.diagnostics().to_vec()),
        RunStatus::Warnings => ParseOutcome::Warnings(state.config),
        RunStatus::Ok if state.merge_error.is_some() => ParseOutcome::DuplicateDetected(state.config),
        RunStatus::Ok => ParseOutcome::Ok(state.config),
    })
}

/// Corresponds to `parser_read`.
fn run_read<R: BufRead>(state: &mut ParserState, source: &mut LineSource<R>, line_buf: &mut Vec<u8>) {
    match source.read_line() {
        Ok(ReadLine::Line(line)) => {
            *line_buf = line;
            state.next = Action::Inspect;
        }
        Ok(ReadLine::Eof) => {
            if state.inside_c_comment {
                state.fail(source.line, ErrorCode::BadComment);
            } else {
                state.next = Action::Post;
            }
        }
        Ok(ReadLine::TooLong) => {
            state.fail(source.line, ErrorCode::LongData);
        }
        Err(_) => {
            state.fail(source.line, ErrorCode::Read);
        }
    }
}

/// Corresponds to `parser_post`.
fn run_post(state: &mut ParserState) -> Action {
    if let Some(pending) = state.pending_value.take() {
        if finish_pending_value(state, pending).is_break() {
            return Action::Done;
        }
    } else if let Some(comment) = state.take_pending_comment() {
        state.config.set_trailing_comment(comment);
    }
    if close_current_section(state).is_break() {
        return Action::Done;
    }
    Action::Done
}

/// Corresponds to `parser_error`.
fn run_error(state: &mut ParserState) -> Action {
    let code = state.last_error.take().expect("Action::Error requires last_error to be set");
    let severity = code.default_severity();
    let line = state.error_line;
    state.push_diagnostic(line, code, severity);
    state.status = state.status.max(match severity {
        crate::diagnostic::Severity::Error => RunStatus::Errors,
        crate::diagnostic::Severity::Warning => RunStatus::Warnings,
    });

    // Avoid an infinite loop: a stream that keeps failing to read, or
    // that ends inside an unterminated comment, can never make forward
    // progress by reading again.
    if matches!(code, ErrorCode::BadComment | ErrorCode::Read) {
        return Action::Done;
    }

    match (state.error_level, severity) {
        (ErrorLevel::StopOnAny, _) => Action::Done,
        (ErrorLevel::StopOnError, crate::diagnostic::Severity::Error) => Action::Done,
        (ErrorLevel::StopOnError, crate::diagnostic::Severity::Warning) => Action::Read,
        (ErrorLevel::StopOnNone, _) => Action::Read,
    }
}
