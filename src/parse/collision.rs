use std::ops::ControlFlow;

use crate::config::DEFAULT_SECTION;
use crate::diagnostic::{ErrorCode, Severity};
use crate::flags::{SectionPolicy, ValuePolicy};
use crate::parse::state::{ParserState, PendingValue, RunStatus};
use crate::section::Section;
use crate::value::Value;

/// `ControlFlow::Break` means a collision under an `Error` policy was hit:
/// a diagnostic has already been recorded and the caller must stop
/// parsing immediately (`Action::Done`), bypassing `error_level` entirely.
///
/// This mirrors the source this crate's behavior is grounded on, where a
/// collision resolved under `*_ERROR` returns `EEXIST` directly from
/// `complete_value_processing`/`parser_save_section`, propagating as a
/// hard function-call failure rather than going through
/// `parser_error`/`PARSE_ERROR`'s `error_level`-sensitive dispatch — so a
/// `MV1S_ERROR`/`MS_ERROR` collision always aborts, even under
/// `StopOnNone`.
type Collision = ControlFlow<()>;

/// Builds a [`Value`] from a completed pending key and inserts it into the
/// current section (creating the default section first if none is open),
/// using the `value_within_section` policy.
///
/// Corresponds to `complete_value_processing` in non-merge mode.
pub(super) fn finish_pending_value(state: &mut ParserState, pending: PendingValue) -> Collision {
    let PendingValue {
        key,
        mut fragments,
        origin_line,
    } = pending;
    let first = fragments.remove(0);
    let mut value = Value::new(key.clone(), first, origin_line, state.wrap_boundary);
    for fragment in fragments {
        value.push_fragment(fragment);
    }
    state.attach_pending_comment(&mut value);

    if state.current_section.is_none() {
        state.current_section = Some(Section::new(DEFAULT_SECTION.to_string()));
    }
    let policy = state.collision_flags.value_within_section;
    let result = {
        let section = state.current_section.as_mut().unwrap();
        insert_value(section, key, value, policy)
    };
    resolve(state, result, ErrorCode::DupKey, origin_line)
}

/// Closes the in-flight section, if any: resolves a name collision
/// against the config tree (if the name is already taken) or embeds it
/// directly, then clears `current_section`.
///
/// Corresponds to `parser_save_section`.
pub(super) fn close_current_section(state: &mut ParserState) -> Collision {
    let Some(section) = state.current_section.take() else {
        return ControlFlow::Continue(());
    };

    if !state.config.contains_section(section.name()) {
        state.config.embed_section(section);
        return ControlFlow::Continue(());
    }

    match state.collision_flags.section {
        SectionPolicy::Error => {
            state.push_diagnostic(state.sec_line, ErrorCode::DupSection, Severity::Error);
            state.status = RunStatus::Errors;
            ControlFlow::Break(())
        }
        SectionPolicy::Preserve => ControlFlow::Continue(()),
        SectionPolicy::Overwrite => {
            state.config.get_mut(section.name()).unwrap().clear_entries();
            merge_section(state, section)
        }
        SectionPolicy::Detect => {
            state.merge_error = Some(ErrorCode::DupSection);
            state.push_diagnostic(state.sec_line, ErrorCode::DupSection, Severity::Error);
            merge_section(state, section)
        }
        SectionPolicy::Merge => merge_section(state, section),
    }
}

/// Merges `incoming`'s entries into the config's existing section of the
/// same name, using the `value_across_sections` policy. The diagnostic
/// line for any collision is the incoming section's own header line
/// (`state.sec_line`), matching the source's `merging ? po->seclinenum :
/// po->keylinenum` choice.
///
/// Corresponds to `merge_section`.
fn merge_section(state: &mut ParserState, incoming: Section) -> Collision {
    let policy = state.collision_flags.value_across_sections;
    let diag_line = state.sec_line;
    let name = incoming.name().to_string();
    for (key, value) in incoming.into_entries() {
        let result = {
            let target = state.config.get_mut(&name).unwrap();
            insert_value(target, key, value, policy)
        };
        if let ControlFlow::Break(()) = resolve(state, result, ErrorCode::DupKeySec, diag_line) {
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

/// What happened when inserting a key into a section under some
/// [`ValuePolicy`].
enum Inserted {
    /// No collision, or one silently absorbed by the policy (`Preserve`,
    /// `Overwrite`, `Allow`).
    Ok,
    /// A duplicate was found under `Detect`: the value was still
    /// inserted, but the caller must record a deferred collision.
    Detected,
    /// A duplicate was found under `Error`: nothing was inserted.
    Rejected,
}

/// The per-key insertion algorithm, shared by the first-pass
/// (`value_within_section`) and merge-pass (`value_across_sections`)
/// collision dimensions.
///
/// Corresponds to `complete_value_processing`'s `mergemode` switch.
fn insert_value(section: &mut Section, key: String, value: Value, policy: ValuePolicy) -> Inserted {
    match policy {
        ValuePolicy::Error => {
            if section.try_insert(key, value) {
                Inserted::Ok
            } else {
                Inserted::Rejected
            }
        }
        ValuePolicy::Preserve => {
            section.try_insert(key, value);
            Inserted::Ok
        }
        ValuePolicy::Allow => {
            section.insert_allow(key, value);
            Inserted::Ok
        }
        ValuePolicy::Overwrite => {
            section.insert_overwrite(key, value);
            Inserted::Ok
        }
        ValuePolicy::Detect => {
            let collided = section.contains_key(&key);
            section.insert_allow(key, value);
            if collided {
                Inserted::Detected
            } else {
                Inserted::Ok
            }
        }
    }
}

/// Translates an [`Inserted`] outcome into a diagnostic (if any) and a
/// [`Collision`] signal.
fn resolve(state: &mut ParserState, result: Inserted, dup_code: ErrorCode, diag_line: u32) -> Collision {
    match result {
        Inserted::Ok => ControlFlow::Continue(()),
        Inserted::Detected => {
            state.merge_error = Some(dup_code);
            state.push_diagnostic(diag_line, dup_code, Severity::Error);
            ControlFlow::Continue(())
        }
        Inserted::Rejected => {
            state.push_diagnostic(diag_line, dup_code, Severity::Error);
            state.status = RunStatus::Errors;
            ControlFlow::Break(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{CollisionFlags, ErrorLevel, ParseFlags};

    fn state_with(collision_flags: CollisionFlags) -> ParserState {
        ParserState::new(ErrorLevel::StopOnNone, collision_flags, ParseFlags::default(), None)
    }

    fn pending(key: &str, value: &str, line: u32) -> PendingValue {
        PendingValue {
            key: key.to_string(),
            fragments: vec![value.as_bytes().to_vec()],
            origin_line: line,
        }
    }

    #[test]
    fn first_value_creates_default_section() {
        let mut st = state_with(CollisionFlags::merge_all());
        assert!(finish_pending_value(&mut st, pending("k", "1", 1)).is_continue());
        assert_eq!(st.current_section.as_ref().unwrap().name(), DEFAULT_SECTION);
    }

    #[test]
    fn duplicate_key_under_error_breaks() {
        let mut flags = CollisionFlags::merge_all();
        flags.value_within_section = ValuePolicy::Error;
        let mut st = state_with(flags);
        assert!(finish_pending_value(&mut st, pending("k", "1", 1)).is_continue());
        assert!(finish_pending_value(&mut st, pending("k", "2", 2)).is_break());
        assert_eq!(st.config.diagnostics().len(), 1);
        assert_eq!(st.config.diagnostics()[0].code, ErrorCode::DupKey);
    }

    #[test]
    fn duplicate_key_under_preserve_keeps_first() {
        let mut flags = CollisionFlags::merge_all();
        flags.value_within_section = ValuePolicy::Preserve;
        let mut st = state_with(flags);
        finish_pending_value(&mut st, pending("k", "1", 1));
        finish_pending_value(&mut st, pending("k", "2", 2));
        let section = st.current_section.as_ref().unwrap();
        assert_eq!(section.get("k").unwrap().as_bytes(), b"1");
        assert_eq!(section.len(), 1);
    }

    #[test]
    fn section_collision_error_breaks_with_only_first_section_kept() {
        let mut flags = CollisionFlags::merge_all();
        flags.section = SectionPolicy::Error;
        let mut st = state_with(flags);
        st.current_section = Some(Section::new("a".into()));
        st.sec_line = 1;
        assert!(close_current_section(&mut st).is_continue());
        st.current_section = Some(Section::new("a".into()));
        st.sec_line = 3;
        assert!(close_current_section(&mut st).is_break());
        assert_eq!(st.config.len(), 1);
        assert_eq!(st.config.diagnostics()[0].line, 3);
    }

    #[test]
    fn section_overwrite_replaces_contents() {
        let mut flags = CollisionFlags::merge_all();
        flags.section = SectionPolicy::Overwrite;
        let mut st = state_with(flags);
        let mut first = Section::new("a".into());
        first.insert_allow("k".into(), Value::new("k".into(), b"1".to_vec(), 1, None));
        st.current_section = Some(first);
        st.sec_line = 1;
        close_current_section(&mut st);

        let mut second = Section::new("a".into());
        second.insert_allow("j".into(), Value::new("j".into(), b"2".to_vec(), 3, None));
        st.current_section = Some(second);
        st.sec_line = 3;
        close_current_section(&mut st);

        let merged = st.config.get("a").unwrap();
        assert!(merged.get("k").is_none());
        assert_eq!(merged.get("j").unwrap().as_bytes(), b"2");
    }
}
