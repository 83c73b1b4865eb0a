use enumflags2::{bitflags, BitFlags};

/// How aggressively parsing stops after encountering a problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorLevel {
    /// Stop at the first error *or* warning.
    StopOnAny,
    /// Stop at the first error, but keep going through warnings.
    StopOnError,
    /// Never stop; accumulate every diagnostic and parse to EOF.
    StopOnNone,
}

/// Line-shape options that loosen or tighten the grammar.
///
/// Corresponds to `INI_PARSE_NOWRAP` / `INI_PARSE_NOSPACE` /
/// `INI_PARSE_NOTAB` / `INI_PARSE_NO_C_COMMENTS`.
#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseFlag {
    /// Disable line folding: a leading-whitespace line is never treated as
    /// a continuation of the previous value.
    NoWrap,
    /// Reject lines with a leading space (only meaningful when folding is
    /// disabled).
    NoSpace,
    /// Reject lines with a leading tab (only meaningful when folding is
    /// disabled).
    NoTab,
    /// Disable `//` and `/* ... */` comments; only `;` and `#` introduce a
    /// comment.
    NoCComments,
}

/// The set of active [`ParseFlag`]s for one parse.
pub type ParseFlags = BitFlags<ParseFlag>;

/// The policy for a repeated `[section]` header.
///
/// Corresponds to `INI_MS_*`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionPolicy {
    /// Report the duplicate and stop (subject to [`ErrorLevel`]).
    Error,
    /// Keep the first occurrence; drop the new section entirely.
    Preserve,
    /// Empty the existing section, then merge the new one into it.
    Overwrite,
    /// Record a diagnostic and surface `EEXIST` at the end of parsing if
    /// nothing worse happened, then merge the new section into the
    /// existing one.
    Detect,
    /// Merge the new section's keys into the existing one. The default.
    Merge,
}

/// The policy for a repeated key, shared by within-section collisions
/// (`INI_MV1S_*`) and collisions produced while merging a repeated section
/// into the original (`INI_MV2S_*`).
///
/// Corresponds to `INI_MV1S_*` / `INI_MV2S_*`. Numerically, those two
/// bitmasks satisfy `MV2S / MV1S == 1` in the source, meaning both drive
/// the same per-key insertion routine; here they share this one type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValuePolicy {
    /// Report the duplicate and stop (subject to [`ErrorLevel`]).
    Error,
    /// Keep the first occurrence, silently drop the rest.
    Preserve,
    /// Keep every occurrence, in textual order.
    Allow,
    /// Keep only the last occurrence.
    Overwrite,
    /// Record a diagnostic and surface `EEXIST` at the end of parsing if
    /// nothing worse happened, but keep every occurrence.
    Detect,
}

/// The three orthogonal collision-resolution policies applied while
/// building a [`Config`](crate::Config): for a repeated section header,
/// for a repeated key within one textual section, and for a key collision
/// produced while merging a repeated section into the original.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFlags {
    pub section: SectionPolicy,
    pub value_within_section: ValuePolicy,
    pub value_across_sections: ValuePolicy,
}

impl CollisionFlags {
    /// Merge repeated sections and let the last occurrence of a repeated
    /// key win, both within one section and across merged sections.
    pub const fn merge_all() -> Self {
        CollisionFlags {
            section: SectionPolicy::Merge,
            value_within_section: ValuePolicy::Overwrite,
            value_across_sections: ValuePolicy::Overwrite,
        }
    }

    /// Rejects an impossible combination of policies.
    ///
    /// A `Detect` policy on one dimension is invalid if either of the
    /// other two dimensions is `Error`: the `Error` policy would already
    /// stop parsing on the same collision before `Detect`'s deferred
    /// `EEXIST` could ever be observed on its own.
    pub fn validate(&self) -> Result<(), InvalidCollisionFlags> {
        let errors = [
            self.section == SectionPolicy::Error,
            self.value_within_section == ValuePolicy::Error,
            self.value_across_sections == ValuePolicy::Error,
        ];
        let detects = [
            self.section == SectionPolicy::Detect,
            self.value_within_section == ValuePolicy::Detect,
            self.value_across_sections == ValuePolicy::Detect,
        ];
        for (i, &detect) in detects.iter().enumerate() {
            if detect && errors.iter().enumerate().any(|(j, &e)| j != i && e) {
                return Err(InvalidCollisionFlags::DetectWithError);
            }
        }
        Ok(())
    }
}

/// An invalid combination of [`CollisionFlags`].
#[derive(Clone, Copy, Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidCollisionFlags {
    #[error("a `Detect` policy cannot coexist with an `Error` policy on another dimension")]
    DetectWithError,
}
