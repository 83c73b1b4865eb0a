use std::collections::HashMap;
use std::io::{self, Write};

use crate::diagnostic::Diagnostic;
use crate::section::Section;
use crate::value::CommentBlock;

/// The name of the section that orphan key-value pairs (those appearing
/// before any `[section]` header) are collected into.
///
/// Corresponds to `INI_DEFAULT_SECTION`.
pub const DEFAULT_SECTION: &str = "default";

/// A parsed configuration tree: an ordered mapping from section name to
/// [`Section`], plus whatever trailing comment followed the last key and
/// the diagnostics accumulated while parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    sections: Vec<(String, Section)>,
    index: HashMap<String, usize>,
    trailing_comment: Option<CommentBlock>,
    diagnostics: Vec<Diagnostic>,
}

impl Config {
    pub(crate) fn new() -> Self {
        Config::default()
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&i| &self.sections[i].1)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn trailing_comment(&self) -> Option<&CommentBlock> {
        self.trailing_comment.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn push_diagnostic(&mut self, d: Diagnostic) {
        self.diagnostics.push(d);
    }

    pub(crate) fn set_trailing_comment(&mut self, comment: CommentBlock) {
        match &mut self.trailing_comment {
            Some(existing) => existing.extend(comment),
            None => self.trailing_comment = Some(comment),
        }
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.index.get(name).map(|&i| &mut self.sections[i].1)
    }

    /// Embeds a brand-new section with no existing entry of the same
    /// name. Panics if the name is already present; callers must check
    /// [`Config::contains_section`] first.
    pub(crate) fn embed_section(&mut self, section: Section) {
        let name = section.name().to_string();
        debug_assert!(!self.index.contains_key(&name), "section already exists");
        let i = self.sections.len();
        self.index.insert(name.clone(), i);
        self.sections.push((name, section));
    }

    /// Writes the configuration back out as INI text, preserving folded
    /// fragments and attached comments, but not whitespace or byte-exact
    /// layout.
    ///
    /// Corresponds to the structure of `ini_print.c`: iterate sections,
    /// iterate each section's entries, print a comment block (if any)
    /// then the value.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for (name, section) in &self.sections {
            if let Some(comment) = section.header_comment() {
                write_comment(w, comment)?;
            }
            writeln!(w, "[{name}]")?;
            for (key, value) in section.iter() {
                if let Some(comment) = value.comment() {
                    write_comment(w, comment)?;
                }
                let mut fragments = value.fragments().iter();
                if let Some(first) = fragments.next() {
                    w.write_all(key.as_bytes())?;
                    w.write_all(b" = ")?;
                    w.write_all(first)?;
                    writeln!(w)?;
                }
                for fragment in fragments {
                    w.write_all(fragment)?;
                    writeln!(w)?;
                }
            }
        }
        if let Some(comment) = &self.trailing_comment {
            write_comment(w, comment)?;
        }
        Ok(())
    }
}

fn write_comment<W: Write>(w: &mut W, comment: &CommentBlock) -> io::Result<()> {
    for line in comment.lines() {
        w.write_all(line)?;
        writeln!(w)?;
    }
    Ok(())
}
