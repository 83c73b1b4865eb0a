use std::fmt::{self, Debug, Formatter};

use bstr::{BStr, ByteSlice};

/// One physical line's raw contribution to a [`Value`], stored verbatim
/// (after the leading `=` is stripped from the first fragment of a value).
pub type Fragment = Vec<u8>;

/// An ordered run of raw comment lines, accumulated between semantic
/// tokens and later attached to whatever value, section header, or the
/// [`Config`](crate::Config) itself comes next.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CommentBlock {
    lines: Vec<Vec<u8>>,
}

impl CommentBlock {
    pub(crate) fn new() -> Self {
        CommentBlock { lines: Vec::new() }
    }

    pub(crate) fn push_line(&mut self, line: &[u8]) {
        self.lines.push(line.to_vec());
    }

    pub(crate) fn extend(&mut self, other: CommentBlock) {
        self.lines.extend(other.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &BStr> {
        self.lines.iter().map(|l| l.as_bstr())
    }
}

impl Debug for CommentBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lines()).finish()
    }
}

/// A key's value: one or more raw line fragments (the first is the
/// right-hand side of `=`; later ones are folded continuation lines),
/// plus whatever comment immediately preceded the key and the line on
/// which the key first appeared.
#[derive(Clone, PartialEq, Eq)]
pub struct Value {
    key: String,
    fragments: Vec<Fragment>,
    comment: Option<CommentBlock>,
    origin_line: u32,
    wrap_boundary: Option<u32>,
}

impl Value {
    pub(crate) fn new(
        key: String,
        first_fragment: Fragment,
        origin_line: u32,
        wrap_boundary: Option<u32>,
    ) -> Self {
        Value {
            key,
            fragments: vec![first_fragment],
            comment: None,
            origin_line,
            wrap_boundary,
        }
    }

    pub(crate) fn push_fragment(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub(crate) fn set_comment(&mut self, comment: CommentBlock) {
        self.comment = Some(comment);
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value's fragments. Never empty.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The first fragment, interpreted as a single-line value. For folded
    /// values, callers that want the whole value should use
    /// [`Value::fragments`] or [`Value::joined`].
    pub fn as_bytes(&self) -> &[u8] {
        &self.fragments[0]
    }

    /// All fragments joined with `\n`, for callers that don't care about
    /// preserving the original line breaks.
    pub fn joined(&self) -> Vec<u8> {
        self.fragments.join(&b'\n')
    }

    pub fn comment(&self) -> Option<&CommentBlock> {
        self.comment.as_ref()
    }

    /// The 1-based line on which this key first appeared.
    pub fn origin_line(&self) -> u32 {
        self.origin_line
    }

    pub fn wrap_boundary(&self) -> Option<u32> {
        self.wrap_boundary
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("key", &self.key)
            .field(
                "fragments",
                &self.fragments.iter().map(|f| f.as_bstr()).collect::<Vec<_>>(),
            )
            .field("comment", &self.comment)
            .field("origin_line", &self.origin_line)
            .finish()
    }
}
