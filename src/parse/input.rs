use std::io::{self, BufRead};

use crate::parse::BUFFER_SIZE;

/// What happened on one attempt to read a logical line.
///
/// Corresponds to `parser_read`'s classification of a `getline` result,
/// minus the degenerate NUL-prefixed-line re-issue the source guards
/// against ("should not ever happen") — a `BufRead::read_until` call
/// cannot produce an empty successful read, so there is nothing to
/// re-issue here.
pub(super) enum ReadLine {
    /// A logical line, with the trailing CR/LF already stripped.
    Line(Vec<u8>),
    /// The stream ended.
    Eof,
    /// The physical line was at least `BUFFER_SIZE` bytes.
    TooLong,
}

/// Reads logical lines from the input stream, tracking the current line
/// number.
pub(super) struct LineSource<R> {
    reader: R,
    /// The number of the line that the most recently returned `ReadLine`
    /// came from, or that will be returned next.
    pub(super) line: u32,
    eof: bool,
}

impl<R: BufRead> LineSource<R> {
    pub(super) fn new(reader: R) -> Self {
        LineSource {
            reader,
            line: 0,
            eof: false,
        }
    }

    /// Reads one logical line, stripping the trailing CR/LF. Counts
    /// against the line number even when it returns `TooLong`, matching
    /// `parser_read`'s unconditional `po->linenum++` before inspecting
    /// what was read.
    pub(super) fn read_line(&mut self) -> io::Result<ReadLine> {
        if self.eof {
            return Ok(ReadLine::Eof);
        }
        self.line += 1;
        let mut buf = Vec::new();
        let n = self.reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            self.eof = true;
            return Ok(ReadLine::Eof);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else {
            // `read_until` only omits the delimiter when it hit EOF first.
            self.eof = true;
        }
        if buf.len() >= BUFFER_SIZE {
            return Ok(ReadLine::TooLong);
        }
        Ok(ReadLine::Line(buf))
    }
}
