//! Field splitter: a resumable state machine over one line of bytes.
//!
//! The splitter walks the line with three cursors. `begin` marks the start of
//! the field being scanned, `end` is the scan head, and `curr` trails `end`
//! by the number of escape bytes collapsed so far. Escapes are unshifted in
//! place: when an escape byte is consumed, the bytes after it slide left over
//! the pending gap, so a finished field is always a contiguous span of the
//! (mutated) line buffer.
//!
//! End of line is modelled as a NUL sentinel: [`byte_at`] yields `0` at or
//! past the end of the slice, which is why NUL is banned from the delimiter
//! and every matcher set.

use crate::{
    dialect::Dialect,
    error::{DialectError, SplitError},
    matcher::CharSet,
};

/// A half-open `[start, end)` byte range of one field within the line buffer.
///
/// Spans never own memory; they are invalidated by any buffer mutation or by
/// a reader swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub start: usize,
    pub end: usize,
}

impl FieldSpan {
    /// The field's bytes within `buf`.
    #[must_use]
    pub fn of<'b>(&self, buf: &'b [u8]) -> &'b [u8] {
        &buf[self.start..self.end]
    }
}

#[inline]
fn byte_at(line: &[u8], i: usize) -> u8 {
    line.get(i).copied().unwrap_or(0)
}

/// Splits one line into field spans according to a [`Dialect`].
#[derive(Debug, Clone)]
pub struct Splitter {
    delimiter: Vec<u8>,
    quote: Option<u8>,
    escape: Option<u8>,
    trim_left: CharSet,
    trim_right: CharSet,
    multiline: bool,

    spans: Vec<FieldSpan>,
    error: Option<SplitError>,
    unterminated_quote: bool,

    begin: usize,
    curr: usize,
    end: usize,
    escaped: usize,
    done: bool,
    resplitting: bool,
}

impl Splitter {
    /// Builds a splitter for the dialect, validating it first.
    pub fn new(dialect: &Dialect) -> Result<Self, DialectError> {
        dialect.validate()?;
        Ok(Self {
            delimiter: dialect.delimiter.as_bytes().to_vec(),
            quote: dialect.quote,
            escape: dialect.escape,
            trim_left: CharSet::new(&dialect.trim_left),
            trim_right: CharSet::new(&dialect.trim_right),
            multiline: dialect.multiline.is_some(),
            spans: Vec::new(),
            error: None,
            unterminated_quote: false,
            begin: 0,
            curr: 0,
            end: 0,
            escaped: 0,
            done: false,
            resplitting: false,
        })
    }

    /// Splits `line` from the start, replacing any previous spans.
    ///
    /// The buffer is mutable because escape and doubled-quote collapsing
    /// rewrite it in place. The returned spans index the buffer as it is
    /// after the call.
    ///
    /// An empty `line` is one empty field at this layer; treating an empty
    /// logical line as a zero-field record is
    /// [`Converter::split_line`](crate::Converter::split_line)'s rule.
    pub fn split(&mut self, line: &mut [u8]) -> &[FieldSpan] {
        self.spans.clear();
        self.begin = 0;
        self.run(line);
        &self.spans
    }

    /// Resumes a split interrupted by an unterminated quote, after the caller
    /// has appended the continuation (with the line break restored) to the
    /// buffer.
    ///
    /// Scanning picks up inside the still-open quoted field; confirmed spans
    /// are never re-scanned. Valid only while
    /// [`unterminated_quote`](Self::unterminated_quote) holds and the buffer
    /// has not shrunk.
    pub fn resplit(&mut self, line: &mut [u8]) -> &[FieldSpan] {
        if self.quote.is_none()
            || !self.multiline
            || self.spans.is_empty()
            || !self.unterminated_quote
        {
            self.error = Some(SplitError::InvalidResplit);
            return &self.spans;
        }
        // The provisional last span ends just past the opening quote.
        let Some(junk) = self.spans.last().copied() else {
            self.error = Some(SplitError::InvalidResplit);
            return &self.spans;
        };
        let Some(quote_idx) = junk.end.checked_sub(1) else {
            self.error = Some(SplitError::InvalidResplit);
            return &self.spans;
        };
        if line.len() < quote_idx {
            self.error = Some(SplitError::InvalidResplit);
            return &self.spans;
        }
        self.spans.pop();
        self.begin = quote_idx;
        // `end` still counts the escape bytes collapsed before the
        // interruption; the caller truncated them away when restoring the
        // line break.
        self.end -= self.escaped;
        self.curr = self.end;
        self.resplitting = true;
        self.run(line);
        &self.spans
    }

    /// Clears all field state, as for an empty line: no spans, no error.
    pub(crate) fn reset(&mut self) {
        self.spans.clear();
        self.clear_error();
    }

    #[must_use]
    pub fn spans(&self) -> &[FieldSpan] {
        &self.spans
    }

    #[must_use]
    pub fn error(&self) -> Option<&SplitError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        self.error.is_none()
    }

    /// Whether the last split ended inside an open quoted field, making
    /// [`resplit`](Self::resplit) applicable.
    #[must_use]
    pub fn unterminated_quote(&self) -> bool {
        self.unterminated_quote
    }

    /// Number of bytes the in-place escape collapse has shifted the scan
    /// head ahead of the field content. The reader subtracts this when it
    /// restores the line terminator before stitching.
    pub(crate) fn size_shifted(&self) -> usize {
        self.escaped
    }

    /// Records an externally detected error and ends any resumable stitch.
    ///
    /// The converter slot is reused for later lines; a stale
    /// `unterminated_quote` or shift count would truncate the next line
    /// fetched on it.
    pub(crate) fn set_error(&mut self, error: SplitError) {
        self.error = Some(error);
        self.unterminated_quote = false;
        self.escaped = 0;
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.unterminated_quote = false;
    }

    fn run(&mut self, line: &mut [u8]) {
        self.clear_error();
        if self.delimiter.is_empty() {
            self.error = Some(SplitError::EmptyDelimiter);
            return;
        }
        while self.trim_left.contains(byte_at(line, self.begin)) {
            self.begin += 1;
        }
        self.done = false;
        while !self.done {
            self.read(line);
        }
    }

    fn read(&mut self, line: &mut [u8]) {
        self.escaped = 0;
        if let Some(quote) = self.quote {
            if self.resplitting {
                self.resplitting = false;
                // `begin` sits on the reopened quote; content resumes after.
                self.begin += 1;
                self.read_quoted(line, quote);
                return;
            }
            if byte_at(line, self.begin) == quote {
                self.begin += 1;
                self.curr = self.begin;
                self.end = self.begin;
                self.read_quoted(line, quote);
                return;
            }
        }
        self.curr = self.begin;
        self.end = self.begin;
        self.read_normal(line);
    }

    fn read_normal(&mut self, line: &mut [u8]) {
        loop {
            let (width, matched) = self.match_delimiter(line, self.end);
            if self.done {
                // An unterminated escape was recorded mid-probe; no span
                // accompanies the error.
                return;
            }
            if matched {
                self.push_and_start_next(line, width);
                return;
            }
            if width == 0 {
                // End of line.
                self.push_span(line);
                self.done = true;
                return;
            }
            self.end += width;
        }
    }

    fn read_quoted(&mut self, line: &mut [u8], quote: u8) {
        loop {
            let b = byte_at(line, self.end);
            if b == quote {
                let (width, matched) = self.match_delimiter(line, self.end + 1);
                if matched {
                    // Closing quote then delimiter: skip both.
                    self.push_and_start_next(line, width + 1);
                    return;
                }
                if byte_at(line, self.end + 1) == quote {
                    // Doubled quote collapses to one literal quote.
                    self.shift_and_jump_escape(line);
                    self.end += 1;
                    continue;
                }
                if width == 0 {
                    // Closing quote at end of line.
                    self.push_span(line);
                } else {
                    self.error = Some(SplitError::MismatchedQuote(self.end));
                    self.spans.push(FieldSpan {
                        start: 0,
                        end: self.begin,
                    });
                }
                self.done = true;
                return;
            }
            if self.escape == Some(b) {
                if byte_at(line, self.end + 1) == 0 {
                    self.error = Some(SplitError::UnterminatedEscape);
                    self.done = true;
                    return;
                }
                self.shift_and_jump_escape(line);
                self.end += 1;
                continue;
            }
            if b == 0 {
                // Line ended inside the quoted field. Record a provisional
                // span whose end remembers where the content began, so a
                // later resplit can find the opening quote again.
                self.shift_and_set_current(line);
                self.error = Some(SplitError::UnterminatedQuote);
                self.unterminated_quote = true;
                self.spans.push(FieldSpan {
                    start: 0,
                    end: self.begin,
                });
                self.done = true;
                return;
            }
            self.end += 1;
        }
    }

    /// Looks for the delimiter at `at`, skipping trim-right bytes before it
    /// and trim-left bytes after it.
    ///
    /// Returns `(width, matched)`: on a match, `width` covers the trimmed
    /// bytes and the delimiter itself; otherwise `width` is how far the scan
    /// head should advance (`0` meaning end of line). A non-matching escape
    /// byte is collapsed here as a side effect.
    fn match_delimiter(&mut self, line: &mut [u8], at: usize) -> (usize, bool) {
        let mut probe = at;
        while self.trim_right.contains(byte_at(line, probe)) {
            probe += 1;
        }
        if byte_at(line, probe) == 0 {
            return (0, false);
        }
        if !self.delimiter_at(line, probe) {
            self.shift_if_escaped(line, probe);
            return (1 + probe - at, false);
        }
        probe += self.delimiter.len();
        while self.trim_left.contains(byte_at(line, probe)) {
            probe += 1;
        }
        (probe - at, true)
    }

    fn delimiter_at(&self, line: &[u8], at: usize) -> bool {
        if self.delimiter.len() == 1 {
            byte_at(line, at) == self.delimiter[0]
        } else {
            at < line.len() && line[at..].starts_with(&self.delimiter)
        }
    }

    fn shift_if_escaped(&mut self, line: &mut [u8], at: usize) {
        if self.escape == Some(byte_at(line, at)) {
            if byte_at(line, at + 1) == 0 {
                self.error = Some(SplitError::UnterminatedEscape);
                self.done = true;
                return;
            }
            self.shift_and_jump_escape(line);
        }
    }

    /// Collapses the pending escape gap so the field content ends at `curr`.
    fn shift_and_set_current(&mut self, line: &mut [u8]) {
        if self.escaped > 0 {
            line.copy_within(self.curr + self.escaped..self.end, self.curr);
            self.curr = self.end - self.escaped;
        } else {
            self.curr = self.end;
        }
    }

    /// Swallows one escape byte: collapse up to here, then step the scan
    /// head over it.
    fn shift_and_jump_escape(&mut self, line: &mut [u8]) {
        self.shift_and_set_current(line);
        self.escaped += 1;
        self.end += 1;
    }

    fn push_span(&mut self, line: &mut [u8]) {
        self.shift_and_set_current(line);
        self.spans.push(FieldSpan {
            start: self.begin,
            end: self.curr,
        });
    }

    fn push_and_start_next(&mut self, line: &mut [u8], width: usize) {
        self.push_span(line);
        self.begin = self.end + width;
    }
}
