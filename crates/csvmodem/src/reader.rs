//! Incremental line reading with multi-line record stitching.
//!
//! The reader is double-buffered: the line handed to the caller stays valid
//! (spans and all) while the following line is already fetched and split, so
//! a front-end can peek at a header row before formally consuming it.
//! [`advance`](LineReader::advance) swaps the pair.

use std::io::BufRead;

use crate::{
    buffer::LineBuf,
    converter::{Converter, FromRecord},
    dialect::{Dialect, Multiline},
    error::{Error, ErrorMode, SplitError},
};

/// Reads logical lines from a byte source and keeps them split.
///
/// `R` is any [`BufRead`]; `BufReader<File>` covers file input and `&[u8]`
/// covers in-memory input with the same scan path. Line fetching reuses one
/// buffer per slot, so growth is amortized across records.
#[derive(Debug)]
pub struct LineReader<R> {
    source: R,
    name: String,
    escape: Option<u8>,
    quote: Option<u8>,
    multiline: Option<Multiline>,
    ignore_empty: bool,

    current: LineBuf,
    next: LineBuf,
    helper: LineBuf,
    converter: Converter,
    next_converter: Converter,

    /// Terminator style of the most recently stripped line, for lossless
    /// restoration while stitching.
    crlf: bool,
    line_number: u64,
    byte_offset: u64,
}

/// Whether the line ends with an active escape: an odd run of trailing
/// escape bytes means the terminator itself was escaped.
fn ends_with_open_escape(line: &LineBuf, escape: u8) -> bool {
    let trailing = line
        .as_bytes()
        .iter()
        .rev()
        .take_while(|&&b| b == escape)
        .count();
    trailing % 2 == 1
}

impl<R: BufRead> LineReader<R> {
    pub fn new(
        source: R,
        name: impl Into<String>,
        dialect: &Dialect,
        mode: ErrorMode,
    ) -> Result<Self, Error> {
        let converter = Converter::new(dialect, mode)?;
        Ok(Self {
            source,
            name: name.into(),
            escape: dialect.escape,
            quote: dialect.quote,
            multiline: dialect.multiline,
            ignore_empty: dialect.ignore_empty,
            current: LineBuf::new(),
            next: LineBuf::new(),
            helper: LineBuf::new(),
            next_converter: converter.clone(),
            converter,
            crlf: false,
            line_number: 0,
            byte_offset: 0,
        })
    }

    /// Fetches the next logical line into the lookahead slot, stitching
    /// physical lines as the dialect demands, and leaves it split.
    ///
    /// Returns `Ok(false)` at end of input. Structural failures (unterminated
    /// quote or escape at end of input, stitch limit) are recorded on the
    /// lookahead converter and surface when the line is converted.
    pub fn read_next(&mut self) -> Result<bool, Error> {
        loop {
            let fetched = self.fetch_next_line()?;
            if !fetched {
                return Ok(false);
            }
            if let Some(crlf) = strip_eol(&mut self.next) {
                self.crlf = crlf;
            }
            if !self.ignore_empty || !self.next.is_empty() {
                break;
            }
        }

        let mut stitched = 0usize;
        if self.multiline.is_some() {
            if let Some(escape) = self.escape {
                while ends_with_open_escape(&self.next, escape) {
                    if self.limit_reached(&mut stitched) {
                        return Ok(true);
                    }
                    if !self.append_physical_line()? {
                        self.strip_restored_eol();
                        self.next_converter
                            .set_split_error(SplitError::UnterminatedEscape);
                        return Ok(true);
                    }
                }
            }
        }

        self.next_converter.split_line(&mut self.next);

        if self.multiline.is_some() && self.quote.is_some() {
            while self.next_converter.unterminated_quote() {
                if self.limit_reached(&mut stitched) {
                    return Ok(true);
                }
                if !self.append_physical_line()? {
                    self.strip_restored_eol();
                    return Ok(true);
                }
                if let Some(escape) = self.escape {
                    while ends_with_open_escape(&self.next, escape) {
                        if self.limit_reached(&mut stitched) {
                            return Ok(true);
                        }
                        if !self.append_physical_line()? {
                            self.strip_restored_eol();
                            self.next_converter
                                .set_split_error(SplitError::UnterminatedEscape);
                            return Ok(true);
                        }
                    }
                }
                self.next_converter.resplit_line(&mut self.next);
            }
        }

        Ok(true)
    }

    /// Swaps the lookahead line into the current slot. Spans taken from the
    /// previous current line are invalidated.
    pub fn advance(&mut self) {
        core::mem::swap(&mut self.current, &mut self.next);
        core::mem::swap(&mut self.converter, &mut self.next_converter);
    }

    /// Converts the current line using its cached split.
    pub fn convert_current<'r, Rec: FromRecord<'r>>(&'r mut self) -> Result<Rec::Output, Error> {
        let Self {
            converter, current, ..
        } = self;
        converter.convert_split::<Rec>(current.as_bytes())
    }

    /// The fields of the lookahead line, copied out. Used to capture a
    /// header row before it is consumed.
    #[must_use]
    pub fn peek_fields(&self) -> Vec<String> {
        self.next_converter
            .spans()
            .iter()
            .map(|span| String::from_utf8_lossy(span.of(self.next.as_bytes())).into_owned())
            .collect()
    }

    /// Applies a column mapping to both line slots.
    pub fn set_column_mapping(&mut self, mapping: &[usize], columns: usize) -> Result<(), Error> {
        self.converter.set_column_mapping(mapping, columns)?;
        self.next_converter.set_column_mapping(mapping, columns)
    }

    #[must_use]
    pub fn current(&self) -> &LineBuf {
        &self.current
    }

    #[must_use]
    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical lines consumed so far, stitched continuation lines included.
    #[must_use]
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Bytes consumed from the source so far, terminators included.
    #[must_use]
    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    /// Reads one physical line into the lookahead buffer, terminator and
    /// all. `Ok(false)` at end of input.
    fn fetch_next_line(&mut self) -> Result<bool, Error> {
        self.next.clear();
        let n = self
            .source
            .read_until(b'\n', self.next.vec_mut())
            .map_err(|source| Error::Io {
                name: self.name.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        self.byte_offset += n as u64;
        Ok(true)
    }

    /// Restores the stripped terminator and appends the next physical line.
    /// `Ok(false)` at end of input, with the terminator left restored for
    /// the caller to strip again.
    fn append_physical_line(&mut self) -> Result<bool, Error> {
        self.undo_strip_eol();
        self.helper.clear();
        let n = self
            .source
            .read_until(b'\n', self.helper.vec_mut())
            .map_err(|source| Error::Io {
                name: self.name.clone(),
                source,
            })?;
        if n == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        self.byte_offset += n as u64;
        if let Some(crlf) = strip_eol(&mut self.helper) {
            self.crlf = crlf;
        }
        self.next.extend_from_slice(self.helper.as_bytes());
        Ok(true)
    }

    /// Puts the terminator back at the end of the lookahead buffer. When the
    /// last split stopped inside a quoted field, the in-place escape
    /// collapse left a gap of already-consumed escape bytes at the end;
    /// drop it first so the restored terminator lands where the content
    /// really stops.
    fn undo_strip_eol(&mut self) {
        if self.next_converter.unterminated_quote() {
            let len = self.next.len() - self.next_converter.size_shifted();
            self.next.truncate(len);
        }
        if self.crlf {
            self.next.extend_from_slice(b"\r\n");
        } else {
            self.next.extend_from_slice(b"\n");
        }
    }

    /// Backs out the terminator restored by [`undo_strip_eol`] after end of
    /// input interrupted a stitch.
    fn strip_restored_eol(&mut self) {
        let width = if self.crlf { 2 } else { 1 };
        self.next.truncate(self.next.len().saturating_sub(width));
    }

    fn limit_reached(&mut self, stitched: &mut usize) -> bool {
        let Some(multiline) = self.multiline else {
            return false;
        };
        if multiline.limit == 0 {
            return false;
        }
        if *stitched >= multiline.limit {
            self.next_converter
                .set_split_error(SplitError::MultilineLimitReached);
            return true;
        }
        *stitched += 1;
        false
    }
}

/// Strips a trailing `\n` or `\r\n`, reporting which one was found.
fn strip_eol(buf: &mut LineBuf) -> Option<bool> {
    let len = buf.len();
    if buf.as_bytes().last() != Some(&b'\n') {
        return None;
    }
    let crlf = len >= 2 && buf.as_bytes()[len - 2] == b'\r';
    buf.truncate(len - if crlf { 2 } else { 1 });
    Some(crlf)
}

#[cfg(test)]
mod tests;
