//! Dialect configuration: which bytes delimit, quote, escape, and trim.

use thiserror::Error;

use crate::matcher::CharSet;

/// Errors produced by [`Dialect::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    #[error("empty delimiter")]
    EmptyDelimiter,
    #[error("NUL byte in delimiter or matcher set")]
    NulByte,
    #[error("overlapping special characters")]
    OverlappingMatchers,
    #[error("multiline requires quoting or escaping to be enabled")]
    MultilineWithoutQuoteOrEscape,
}

/// Multi-line record stitching configuration.
///
/// `limit` bounds how many additional physical lines may be stitched onto a
/// single record; `0` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Multiline {
    pub limit: usize,
}

/// A delimited-text dialect.
///
/// The default dialect splits on `,` with no quoting, escaping, trimming, or
/// multi-line stitching. Components validate the dialect eagerly at
/// construction time; an invalid combination never reaches the scan loop.
///
/// ```
/// use csvmodem::{Dialect, Multiline};
///
/// let dialect = Dialect {
///     quote: Some(b'"'),
///     multiline: Some(Multiline { limit: 8 }),
///     ..Dialect::default()
/// };
/// assert!(dialect.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Field separator, one or more bytes.
    pub delimiter: String,
    /// Quote character enabling embedded delimiters and, with
    /// [`multiline`](Self::multiline), embedded line breaks.
    pub quote: Option<u8>,
    /// Escape character; the following byte is taken literally.
    pub escape: Option<u8>,
    /// Bytes stripped from the start of each field.
    pub trim_left: Vec<u8>,
    /// Bytes stripped from the end of each field.
    pub trim_right: Vec<u8>,
    /// Stitch records that span physical lines.
    pub multiline: Option<Multiline>,
    /// Skip physically empty lines instead of reporting them as records.
    pub ignore_empty: bool,
    /// Treat the first row as data layout only: the front-end skips it and
    /// stores no header.
    pub ignore_header: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            quote: None,
            escape: None,
            trim_left: Vec::new(),
            trim_right: Vec::new(),
            multiline: None,
            ignore_empty: false,
            ignore_header: false,
        }
    }
}

impl Dialect {
    /// Sets both trim sides to the same byte set.
    #[must_use]
    pub fn trim(mut self, bytes: &[u8]) -> Self {
        self.trim_left = bytes.to_vec();
        self.trim_right = bytes.to_vec();
        self
    }

    /// Checks the dialect for internal consistency.
    ///
    /// The delimiter must be non-empty; NUL may not appear in the delimiter
    /// or any matcher set (it is the splitter's end-of-line sentinel); the
    /// quote, escape, and trim sets must be pairwise disjoint; multi-line
    /// stitching requires a quote or escape character to carry the break.
    pub fn validate(&self) -> Result<(), DialectError> {
        if self.delimiter.is_empty() {
            return Err(DialectError::EmptyDelimiter);
        }
        if self.delimiter.as_bytes().contains(&0)
            || self.quote == Some(0)
            || self.escape == Some(0)
            || self.trim_left.contains(&0)
            || self.trim_right.contains(&0)
        {
            return Err(DialectError::NulByte);
        }
        let quote = CharSet::new(self.quote.as_slice());
        let escape = CharSet::new(self.escape.as_slice());
        let trim_left = CharSet::new(&self.trim_left);
        let trim_right = CharSet::new(&self.trim_right);
        let delim = CharSet::new(self.delimiter.as_bytes());
        // The quote, escape, trim, and delimiter classes must be pairwise
        // disjoint; only the two trim sides may share characters.
        let disjoint_from_quote = !quote.intersects(&escape)
            && !quote.intersects(&trim_left)
            && !quote.intersects(&trim_right);
        let disjoint_from_escape =
            !escape.intersects(&trim_left) && !escape.intersects(&trim_right);
        let disjoint_from_delim = !delim.intersects(&quote)
            && !delim.intersects(&escape)
            && !delim.intersects(&trim_left)
            && !delim.intersects(&trim_right);
        if !(disjoint_from_quote && disjoint_from_escape && disjoint_from_delim) {
            return Err(DialectError::OverlappingMatchers);
        }
        if self.multiline.is_some() && self.quote.is_none() && self.escape.is_none() {
            return Err(DialectError::MultilineWithoutQuoteOrEscape);
        }
        Ok(())
    }
}
