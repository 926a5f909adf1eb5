//! Typed conversion of split lines into tuples of values.

mod extract;
mod numbers;
pub mod validate;

use bstr::ByteSlice;

pub use extract::{Either, FieldError, FromField, FromRecord};
pub(crate) use extract::{Fields, RecordFailure};

use crate::{
    buffer::LineBuf,
    dialect::Dialect,
    error::{ConvertError, Error, ErrorMode, ErrorState},
    splitter::{FieldSpan, Splitter},
};

/// Splits a line and decodes the fields into typed values.
///
/// A converter owns its [`Splitter`] and a column mapping. Shape errors
/// (wrong field count, mapping mismatch) abort the record before any field
/// is decoded; the first failing field aborts the rest.
#[derive(Debug, Clone)]
pub struct Converter {
    splitter: Splitter,
    errors: ErrorState,
    mapping: Vec<usize>,
    mapped_columns: usize,
}

impl Converter {
    pub fn new(dialect: &Dialect, mode: ErrorMode) -> Result<Self, Error> {
        Ok(Self {
            splitter: Splitter::new(dialect)?,
            errors: ErrorState::new(mode),
            mapping: Vec::new(),
            mapped_columns: 0,
        })
    }

    /// Splits and decodes `line` in one step.
    ///
    /// The buffer is mutable because escape collapsing rewrites it in place;
    /// borrowing outputs (`&str`, `&[u8]`) point into it afterwards.
    pub fn convert<'a, R: FromRecord<'a>>(
        &mut self,
        line: &'a mut LineBuf,
    ) -> Result<R::Output, Error> {
        self.split_line(&mut *line);
        self.convert_split::<R>(line.as_bytes())
    }

    /// Splits `line`, caching the spans for a later
    /// [`convert_split`](Self::convert_split).
    ///
    /// An empty line yields zero fields here, not the one empty field the
    /// bare [`Splitter`] reports; the empty-record rule lives at this layer.
    pub fn split_line(&mut self, line: &mut LineBuf) -> &[FieldSpan] {
        if line.is_empty() {
            self.splitter.reset();
            return self.splitter.spans();
        }
        self.splitter.split(line.as_mut_bytes())
    }

    pub(crate) fn resplit_line(&mut self, line: &mut LineBuf) {
        self.splitter.resplit(line.as_mut_bytes());
    }

    /// Decodes the fields cached by the last split against `buf`, which must
    /// be the same buffer (possibly moved, not mutated) that was split.
    pub fn convert_split<'a, R: FromRecord<'a>>(
        &mut self,
        buf: &'a [u8],
    ) -> Result<R::Output, Error> {
        self.errors.clear();
        if let Some(err) = self.splitter.error() {
            let err = err.clone();
            return Err(self.errors.fail(err));
        }
        let fields = self.splitter.spans().len();
        if self.mapping.is_empty() {
            if R::ARITY != fields {
                return Err(self.errors.fail(ConvertError::ColumnCount {
                    expected: R::ARITY,
                    actual: fields,
                }));
            }
        } else {
            if R::ARITY != self.mapping.len() {
                return Err(self.errors.fail(ConvertError::MappingArity {
                    expected: self.mapping.len(),
                    actual: R::ARITY,
                }));
            }
            if fields != self.mapped_columns {
                return Err(self.errors.fail(ConvertError::ColumnCount {
                    expected: self.mapped_columns,
                    actual: fields,
                }));
            }
        }
        let Self {
            splitter,
            errors,
            mapping,
            ..
        } = self;
        let fields = Fields {
            buf,
            spans: splitter.spans(),
            mapping: mapping.as_slice(),
        };
        match R::from_record(&fields) {
            Ok(record) => Ok(record),
            Err(failure) => Err(errors.fail(Self::convert_error(&failure))),
        }
    }

    fn convert_error(failure: &RecordFailure<'_>) -> ConvertError {
        let column = failure.arg + 1;
        let text = failure.raw.as_bstr().to_string();
        match failure.kind {
            FieldError::Unparsable => ConvertError::InvalidConversion { column, text },
            FieldError::Rejected(message) => ConvertError::FailedValidation {
                message,
                column,
                text,
            },
        }
    }

    /// Restricts decoding to the given column positions, in tuple order.
    ///
    /// `columns` is the total column count every subsequent line must have.
    /// The mapping must be non-empty and each position must be in range;
    /// positions may repeat.
    pub fn set_column_mapping(
        &mut self,
        mapping: &[usize],
        columns: usize,
    ) -> Result<(), Error> {
        self.errors.clear();
        if mapping.is_empty() {
            return Err(self.errors.fail(ConvertError::EmptyMapping));
        }
        if let Some(&index) = mapping.iter().find(|&&index| index >= columns) {
            return Err(self.errors.fail(ConvertError::MappingOutOfRange {
                index,
                columns,
            }));
        }
        self.mapping = mapping.to_vec();
        self.mapped_columns = columns;
        Ok(())
    }

    pub fn clear_column_mapping(&mut self) {
        self.mapping.clear();
        self.mapped_columns = 0;
    }

    /// Spans of the most recent split.
    #[must_use]
    pub fn spans(&self) -> &[FieldSpan] {
        self.splitter.spans()
    }

    /// Whether the most recent split and conversion both succeeded.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.valid() && self.splitter.valid()
    }

    /// The most recent failure message under [`ErrorMode::Message`].
    #[must_use]
    pub fn error_msg(&self) -> Option<&str> {
        self.errors.message()
    }

    pub(crate) fn unterminated_quote(&self) -> bool {
        self.splitter.unterminated_quote()
    }

    pub(crate) fn size_shifted(&self) -> usize {
        self.splitter.size_shifted()
    }

    pub(crate) fn set_split_error(&mut self, error: crate::error::SplitError) {
        self.splitter.set_error(error);
    }
}
