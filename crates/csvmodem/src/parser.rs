//! Pull-based front-end tying the reader and converter together.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    converter::FromRecord,
    dialect::Dialect,
    error::{ConvertError, Error, ErrorMode, ErrorState},
    reader::LineReader,
};

/// Reads records one `get_next` call at a time.
///
/// The parser always keeps one logical line of lookahead, which is how the
/// header row can be inspected (`field_exists`, `use_fields`) before the
/// first record is consumed. Unless the dialect sets `ignore_header`, the
/// header row is ordinary data: the first `get_next` returns it, while
/// [`use_fields`](Self::use_fields) skips it when mapping by name.
///
/// ```
/// use csvmodem::{Dialect, ErrorMode, Parser};
///
/// let data = b"id,score\n1,50\n2,60\n";
/// let mut parser = Parser::from_bytes(data, &Dialect::default(), ErrorMode::Raise).unwrap();
/// parser.use_fields(["score"]).unwrap();
/// let mut total = 0;
/// while !parser.eof() {
///     let (score,) = parser.get_next::<(i32,)>().unwrap();
///     total += score;
/// }
/// assert_eq!(total, 110);
/// ```
#[derive(Debug)]
pub struct Parser<R> {
    reader: LineReader<R>,
    errors: ErrorState,
    header: Vec<String>,
    ignore_header: bool,
    eof: bool,
    /// Physical line the most recently returned record ended on; 0 before
    /// the first record.
    current_line: u64,
}

impl Parser<BufReader<File>> {
    /// Opens a file for record-by-record reading. The file name becomes the
    /// source name in error context.
    pub fn open(
        path: impl AsRef<Path>,
        dialect: &Dialect,
        mode: ErrorMode,
    ) -> Result<Self, Error> {
        let name = path.as_ref().display().to_string();
        let file = File::open(path.as_ref()).map_err(|source| Error::Io {
            name: name.clone(),
            source,
        })?;
        Self::from_reader(BufReader::new(file), name, dialect, mode)
    }
}

impl<'d> Parser<&'d [u8]> {
    /// Parses records from an in-memory buffer.
    pub fn from_bytes(data: &'d [u8], dialect: &Dialect, mode: ErrorMode) -> Result<Self, Error> {
        Self::from_reader(data, "buffer", dialect, mode)
    }
}

impl<R: BufRead> Parser<R> {
    pub fn from_reader(
        source: R,
        name: impl Into<String>,
        dialect: &Dialect,
        mode: ErrorMode,
    ) -> Result<Self, Error> {
        let mut reader = LineReader::new(source, name, dialect, mode)?;
        let eof = !reader.read_next()?;
        let mut parser = Self {
            reader,
            errors: ErrorState::new(mode),
            header: Vec::new(),
            ignore_header: dialect.ignore_header,
            eof,
            current_line: 0,
        };
        if !parser.eof {
            if parser.ignore_header {
                parser.ignore_next()?;
            } else {
                parser.header = parser.reader.peek_fields();
            }
        }
        Ok(parser)
    }

    /// Converts the pending record and fetches the next one.
    ///
    /// Borrowing outputs (`&str`, `&[u8]`) stay valid until the next call
    /// that advances the parser.
    pub fn get_next<'s, Rec: FromRecord<'s>>(&'s mut self) -> Result<Rec::Output, Error> {
        self.errors.clear();
        if self.eof {
            let Self { reader, errors, .. } = self;
            let line = reader.line_number();
            return Err(Self::attach_context(
                errors,
                reader.name(),
                line,
                Error::EofReached,
            ));
        }
        self.reader.advance();
        self.current_line = self.reader.line_number();
        match self.reader.read_next() {
            Ok(more) => self.eof = !more,
            Err(err) => {
                let Self { reader, errors, .. } = self;
                let line = reader.line_number();
                return Err(Self::attach_context(errors, reader.name(), line, err));
            }
        }
        let line = self.current_line;
        let Self { reader, errors, .. } = self;
        // Taken eagerly: once the conversion borrows the reader for the
        // caller's lifetime, the error arm may no longer touch it.
        let name = reader.name().to_string();
        match reader.convert_current::<Rec>() {
            Ok(record) => Ok(record),
            Err(err) => Err(Self::attach_context(errors, &name, line, err)),
        }
    }

    /// Discards the pending record without converting it.
    ///
    /// Returns whether a record was discarded.
    pub fn ignore_next(&mut self) -> Result<bool, Error> {
        if self.eof {
            return Ok(false);
        }
        match self.reader.read_next() {
            Ok(more) => {
                self.eof = !more;
                Ok(true)
            }
            Err(err) => {
                let Self { reader, errors, .. } = self;
                let line = reader.line_number();
                Err(Self::attach_context(errors, reader.name(), line, err))
            }
        }
    }

    /// Restricts decoding to the named header fields, in the given order.
    ///
    /// Names must exist in the header and may not repeat. When no record has
    /// been returned yet, the header row itself is skipped, so the next
    /// `get_next` yields the first data row.
    pub fn use_fields<I, S>(&mut self, names: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.errors.clear();
        if self.ignore_header {
            return Err(self.errors.fail(Error::HeaderIgnored));
        }
        let names: Vec<String> = names
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        if names.is_empty() {
            return Err(self.errors.fail(ConvertError::EmptyMapping));
        }
        let mut mapping = Vec::with_capacity(names.len());
        for name in &names {
            if names.iter().filter(|n| *n == name).count() != 1 {
                return Err(self.errors.fail(Error::DuplicateField(name.clone())));
            }
            let Some(position) = self.header.iter().position(|h| h == name) else {
                return Err(self.errors.fail(Error::UnknownField(name.clone())));
            };
            mapping.push(position);
        }
        self.reader.set_column_mapping(&mapping, self.header.len())?;
        if self.current_line == 0 {
            self.ignore_next()?;
        }
        Ok(())
    }

    /// Whether the header contains a field with this name.
    #[must_use]
    pub fn field_exists(&self, name: &str) -> bool {
        self.header.iter().any(|h| h == name)
    }

    /// The header row fields, empty when `ignore_header` is set or the
    /// input was empty.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// True once every record has been returned.
    #[must_use]
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Physical line the most recently returned record ended on.
    #[must_use]
    pub fn line(&self) -> u64 {
        self.current_line
    }

    /// Bytes consumed from the source, lookahead included.
    #[must_use]
    pub fn byte_offset(&self) -> u64 {
        self.reader.byte_offset()
    }

    /// Whether the most recent operation succeeded.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.valid()
    }

    /// The most recent failure message under [`ErrorMode::Message`].
    #[must_use]
    pub fn error_msg(&self) -> Option<&str> {
        self.errors.message()
    }

    fn attach_context(errors: &mut ErrorState, name: &str, line: u64, err: Error) -> Error {
        match errors.mode() {
            ErrorMode::Silent => errors.fail(err),
            ErrorMode::Message | ErrorMode::Raise => errors.fail(Error::Context {
                name: name.to_string(),
                line,
                source: Box::new(err),
            }),
        }
    }
}
