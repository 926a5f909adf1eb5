//! Streaming delimited-text (CSV-family) tokenizer and typed decoder.
//!
//! Three layers, each usable on its own:
//!
//! - [`Splitter`] tokenizes one line of bytes into [`FieldSpan`]s under a
//!   configurable [`Dialect`] (delimiter, quoting, escaping, trimming), with
//!   an interruptible state machine that can resume mid-field when a quoted
//!   record turns out to span several physical lines.
//! - [`LineReader`] feeds the splitter from any [`std::io::BufRead`] source,
//!   stitching multi-line records back together losslessly and keeping one
//!   logical line of lookahead.
//! - [`Converter`] decodes split fields into tuples of typed values through
//!   the [`FromField`] trait, with overflow-checked integers, value
//!   validators, and optional column mapping.
//!
//! [`Parser`] ties the layers into a pull-based record reader with header
//! support. Failures follow a three-way [`ErrorMode`] policy: cheap polling,
//! retained messages, or contextual errors.
//!
//! ```
//! use csvmodem::{Dialect, ErrorMode, Parser};
//!
//! let data = b"james,1984,2.4\nbill,1972,3.9\n";
//! let mut parser = Parser::from_bytes(data, &Dialect::default(), ErrorMode::Raise).unwrap();
//! let (name, year, score) = parser.get_next::<(String, u16, f64)>().unwrap();
//! assert_eq!((name.as_str(), year, score), ("james", 1984, 2.4));
//! ```

mod buffer;
mod dialect;
mod error;
mod matcher;
mod splitter;

mod converter;
mod parser;
mod reader;


pub use buffer::LineBuf;
pub use converter::{
    Converter, Either, FieldError, FromField, FromRecord,
    validate::{
        AllOf, AnyOf, Checked, EqValue, Gt, Gte, InRange, Lt, Lte, NonEmpty, NoneOf2, NoneOf3,
        Not, OneOf2, OneOf3, OutOfRange, Validator,
    },
};
pub use dialect::{Dialect, DialectError, Multiline};
pub use error::{ConvertError, Error, ErrorMode, SplitError};
pub use parser::Parser;
pub use reader::LineReader;
pub use splitter::{FieldSpan, Splitter};
