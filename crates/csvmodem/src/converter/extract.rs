//! Typed field extraction.
//!
//! [`FromField`] decodes one raw field; [`FromRecord`] (implemented for
//! tuples up to arity 12) drives per-column extraction with first-failure
//! short-circuit. Custom domain types plug in by implementing `FromField`.

use crate::splitter::FieldSpan;

use super::numbers;

/// Why a single field failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// The text is not a value of the requested type.
    Unparsable,
    /// The text parsed but a validator refused the value.
    Rejected(&'static str),
}

/// Decodes one raw field into a typed value.
///
/// `Output` is usually `Self`; adaptors such as [`Checked`](crate::Checked)
/// decode to their inner type instead. Borrowing outputs (`&str`, `&[u8]`) tie to the line buffer
/// and are invalidated when the reader advances.
pub trait FromField<'a>: Sized {
    type Output;

    fn from_field(raw: &'a [u8]) -> Result<Self::Output, FieldError>;
}

macro_rules! impl_from_field_integer {
    ($($t:ty),+) => {$(
        impl<'a> FromField<'a> for $t {
            type Output = $t;

            fn from_field(raw: &'a [u8]) -> Result<$t, FieldError> {
                numbers::parse_integer(raw).ok_or(FieldError::Unparsable)
            }
        }
    )+};
}

impl_from_field_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_from_field_float {
    ($($t:ty),+) => {$(
        impl<'a> FromField<'a> for $t {
            type Output = $t;

            fn from_field(raw: &'a [u8]) -> Result<$t, FieldError> {
                core::str::from_utf8(raw)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(FieldError::Unparsable)
            }
        }
    )+};
}

impl_from_field_float!(f32, f64);

impl<'a> FromField<'a> for bool {
    type Output = bool;

    /// Exactly `0`, `1`, `true`, or `false`.
    fn from_field(raw: &'a [u8]) -> Result<bool, FieldError> {
        match raw {
            b"1" | b"true" => Ok(true),
            b"0" | b"false" => Ok(false),
            _ => Err(FieldError::Unparsable),
        }
    }
}

impl<'a> FromField<'a> for char {
    type Output = char;

    /// Exactly one UTF-8 scalar.
    fn from_field(raw: &'a [u8]) -> Result<char, FieldError> {
        match bstr::decode_utf8(raw) {
            (Some(c), len) if len == raw.len() => Ok(c),
            _ => Err(FieldError::Unparsable),
        }
    }
}

impl<'a> FromField<'a> for &'a str {
    type Output = &'a str;

    fn from_field(raw: &'a [u8]) -> Result<&'a str, FieldError> {
        core::str::from_utf8(raw).map_err(|_| FieldError::Unparsable)
    }
}

impl<'a> FromField<'a> for String {
    type Output = String;

    fn from_field(raw: &'a [u8]) -> Result<String, FieldError> {
        <&str>::from_field(raw).map(str::to_owned)
    }
}

impl<'a> FromField<'a> for &'a [u8] {
    type Output = &'a [u8];

    fn from_field(raw: &'a [u8]) -> Result<&'a [u8], FieldError> {
        Ok(raw)
    }
}

impl<'a> FromField<'a> for Vec<u8> {
    type Output = Vec<u8>;

    fn from_field(raw: &'a [u8]) -> Result<Vec<u8>, FieldError> {
        Ok(raw.to_vec())
    }
}

/// Skip placeholder: consumes a column without decoding it.
impl<'a> FromField<'a> for () {
    type Output = ();

    fn from_field(_raw: &'a [u8]) -> Result<(), FieldError> {
        Ok(())
    }
}

/// Absorbs failure: a field that does not decode becomes `None` and never
/// fails the record.
impl<'a, T: FromField<'a>> FromField<'a> for Option<T> {
    type Output = Option<T::Output>;

    fn from_field(raw: &'a [u8]) -> Result<Self::Output, FieldError> {
        Ok(T::from_field(raw).ok())
    }
}

/// Ordered alternatives: the first decoder that accepts the text wins.
/// Nest for more than two alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Either<A, B> {
    Left(A),
    Right(B),
}

impl<'a, A: FromField<'a>, B: FromField<'a>> FromField<'a> for Either<A, B> {
    type Output = Either<A::Output, B::Output>;

    fn from_field(raw: &'a [u8]) -> Result<Self::Output, FieldError> {
        if let Ok(left) = A::from_field(raw) {
            return Ok(Either::Left(left));
        }
        match B::from_field(raw) {
            Ok(right) => Ok(Either::Right(right)),
            Err(_) => Err(FieldError::Unparsable),
        }
    }
}

/// Resolved access to the split fields of one line.
pub(crate) struct Fields<'a, 'm> {
    pub(crate) buf: &'a [u8],
    pub(crate) spans: &'m [FieldSpan],
    pub(crate) mapping: &'m [usize],
}

impl<'a> Fields<'a, '_> {
    /// The raw bytes feeding tuple position `arg`.
    ///
    /// Arity and mapping bounds are checked before extraction starts, so
    /// resolution cannot go out of range here.
    pub(crate) fn raw(&self, arg: usize) -> &'a [u8] {
        let column = if self.mapping.is_empty() {
            arg
        } else {
            self.mapping[arg]
        };
        self.spans[column].of(self.buf)
    }
}

/// A column that failed during record extraction.
pub(crate) struct RecordFailure<'a> {
    /// Zero-based tuple position.
    pub(crate) arg: usize,
    pub(crate) raw: &'a [u8],
    pub(crate) kind: FieldError,
}

/// Decodes a whole record from split fields. Implemented for tuples of
/// [`FromField`] types up to arity 12; a single column is `(T,)`.
pub trait FromRecord<'a>: Sized {
    type Output;

    /// Number of tuple positions, checked against the field count (or the
    /// column mapping) before extraction.
    const ARITY: usize;

    #[doc(hidden)]
    fn from_record(fields: &Fields<'a, '_>) -> Result<Self::Output, RecordFailure<'a>>;
}

macro_rules! impl_from_record {
    ($($idx:tt $t:ident),+) => {
        impl<'a, $($t: FromField<'a>),+> FromRecord<'a> for ($($t,)+) {
            type Output = ($($t::Output,)+);

            const ARITY: usize = [$(stringify!($idx)),+].len();

            fn from_record(fields: &Fields<'a, '_>) -> Result<Self::Output, RecordFailure<'a>> {
                Ok(($(
                    {
                        let raw = fields.raw($idx);
                        match $t::from_field(raw) {
                            Ok(value) => value,
                            Err(kind) => {
                                return Err(RecordFailure { arg: $idx, raw, kind });
                            }
                        }
                    },
                )+))
            }
        }
    };
}

impl_from_record!(0 A);
impl_from_record!(0 A, 1 B);
impl_from_record!(0 A, 1 B, 2 C);
impl_from_record!(0 A, 1 B, 2 C, 3 D);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K);
impl_from_record!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L);

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a, T: FromField<'a>>(raw: &'a [u8]) -> Result<T::Output, FieldError> {
        T::from_field(raw)
    }

    #[test]
    fn bool_is_strict() {
        assert_eq!(field::<bool>(b"1"), Ok(true));
        assert_eq!(field::<bool>(b"true"), Ok(true));
        assert_eq!(field::<bool>(b"0"), Ok(false));
        assert_eq!(field::<bool>(b"false"), Ok(false));
        assert_eq!(field::<bool>(b"TRUE"), Err(FieldError::Unparsable));
        assert_eq!(field::<bool>(b"yes"), Err(FieldError::Unparsable));
        assert_eq!(field::<bool>(b""), Err(FieldError::Unparsable));
    }

    #[test]
    fn char_is_one_scalar() {
        assert_eq!(field::<char>(b"x"), Ok('x'));
        assert_eq!(field::<char>("ß".as_bytes()), Ok('ß'));
        assert_eq!(field::<char>(b"xy"), Err(FieldError::Unparsable));
        assert_eq!(field::<char>(b""), Err(FieldError::Unparsable));
        assert_eq!(field::<char>(b"\xff"), Err(FieldError::Unparsable));
    }

    #[test]
    fn text_requires_utf8_bytes_do_not() {
        assert_eq!(field::<&str>(b"hi"), Ok("hi"));
        assert_eq!(field::<&str>(b"\xff"), Err(FieldError::Unparsable));
        assert_eq!(field::<String>(b""), Ok(String::new()));
        assert_eq!(field::<&[u8]>(b"\xff"), Ok(&b"\xff"[..]));
        assert_eq!(field::<Vec<u8>>(b""), Ok(Vec::new()));
    }

    #[test]
    fn floats_reject_empty_and_junk() {
        assert_eq!(field::<f64>(b"1.5"), Ok(1.5));
        assert_eq!(field::<f64>(b"-2e3"), Ok(-2000.0));
        assert_eq!(field::<f64>(b""), Err(FieldError::Unparsable));
        assert_eq!(field::<f64>(b"1,5"), Err(FieldError::Unparsable));
    }

    #[test]
    fn option_absorbs_failure() {
        assert_eq!(field::<Option<i32>>(b"5"), Ok(Some(5)));
        assert_eq!(field::<Option<i32>>(b"five"), Ok(None));
        assert_eq!(field::<Option<i32>>(b""), Ok(None));
    }

    #[test]
    fn either_prefers_the_left() {
        assert_eq!(field::<Either<i32, String>>(b"5"), Ok(Either::Left(5)));
        assert_eq!(
            field::<Either<i32, String>>(b"five"),
            Ok(Either::Right("five".to_string()))
        );
        assert_eq!(
            field::<Either<i32, f64>>(b"five"),
            Err(FieldError::Unparsable)
        );
    }

    #[test]
    fn record_short_circuits_on_first_failure() {
        let buf = b"1 x 3";
        let spans = [
            FieldSpan { start: 0, end: 1 },
            FieldSpan { start: 2, end: 3 },
            FieldSpan { start: 4, end: 5 },
        ];
        let fields = Fields {
            buf,
            spans: &spans,
            mapping: &[],
        };
        let failure = match <(i32, i32, i32)>::from_record(&fields) {
            Err(f) => f,
            Ok(_) => panic!("record should not decode"),
        };
        assert_eq!(failure.arg, 1);
        assert_eq!(failure.raw, b"x");
        assert_eq!(failure.kind, FieldError::Unparsable);
    }

    #[test]
    fn record_resolves_through_mapping() {
        let buf = b"a,17";
        let spans = [
            FieldSpan { start: 0, end: 1 },
            FieldSpan { start: 2, end: 4 },
        ];
        let fields = Fields {
            buf,
            spans: &spans,
            mapping: &[1],
        };
        let (n,) = match <(i32,)>::from_record(&fields) {
            Ok(v) => v,
            Err(_) => panic!("mapped column should decode"),
        };
        assert_eq!(n, 17);
    }
}
