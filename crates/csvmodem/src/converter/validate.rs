//! Value validation during extraction.
//!
//! [`Checked<T, V>`] decodes like `T` and then applies the predicate `V`.
//! The adaptor is transparent: the decoded value comes out as `T::Output`,
//! not wrapped. Numeric bound validators take their bounds as `i64` const
//! generics and compare through `i128`, so one validator works across the
//! integer widths up to 64 bits.
//!
//! ```
//! use csvmodem::{Checked, Converter, Dialect, ErrorMode, InRange, LineBuf};
//!
//! let mut converter = Converter::new(&Dialect::default(), ErrorMode::Silent).unwrap();
//! let mut line = LineBuf::from("3,hello");
//! let (n, s) = converter
//!     .convert::<(Checked<i32, InRange<1, 5>>, String)>(&mut line)
//!     .unwrap();
//! assert_eq!(n, 3);
//! assert_eq!(s, "hello");
//! ```

use core::marker::PhantomData;

use super::extract::{FieldError, FromField};

/// A predicate over a decoded value, applied by [`Checked`].
pub trait Validator<T> {
    /// Used in error messages when messages are enabled.
    const MESSAGE: &'static str = "failed validation";

    fn is_valid(value: &T) -> bool;
}

/// Decodes as `T`, then rejects the value unless `V` accepts it.
pub struct Checked<T, V>(PhantomData<(T, V)>);

impl<'a, T, V> FromField<'a> for Checked<T, V>
where
    T: FromField<'a>,
    V: Validator<T::Output>,
{
    type Output = T::Output;

    fn from_field(raw: &'a [u8]) -> Result<T::Output, FieldError> {
        let value = T::from_field(raw)?;
        if V::is_valid(&value) {
            Ok(value)
        } else {
            Err(FieldError::Rejected(V::MESSAGE))
        }
    }
}

/// Accepts only the value `N`.
pub struct EqValue<const N: i64>;
/// Accepts values strictly greater than `N`.
pub struct Gt<const N: i64>;
/// Accepts values greater than or equal to `N`.
pub struct Gte<const N: i64>;
/// Accepts values strictly less than `N`.
pub struct Lt<const N: i64>;
/// Accepts values less than or equal to `N`.
pub struct Lte<const N: i64>;
/// Accepts values in the inclusive range `[MIN, MAX]`.
pub struct InRange<const MIN: i64, const MAX: i64>;
/// Accepts values outside the inclusive range `[MIN, MAX]`.
pub struct OutOfRange<const MIN: i64, const MAX: i64>;

macro_rules! impl_bound_validators {
    ($($t:ty),+) => {$(
        impl<const N: i64> Validator<$t> for EqValue<N> {
            const MESSAGE: &'static str = "value differs from the accepted one";

            fn is_valid(value: &$t) -> bool {
                i128::from(*value) == i128::from(N)
            }
        }

        impl<const N: i64> Validator<$t> for Gt<N> {
            const MESSAGE: &'static str = "value not greater than the bound";

            fn is_valid(value: &$t) -> bool {
                i128::from(*value) > i128::from(N)
            }
        }

        impl<const N: i64> Validator<$t> for Gte<N> {
            const MESSAGE: &'static str = "value below the bound";

            fn is_valid(value: &$t) -> bool {
                i128::from(*value) >= i128::from(N)
            }
        }

        impl<const N: i64> Validator<$t> for Lt<N> {
            const MESSAGE: &'static str = "value not less than the bound";

            fn is_valid(value: &$t) -> bool {
                i128::from(*value) < i128::from(N)
            }
        }

        impl<const N: i64> Validator<$t> for Lte<N> {
            const MESSAGE: &'static str = "value above the bound";

            fn is_valid(value: &$t) -> bool {
                i128::from(*value) <= i128::from(N)
            }
        }

        impl<const MIN: i64, const MAX: i64> Validator<$t> for InRange<MIN, MAX> {
            const MESSAGE: &'static str = "value out of range";

            fn is_valid(value: &$t) -> bool {
                (i128::from(MIN)..=i128::from(MAX)).contains(&i128::from(*value))
            }
        }

        impl<const MIN: i64, const MAX: i64> Validator<$t> for OutOfRange<MIN, MAX> {
            const MESSAGE: &'static str = "value inside the excluded range";

            fn is_valid(value: &$t) -> bool {
                !(i128::from(MIN)..=i128::from(MAX)).contains(&i128::from(*value))
            }
        }
    )+};
}

impl_bound_validators!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Inverts a validator.
pub struct Not<V>(PhantomData<V>);

impl<T, V: Validator<T>> Validator<T> for Not<V> {
    const MESSAGE: &'static str = "value excluded";

    fn is_valid(value: &T) -> bool {
        !V::is_valid(value)
    }
}

/// Accepts a value both validators accept. Nest for more than two.
pub struct AllOf<V1, V2>(PhantomData<(V1, V2)>);

impl<T, V1: Validator<T>, V2: Validator<T>> Validator<T> for AllOf<V1, V2> {
    const MESSAGE: &'static str = "value rejected by a combined rule";

    fn is_valid(value: &T) -> bool {
        V1::is_valid(value) && V2::is_valid(value)
    }
}

/// Accepts a value either validator accepts. Nest for more than two.
pub struct AnyOf<V1, V2>(PhantomData<(V1, V2)>);

impl<T, V1: Validator<T>, V2: Validator<T>> Validator<T> for AnyOf<V1, V2> {
    const MESSAGE: &'static str = "value matches none of the accepted ones";

    fn is_valid(value: &T) -> bool {
        V1::is_valid(value) || V2::is_valid(value)
    }
}

/// Exactly one of two accepted values.
pub type OneOf2<const A: i64, const B: i64> = AnyOf<EqValue<A>, EqValue<B>>;
/// Exactly one of three accepted values.
pub type OneOf3<const A: i64, const B: i64, const C: i64> =
    AnyOf<EqValue<A>, AnyOf<EqValue<B>, EqValue<C>>>;
/// Neither of two excluded values.
pub type NoneOf2<const A: i64, const B: i64> = AllOf<Not<EqValue<A>>, Not<EqValue<B>>>;
/// None of three excluded values.
pub type NoneOf3<const A: i64, const B: i64, const C: i64> =
    AllOf<Not<EqValue<A>>, AllOf<Not<EqValue<B>>, Not<EqValue<C>>>>;

/// Rejects empty text or byte fields.
pub struct NonEmpty;

impl Validator<String> for NonEmpty {
    const MESSAGE: &'static str = "empty field";

    fn is_valid(value: &String) -> bool {
        !value.is_empty()
    }
}

impl Validator<&str> for NonEmpty {
    const MESSAGE: &'static str = "empty field";

    fn is_valid(value: &&str) -> bool {
        !value.is_empty()
    }
}

impl Validator<Vec<u8>> for NonEmpty {
    const MESSAGE: &'static str = "empty field";

    fn is_valid(value: &Vec<u8>) -> bool {
        !value.is_empty()
    }
}

impl Validator<&[u8]> for NonEmpty {
    const MESSAGE: &'static str = "empty field";

    fn is_valid(value: &&[u8]) -> bool {
        !value.is_empty()
    }
}
