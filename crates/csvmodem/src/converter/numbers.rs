//! Overflow-checked integer parsing.
//!
//! Digits accumulate through checked arithmetic, and a negative value
//! accumulates downward instead of negating at the end, so `MIN` parses
//! while `MIN - 1` overflows. A leading `+` is not accepted.

pub(crate) trait Integer: Copy + Sized {
    const SIGNED: bool;
    const ZERO: Self;
    fn checked_mul10(self) -> Option<Self>;
    fn checked_add_digit(self, digit: u8) -> Option<Self>;
    fn checked_sub_digit(self, digit: u8) -> Option<Self>;
}

macro_rules! impl_integer {
    ($signed:literal => $($t:ty),+) => {$(
        impl Integer for $t {
            const SIGNED: bool = $signed;
            const ZERO: Self = 0;

            #[inline]
            fn checked_mul10(self) -> Option<Self> {
                self.checked_mul(10)
            }

            #[inline]
            fn checked_add_digit(self, digit: u8) -> Option<Self> {
                // A digit is 0..=9 and fits every width.
                self.checked_add(digit as $t)
            }

            #[inline]
            fn checked_sub_digit(self, digit: u8) -> Option<Self> {
                self.checked_sub(digit as $t)
            }
        }
    )+};
}

impl_integer!(true => i8, i16, i32, i64, i128, isize);
impl_integer!(false => u8, u16, u32, u64, u128, usize);

/// Parses a decimal integer from raw field bytes.
///
/// Returns `None` on empty input, a sign on an unsigned type, a bare sign,
/// any non-digit byte, or overflow.
pub(crate) fn parse_integer<T: Integer>(bytes: &[u8]) -> Option<T> {
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) if T::SIGNED => (true, rest),
        Some(_) => (false, bytes),
        None => return None,
    };
    if digits.is_empty() {
        return None;
    }
    let mut value = T::ZERO;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        let digit = b - b'0';
        value = value.checked_mul10()?;
        value = if negative {
            value.checked_sub_digit(digit)?
        } else {
            value.checked_add_digit(digit)?
        };
    }
    Some(value)
}
