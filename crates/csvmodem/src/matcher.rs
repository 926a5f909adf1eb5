//! Character-class predicates for the splitter.
//!
//! A [`CharSet`] is a tiny immutable byte set answering "is this byte a trim
//! character" style questions. Sets are built once from the dialect and never
//! mutated, so membership is a linear probe over a handful of bytes.

/// An immutable set of single-byte match characters.
///
/// NUL is reserved as the end-of-line sentinel used by the splitter's scan
/// loop and is rejected by [`Dialect::validate`](crate::Dialect::validate)
/// before a `CharSet` is ever built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CharSet {
    bytes: Vec<u8>,
}

impl CharSet {
    pub(crate) fn new(bytes: &[u8]) -> Self {
        let mut bytes = bytes.to_vec();
        bytes.sort_unstable();
        bytes.dedup();
        Self { bytes }
    }

    #[inline]
    pub(crate) fn contains(&self, b: u8) -> bool {
        // Sets hold at most a few bytes; a scan beats a lookup table here.
        self.bytes.iter().any(|&m| m == b)
    }

    pub(crate) fn intersects(&self, other: &CharSet) -> bool {
        self.bytes.iter().any(|&b| other.contains(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_and_dedup() {
        let set = CharSet::new(b"  \t");
        assert!(set.contains(b' '));
        assert!(set.contains(b'\t'));
        assert!(!set.contains(b'x'));
        assert!(!set.contains(0));
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = CharSet::new(b"");
        assert!(!set.contains(b' '));
        assert!(!set.contains(0));
    }

    #[test]
    fn intersection() {
        let a = CharSet::new(b"ab");
        let b = CharSet::new(b"bc");
        let c = CharSet::new(b"xy");
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
