//! Owned line buffer shared between the reader and the splitter.

use core::fmt;

use bstr::ByteSlice;

/// A growable byte buffer holding one logical line.
///
/// Growth is amortized geometric via `Vec`, so repeated stitching of long
/// multi-line records stays linear. Field spans index into this buffer and
/// are invalidated by any mutation or by a reader swap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LineBuf {
    data: Vec<u8>,
}

impl LineBuf {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Mutable access to the backing vector, for appending fetched input.
    pub(crate) fn vec_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

impl From<&[u8]> for LineBuf {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }
}

impl From<Vec<u8>> for LineBuf {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&str> for LineBuf {
    fn from(text: &str) -> Self {
        Self {
            data: text.as_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for LineBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.data.as_bstr(), f)
    }
}
