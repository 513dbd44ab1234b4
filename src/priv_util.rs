//! Bounded primitive reads over raw byte slices.
//!
//! Every decoder in this crate funnels its buffer access through [`SliceRead`]
//! so out-of-range offsets surface as errors instead of panics. Reads copy
//! into fixed-size arrays before conversion, so buffers of any alignment are
//! accepted.

use core::mem::size_of;

/// A failure while reading from a raw byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceReadError {
    /// The requested range extends past the end of the slice.
    UnexpectedEndOfInput,
    /// A null-terminated string had no terminator within its bounds.
    UnterminatedString,
}

pub type SliceReadResult<T> = Result<T, SliceReadError>;

pub trait SliceRead {
    fn read_be_u32(&self, offset: usize) -> SliceReadResult<u32>;
    fn read_be_u64(&self, offset: usize) -> SliceReadResult<u64>;
    fn read_le_u32(&self, offset: usize) -> SliceReadResult<u32>;
    fn read_le_u64(&self, offset: usize) -> SliceReadResult<u64>;

    /// Read a null-terminated byte string beginning at `offset`.
    ///
    /// The returned slice excludes the terminator.
    fn read_bstring0(&self, offset: usize) -> SliceReadResult<&[u8]>;

    /// As [`SliceRead::read_bstring0`] but scanning at most `max` bytes.
    fn nread_bstring0(&self, offset: usize, max: usize) -> SliceReadResult<&[u8]>;

    /// Borrow `len` bytes starting at `offset`.
    fn subslice(&self, offset: usize, len: usize) -> SliceReadResult<&[u8]>;
}

macro_rules! impl_read_int {
    ( $fn:ident, $t:ty, $from:ident ) => {
        #[inline]
        fn $fn(&self, offset: usize) -> SliceReadResult<$t> {
            let mut arr = [0u8; size_of::<$t>()];
            arr.copy_from_slice(self.subslice(offset, size_of::<$t>())?);
            Ok(<$t>::$from(arr))
        }
    };
}

impl SliceRead for [u8] {
    impl_read_int!(read_be_u32, u32, from_be_bytes);
    impl_read_int!(read_be_u64, u64, from_be_bytes);
    impl_read_int!(read_le_u32, u32, from_le_bytes);
    impl_read_int!(read_le_u64, u64, from_le_bytes);

    fn read_bstring0(&self, offset: usize) -> SliceReadResult<&[u8]> {
        if offset > self.len() {
            return Err(SliceReadError::UnexpectedEndOfInput);
        }
        match self[offset..].iter().position(|&b| b == 0) {
            Some(end) => Ok(&self[offset..offset + end]),
            None => Err(SliceReadError::UnterminatedString),
        }
    }

    fn nread_bstring0(&self, offset: usize, max: usize) -> SliceReadResult<&[u8]> {
        if offset > self.len() {
            return Err(SliceReadError::UnexpectedEndOfInput);
        }
        let window = &self[offset..self.len().min(offset.saturating_add(max))];
        match window.iter().position(|&b| b == 0) {
            Some(end) => Ok(&window[..end]),
            None => Err(SliceReadError::UnterminatedString),
        }
    }

    fn subslice(&self, offset: usize, len: usize) -> SliceReadResult<&[u8]> {
        let end = offset
            .checked_add(len)
            .ok_or(SliceReadError::UnexpectedEndOfInput)?;
        if end > self.len() {
            return Err(SliceReadError::UnexpectedEndOfInput);
        }
        Ok(&self[offset..end])
    }
}
