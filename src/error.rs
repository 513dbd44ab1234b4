use crate::priv_util::SliceReadError;
use core::str::Utf8Error;

/// An error describing parsing or query problems for device trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevTreeError {
    /// The magic number FDT_MAGIC was not found at the start of the
    /// structure.
    InvalidMagicNumber,

    /// The header's size and offset fields describe regions which do not fit
    /// the buffer (e.g. the derived memory reservation block size is
    /// negative).
    InconsistentLayout,

    /// Unable to safely read data from the given device tree using the
    /// supplied offset.
    InvalidOffset,

    /// The data was not formatted as expected. This likely indicates an error
    /// in the device tree we're parsing.
    ParseError,

    /// While trying to convert a string that was supposed to be ASCII,
    /// invalid `str` sequences were encountered.
    StrError(Utf8Error),

    /// A path walk could not find a child node with the requested name.
    NodeNotFound,

    /// A register address was not covered by any entry of a non-empty
    /// `ranges` table while translating across address spaces.
    UnmappedAddress,

    /// The requested operation is not implemented for this format.
    Unsupported,
}

impl From<SliceReadError> for DevTreeError {
    fn from(_: SliceReadError) -> DevTreeError {
        DevTreeError::InvalidOffset
    }
}

impl From<Utf8Error> for DevTreeError {
    fn from(e: Utf8Error) -> DevTreeError {
        DevTreeError::StrError(e)
    }
}
