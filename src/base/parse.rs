//! Low level flattened device tree token parsing.

use core::mem::size_of;

use num_traits::FromPrimitive;

use crate::error::DevTreeError;
use crate::priv_util::SliceRead;
use crate::spec::{align_token, fdt_prop_header, FdtTok, FDT_PROP_SIZE_MASK, MAX_NODE_NAME_LEN};

/// Parse the token record at `*off` within the structure block slice.
///
/// On success the offset is advanced past the record (including its
/// alignment padding). `Ok(None)` marks the end-of-stream token; the offset
/// is left pointing after it and no further records should be read.
pub fn next_token<'a>(
    buf: &'a [u8],
    off: &mut usize,
) -> Result<Option<ParsedTok<'a>>, DevTreeError> {
    let fdt_tok_val = buf.read_be_u32(*off)?;
    *off += size_of::<u32>();

    match FromPrimitive::from_u32(fdt_tok_val) {
        Some(FdtTok::BeginNode) => {
            // Read the name (or return an error if the device tree is
            // incorrectly formatted).
            let name = buf.nread_bstring0(*off, MAX_NODE_NAME_LEN - 1)?;

            // Move to the end of name (adding null byte), then re-align.
            *off += name.len() + 1;
            *off = align_token(*off);

            Ok(Some(ParsedTok::BeginNode(ParsedBeginNode { name })))
        }
        Some(FdtTok::Prop) => {
            // Only bits 0-30 of the declared size are meaningful.
            let prop_len = buf.read_be_u32(*off + offset_of!(fdt_prop_header, len))?
                & FDT_PROP_SIZE_MASK;
            let name_offset =
                buf.read_be_u32(*off + offset_of!(fdt_prop_header, nameoff))? as usize;
            *off += size_of::<fdt_prop_header>();

            let prop_buf = buf.subslice(*off, prop_len as usize)?;
            *off += prop_buf.len();
            *off = align_token(*off);

            Ok(Some(ParsedTok::Prop(ParsedProp {
                prop_buf,
                name_offset,
            })))
        }
        Some(FdtTok::EndNode) => Ok(Some(ParsedTok::EndNode)),
        Some(FdtTok::Nop) => Ok(Some(ParsedTok::Nop)),
        Some(FdtTok::End) => Ok(None),
        None => {
            // Invalid token
            Err(DevTreeError::ParseError)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParsedBeginNode<'a> {
    /// Node name bytes, without the terminator. Empty for the root node.
    pub name: &'a [u8],
}

#[derive(Debug, Clone, Copy)]
pub struct ParsedProp<'a> {
    /// Raw value bytes, still untyped at this stage.
    pub prop_buf: &'a [u8],
    /// Offset of the property's name within the strings block.
    ///
    /// Kept symbolic here; resolution needs the strings region which only
    /// the owning [`DevTree`](crate::base::DevTree) can provide.
    pub name_offset: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum ParsedTok<'a> {
    BeginNode(ParsedBeginNode<'a>),
    EndNode,
    Prop(ParsedProp<'a>),
    Nop,
}
