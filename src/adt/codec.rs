//! The vendor (Apple) binary tree codec.
//!
//! The format is fully self-contained and directly recursive: each node is a
//! little-endian property count and child count, that many property records,
//! then that many child nodes of the same shape. There are no offsets into
//! shared tables, so decode and encode are both single forward passes.

use core::mem::size_of;
use core::str::from_utf8;

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::adt::node::{AdtNode, AdtProp};
use crate::adt::value::{infer_type, reverse_type, AdtValue, ByteOrder};
use crate::error::DevTreeError;
use crate::priv_util::SliceRead;
use crate::spec::{
    align_token, ADT_PROP_NAME_LEN, ADT_PROP_SIZE_MASK, ADT_PROP_TEMPLATE_FLAG,
};

/// Decode a vendor-form buffer into the logical tree.
pub fn decode(buf: &[u8]) -> Result<AdtNode, DevTreeError> {
    let mut off = 0;
    let root = decode_node(buf, &mut off)?;
    debug!("decoded ADT root: {:#x} of {:#x} bytes consumed", off, buf.len());
    Ok(root)
}

fn decode_node(buf: &[u8], off: &mut usize) -> Result<AdtNode, DevTreeError> {
    let prop_count = buf.read_le_u32(*off)?;
    *off += size_of::<u32>();
    let child_count = buf.read_le_u32(*off)?;
    *off += size_of::<u32>();

    let mut node = AdtNode::new();
    for _ in 0..prop_count {
        node.props.push(decode_prop(buf, off)?);
    }
    for _ in 0..child_count {
        node.children.push(decode_node(buf, off)?);
    }
    Ok(node)
}

fn decode_prop(buf: &[u8], off: &mut usize) -> Result<AdtProp, DevTreeError> {
    // Exact 32-byte name field, null-padded.
    let name_field = buf.subslice(*off, ADT_PROP_NAME_LEN)?;
    let name_len = name_field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(ADT_PROP_NAME_LEN);
    let name = from_utf8(&name_field[..name_len])?.to_string();
    *off += ADT_PROP_NAME_LEN;

    // One word packs the 31-bit value size and the template flag.
    let word = buf.read_le_u32(*off)?;
    *off += size_of::<u32>();
    let size = (word & ADT_PROP_SIZE_MASK) as usize;
    let template = word & ADT_PROP_TEMPLATE_FLAG != 0;

    let raw = buf.subslice(*off, size)?;
    *off += size;
    *off = align_token(*off);

    let value = AdtValue::decode(infer_type(&name, raw), raw, ByteOrder::Little)?;
    Ok(AdtProp {
        name,
        template,
        value,
    })
}

/// Encode the logical tree back into vendor-form bytes.
///
/// The inverse of [`decode`]: for input that decode produced, the output is
/// byte-identical to the original buffer (the format has no optional padding
/// choices).
pub fn encode(root: &AdtNode) -> Result<Vec<u8>, DevTreeError> {
    let mut out = Vec::new();
    encode_node(root, &mut out)?;
    Ok(out)
}

fn encode_node(node: &AdtNode, out: &mut Vec<u8>) -> Result<(), DevTreeError> {
    out.extend_from_slice(&(node.props.len() as u32).to_le_bytes());
    out.extend_from_slice(&(node.children.len() as u32).to_le_bytes());
    for prop in &node.props {
        encode_prop(prop, out)?;
    }
    for child in &node.children {
        encode_node(child, out)?;
    }
    Ok(())
}

fn encode_prop(prop: &AdtProp, out: &mut Vec<u8>) -> Result<(), DevTreeError> {
    if prop.name.len() > ADT_PROP_NAME_LEN {
        return Err(DevTreeError::ParseError);
    }
    let mut name_field = [0u8; ADT_PROP_NAME_LEN];
    name_field[..prop.name.len()].copy_from_slice(prop.name.as_bytes());
    out.extend_from_slice(&name_field);

    let mut payload = Vec::new();
    prop.value.encode(
        reverse_type(&prop.name, &prop.value),
        ByteOrder::Little,
        &mut payload,
    )?;
    if payload.len() > ADT_PROP_SIZE_MASK as usize {
        return Err(DevTreeError::ParseError);
    }

    let mut word = payload.len() as u32;
    if prop.template {
        word |= ADT_PROP_TEMPLATE_FLAG;
    }
    out.extend_from_slice(&word.to_le_bytes());
    out.extend_from_slice(&payload);
    while out.len() != align_token(out.len()) {
        out.push(0);
    }
    Ok(())
}
