//! Reconstruction of the logical tree from the flattened token stream.
//!
//! The flattened form encodes nesting implicitly: a begin-node token is
//! matched by an end-node token at the same depth, with properties and child
//! nodes in between. Reconstruction is a recursive descent over the token
//! list where each call reports how many tokens it consumed, letting the
//! caller resume scanning siblings without a separate stack.

use core::str::from_utf8;

use alloc::vec::Vec;

use crate::adt::{infer_type, AdtNode, AdtProp, AdtValue, ByteOrder};
use crate::base::{DevTree, ParsedTok};
use crate::error::DevTreeError;

/// Name given to the root node when the flattened root's name is empty.
pub const ROOT_NODE_NAME: &str = "device-tree";

/// Convert a flattened device tree into the logical tree model.
pub fn to_adt(fdt: &DevTree) -> Result<AdtNode, DevTreeError> {
    let toks = fdt.tokens()?;
    let (_, root) = node_from_tokens(fdt, &toks, 0)?;
    Ok(root)
}

/// Build one node from `toks[0..]`, which must start with its begin-node
/// token.
///
/// Returns the index of the node's matching end-node token within `toks`;
/// the caller advances by that count and its own loop step moves past the
/// end-node. The index therefore counts every consumed token except the
/// end-node itself (and never the trailing end-of-stream, which the
/// tokenizer does not materialize).
fn node_from_tokens(
    fdt: &DevTree,
    toks: &[ParsedTok],
    depth: usize,
) -> Result<(usize, AdtNode), DevTreeError> {
    let name = match toks.first() {
        Some(ParsedTok::BeginNode(begin)) => from_utf8(begin.name)?,
        _ => return Err(DevTreeError::ParseError),
    };
    // Only the top-level node may go nameless on the wire.
    let name = if depth == 0 && name.is_empty() {
        ROOT_NODE_NAME
    } else {
        name
    };
    let mut node = AdtNode::with_name(name);

    let mut i = 1;
    loop {
        match toks.get(i).ok_or(DevTreeError::ParseError)? {
            ParsedTok::EndNode => break,
            ParsedTok::BeginNode(_) => {
                let (consumed, child) = node_from_tokens(fdt, &toks[i..], depth + 1)?;
                i += consumed;
                node.children.push(child);
            }
            ParsedTok::Prop(prop) => {
                let pname = fdt.string_at(prop.name_offset)?;
                let value = AdtValue::decode(
                    infer_type(pname, prop.prop_buf),
                    prop.prop_buf,
                    ByteOrder::Big,
                )?;
                node.props.push(AdtProp::new(pname, value));
            }
            ParsedTok::Nop => {}
        }
        i += 1;
    }
    Ok((i, node))
}

/// Convert the logical tree into flattened device tree bytes.
///
/// Not implemented; the operation exists so callers have a stable surface.
pub fn to_fdt(_root: &AdtNode) -> Result<Vec<u8>, DevTreeError> {
    Err(DevTreeError::Unsupported)
}
