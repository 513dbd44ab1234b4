//! Property value typing.
//!
//! Property payloads are untyped byte spans on the wire. Both decoders
//! classify them through [`infer_type`] so a value converted between the two
//! formats keeps its semantic type, and re-encoding goes through
//! [`reverse_type`] which trusts the already-decoded tag instead of re-running
//! the byte heuristics.

use core::fmt;
use core::str::from_utf8;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::DevTreeError;
use crate::priv_util::SliceRead;

/// Byte order of a property payload's wire encoding.
///
/// Flattened trees store payloads big-endian, Apple trees little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Big,
    Little,
}

/// Semantic kinds a property payload can classify as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdtValueKind {
    Empty,
    U32,
    U64,
    /// A cross-reference identifier. Wire-identical to [`AdtValueKind::U32`].
    Handle,
    Str,
    StrList,
    Bytes,
}

/// A decoded, semantically typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdtValue {
    Empty,
    U32(u32),
    U64(u64),
    Handle(u32),
    Str(String),
    StrList(Vec<String>),
    Bytes(Vec<u8>),
}

/// The closed table of well-known property names.
///
/// Names listed here classify to the same kind in both formats and in both
/// conversion directions, regardless of payload content.
fn well_known_type(name: &str) -> Option<AdtValueKind> {
    match name {
        "compatible" => Some(AdtValueKind::StrList),
        "model" | "status" | "name" => Some(AdtValueKind::Str),
        "phandle" | "AAPL,phandle" | "linux,phandle" => Some(AdtValueKind::Handle),
        "#size-cells" | "#address-cells" => Some(AdtValueKind::U32),
        _ => None,
    }
}

#[inline]
fn is_print(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| (0x20..=0x7e).contains(&b))
}

/// Classify a raw property payload.
///
/// Consults the well-known name table first, then falls back to byte
/// heuristics: a printable null-terminated span is a string, a bare 4-byte
/// span is guessed to be a u32, anything else stays opaque.
pub fn infer_type(name: &str, value: &[u8]) -> AdtValueKind {
    if let Some(kind) = well_known_type(name) {
        return kind;
    }
    if let Some((&0, head)) = value.split_last() {
        if is_print(head) {
            return AdtValueKind::Str;
        }
    }
    if value.len() == 4 {
        // Guesswork: nothing distinguishes a u32 from 4 opaque bytes.
        return AdtValueKind::U32;
    }
    AdtValueKind::Bytes
}

/// Classify an already-decoded value for re-encoding.
///
/// The well-known name table still wins; otherwise the value's own tag is
/// authoritative and no byte heuristics run.
pub fn reverse_type(name: &str, value: &AdtValue) -> AdtValueKind {
    if let Some(kind) = well_known_type(name) {
        return kind;
    }
    match value {
        AdtValue::Empty => AdtValueKind::Empty,
        AdtValue::U32(_) => AdtValueKind::U32,
        AdtValue::U64(_) => AdtValueKind::U64,
        AdtValue::Handle(_) => AdtValueKind::Handle,
        AdtValue::Str(_) => AdtValueKind::Str,
        AdtValue::StrList(_) => AdtValueKind::StrList,
        AdtValue::Bytes(_) => AdtValueKind::Bytes,
    }
}

impl AdtValue {
    /// Decode a classified payload.
    ///
    /// Fixed-width kinds require an exact payload length; strings are read up
    /// to their null terminator (or the payload end).
    pub fn decode(
        kind: AdtValueKind,
        raw: &[u8],
        order: ByteOrder,
    ) -> Result<AdtValue, DevTreeError> {
        match kind {
            AdtValueKind::Empty => Ok(AdtValue::Empty),
            AdtValueKind::U32 => Ok(AdtValue::U32(decode_u32(raw, order)?)),
            AdtValueKind::U64 => Ok(AdtValue::U64(decode_u64(raw, order)?)),
            AdtValueKind::Handle => Ok(AdtValue::Handle(decode_u32(raw, order)?)),
            AdtValueKind::Str => Ok(AdtValue::Str(decode_str(raw)?.to_string())),
            AdtValueKind::StrList => {
                let mut list = Vec::new();
                let mut off = 0;
                while off < raw.len() {
                    let end = raw[off..]
                        .iter()
                        .position(|&b| b == 0)
                        .map_or(raw.len(), |p| off + p);
                    list.push(from_utf8(&raw[off..end])?.to_string());
                    off = end + 1;
                }
                Ok(AdtValue::StrList(list))
            }
            AdtValueKind::Bytes => Ok(AdtValue::Bytes(raw.to_vec())),
        }
    }

    /// Encode this value as `kind`, appending the payload bytes to `out`.
    ///
    /// Strings regain their null terminators. A kind/tag mismatch (possible
    /// when a hand-built tree fights the well-known name table) is an error.
    pub fn encode(
        &self,
        kind: AdtValueKind,
        order: ByteOrder,
        out: &mut Vec<u8>,
    ) -> Result<(), DevTreeError> {
        match (kind, self) {
            (AdtValueKind::Empty, AdtValue::Empty) => Ok(()),
            (AdtValueKind::U32, AdtValue::U32(v)) | (AdtValueKind::Handle, AdtValue::Handle(v)) => {
                out.extend_from_slice(&order_bytes_u32(*v, order));
                Ok(())
            }
            (AdtValueKind::U64, AdtValue::U64(v)) => {
                out.extend_from_slice(&order_bytes_u64(*v, order));
                Ok(())
            }
            (AdtValueKind::Str, AdtValue::Str(s)) => {
                out.extend_from_slice(s.as_bytes());
                out.push(0);
                Ok(())
            }
            (AdtValueKind::StrList, AdtValue::StrList(list)) => {
                for s in list {
                    out.extend_from_slice(s.as_bytes());
                    out.push(0);
                }
                Ok(())
            }
            (AdtValueKind::Bytes, AdtValue::Bytes(b)) => {
                out.extend_from_slice(b);
                Ok(())
            }
            _ => Err(DevTreeError::ParseError),
        }
    }
}

fn decode_u32(raw: &[u8], order: ByteOrder) -> Result<u32, DevTreeError> {
    if raw.len() != 4 {
        return Err(DevTreeError::ParseError);
    }
    Ok(match order {
        ByteOrder::Big => raw.read_be_u32(0)?,
        ByteOrder::Little => raw.read_le_u32(0)?,
    })
}

fn decode_u64(raw: &[u8], order: ByteOrder) -> Result<u64, DevTreeError> {
    if raw.len() != 8 {
        return Err(DevTreeError::ParseError);
    }
    Ok(match order {
        ByteOrder::Big => raw.read_be_u64(0)?,
        ByteOrder::Little => raw.read_le_u64(0)?,
    })
}

fn decode_str(raw: &[u8]) -> Result<&str, DevTreeError> {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    Ok(from_utf8(&raw[..end])?)
}

fn order_bytes_u32(v: u32, order: ByteOrder) -> [u8; 4] {
    match order {
        ByteOrder::Big => v.to_be_bytes(),
        ByteOrder::Little => v.to_le_bytes(),
    }
}

fn order_bytes_u64(v: u64, order: ByteOrder) -> [u8; 8] {
    match order {
        ByteOrder::Big => v.to_be_bytes(),
        ByteOrder::Little => v.to_le_bytes(),
    }
}

/// Human-readable value rendering shared by `dump` and `diff` output.
impl fmt::Display for AdtValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdtValue::Empty => write!(f, "<>"),
            AdtValue::U32(v) => write!(f, "{:#x}", v),
            AdtValue::U64(v) => write!(f, "{:#x}", v),
            AdtValue::Handle(v) => write!(f, "{:#x}", v),
            AdtValue::Str(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            AdtValue::StrList(list) => {
                let mut first = true;
                for s in list {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "\"{}\"", s.replace('"', "\\\""))?;
                }
                Ok(())
            }
            AdtValue::Bytes(b) => {
                write!(f, "[")?;
                for byte in b {
                    write!(f, "{:02x}", byte)?;
                }
                write!(f, "]")
            }
        }
    }
}
