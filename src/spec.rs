//! Wire-format constants and layouts for both device tree encodings.
//!
//! The flattened (FDT) structures follow the v0.3 specification at
//! <https://www.devicetree.org/>; all of its fields are big-endian. The Apple
//! (ADT) constants describe the fully self-contained little-endian encoding
//! used by Apple boot firmware.

#![allow(non_camel_case_types)]

use endian_type::types::{u32_be, u64_be};
use num_derive::FromPrimitive;

/// Big-endian magic found at offset 0 of a flattened device tree.
pub const FDT_MAGIC: u32 = 0xd00d_feed;

/// Upper bound used when scanning inline node names.
pub const MAX_NODE_NAME_LEN: usize = 256;

/// The flattened device tree header.
#[repr(C)]
pub struct fdt_header {
    pub magic: u32_be,
    pub totalsize: u32_be,
    pub off_dt_struct: u32_be,
    pub off_dt_strings: u32_be,
    pub off_mem_rsvmap: u32_be,
    pub version: u32_be,
    pub last_comp_version: u32_be,
    pub boot_cpuid_phys: u32_be,
    pub size_dt_strings: u32_be,
    pub size_dt_struct: u32_be,
}

/// Header of a property token within the FDT structure block.
#[repr(C)]
pub struct fdt_prop_header {
    pub len: u32_be,
    pub nameoff: u32_be,
}

/// One entry of the FDT memory reservation block.
#[repr(C)]
pub struct fdt_reserve_entry {
    pub address: u64_be,
    pub size: u64_be,
}

// The offset arithmetic in base::tree assumes these exact layouts.
assert_eq_size!(fdt_header, [u8; 40]);
assert_eq_size!(fdt_prop_header, [u8; 8]);
assert_eq_size!(fdt_reserve_entry, [u8; 16]);

/// Token type selectors of the FDT structure block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum FdtTok {
    BeginNode = 0x1,
    EndNode = 0x2,
    Prop = 0x3,
    Nop = 0x4,
    End = 0x9,
}

/// Bits 0-30 of an FDT property's declared size; the top bit is reserved.
pub const FDT_PROP_SIZE_MASK: u32 = 0x7fff_ffff;

/// Exact byte length of an ADT property's padded name field.
pub const ADT_PROP_NAME_LEN: usize = 32;

/// Bits 0-30 of an ADT property's packed size word carry the value length.
pub const ADT_PROP_SIZE_MASK: u32 = 0x7fff_ffff;

/// Bit 31 of an ADT property's packed size word is the template flag.
pub const ADT_PROP_TEMPLATE_FLAG: u32 = 0x8000_0000;

/// ADT records align to 32-bit boundaries, as do FDT tokens.
pub const TOKEN_ALIGNMENT: usize = 4;

/// Round `offset` up to the next token boundary.
#[inline]
pub const fn align_token(offset: usize) -> usize {
    (offset + (TOKEN_ALIGNMENT - 1)) & !(TOKEN_ALIGNMENT - 1)
}
