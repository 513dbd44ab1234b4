//! Shared helpers for the integration tests: an in-memory FDT blob builder
//! and a canned logical tree.
#![allow(dead_code)]

use adt_rs::{AdtNode, AdtProp, AdtValue};

/// Builds syntactically valid flattened device tree blobs for tests.
///
/// Layout: header | memory reservation block | structure block | strings
/// block. The end-of-stream token and the reservation terminator entry are
/// appended by `build`.
pub struct FdtBuilder {
    structs: Vec<u8>,
    strings: Vec<u8>,
    reservations: Vec<(u64, u64)>,
}

impl FdtBuilder {
    pub fn new() -> Self {
        Self {
            structs: Vec::new(),
            strings: Vec::new(),
            reservations: Vec::new(),
        }
    }

    fn pad4(buf: &mut Vec<u8>) {
        while buf.len() % 4 != 0 {
            buf.push(0);
        }
    }

    fn add_string(&mut self, s: &str) -> u32 {
        let off = self.strings.len() as u32;
        self.strings.extend_from_slice(s.as_bytes());
        self.strings.push(0);
        off
    }

    pub fn begin_node(&mut self, name: &str) -> &mut Self {
        self.structs.extend_from_slice(&1u32.to_be_bytes());
        self.structs.extend_from_slice(name.as_bytes());
        self.structs.push(0);
        Self::pad4(&mut self.structs);
        self
    }

    pub fn prop(&mut self, name: &str, value: &[u8]) -> &mut Self {
        let nameoff = self.add_string(name);
        self.structs.extend_from_slice(&3u32.to_be_bytes());
        self.structs
            .extend_from_slice(&(value.len() as u32).to_be_bytes());
        self.structs.extend_from_slice(&nameoff.to_be_bytes());
        self.structs.extend_from_slice(value);
        Self::pad4(&mut self.structs);
        self
    }

    pub fn prop_u32(&mut self, name: &str, value: u32) -> &mut Self {
        self.prop(name, &value.to_be_bytes())
    }

    pub fn prop_str(&mut self, name: &str, value: &str) -> &mut Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.prop(name, &bytes)
    }

    pub fn end_node(&mut self) -> &mut Self {
        self.structs.extend_from_slice(&2u32.to_be_bytes());
        self
    }

    pub fn nop(&mut self) -> &mut Self {
        self.structs.extend_from_slice(&4u32.to_be_bytes());
        self
    }

    /// Force an end-of-stream token mid-structure; later records should be
    /// ignored by the parser.
    pub fn end_stream(&mut self) -> &mut Self {
        self.structs.extend_from_slice(&9u32.to_be_bytes());
        self
    }

    pub fn reserve(&mut self, address: u64, size: u64) -> &mut Self {
        self.reservations.push((address, size));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut structs = self.structs.clone();
        structs.extend_from_slice(&9u32.to_be_bytes());

        let mut rsv = Vec::new();
        for &(address, size) in &self.reservations {
            rsv.extend_from_slice(&address.to_be_bytes());
            rsv.extend_from_slice(&size.to_be_bytes());
        }
        rsv.extend_from_slice(&[0u8; 16]);

        let off_mem_rsvmap = 40u32;
        let off_dt_struct = off_mem_rsvmap + rsv.len() as u32;
        let off_dt_strings = off_dt_struct + structs.len() as u32;
        let totalsize = off_dt_strings + self.strings.len() as u32;

        let mut out = Vec::new();
        out.extend_from_slice(&0xd00d_feedu32.to_be_bytes());
        out.extend_from_slice(&totalsize.to_be_bytes());
        out.extend_from_slice(&off_dt_struct.to_be_bytes());
        out.extend_from_slice(&off_dt_strings.to_be_bytes());
        out.extend_from_slice(&off_mem_rsvmap.to_be_bytes());
        out.extend_from_slice(&17u32.to_be_bytes());
        out.extend_from_slice(&16u32.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&(self.strings.len() as u32).to_be_bytes());
        out.extend_from_slice(&(structs.len() as u32).to_be_bytes());
        out.extend_from_slice(&rsv);
        out.extend_from_slice(&structs);
        out.extend_from_slice(&self.strings);
        out
    }
}

pub fn node_with_props(name: &str, props: Vec<(&str, AdtValue)>) -> AdtNode {
    let mut node = AdtNode::with_name(name);
    for (pname, value) in props {
        node.props.push(AdtProp::new(pname, value));
    }
    node
}
