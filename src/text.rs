//! Text renderings of the logical tree.
//!
//! Two forms: [`to_dts`] produces canonical device tree source (export only,
//! there is no parser for it), [`dump`] produces an ASCII tree drawing for
//! visual inspection. Both are pure functions of the tree content.

use core::fmt::Write;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::adt::{AdtNode, AdtValue};

/// Render a tree as device tree source text.
#[must_use]
pub fn to_dts(root: &AdtNode) -> String {
    let mut out = String::new();
    dts_node(root, 0, &mut out);
    out
}

fn dts_value(value: &AdtValue) -> Option<String> {
    match value {
        AdtValue::Empty => None,
        AdtValue::U32(v) => Some(format!("<{:#x}>", v)),
        AdtValue::U64(v) => Some(format!("<{:#x}>", v)),
        AdtValue::Handle(v) => Some(format!("<{:#x}>", v)),
        AdtValue::Str(s) => Some(format!("\"{}\"", s.replace('"', "\\\""))),
        AdtValue::StrList(list) => {
            let quoted: Vec<String> = list
                .iter()
                .map(|s| format!("\"{}\"", s.replace('"', "\\\"")))
                .collect();
            Some(quoted.join(","))
        }
        AdtValue::Bytes(b) => {
            let mut hex = String::new();
            for byte in b {
                // Infallible: writing to a String.
                write!(hex, "{:02x}", byte).unwrap();
            }
            Some(format!("[{}]", hex))
        }
    }
}

fn dts_node(node: &AdtNode, depth: usize, out: &mut String) {
    let spacing = "  ".repeat(depth);

    if depth == 0 {
        out.push_str("/dts-v1/;\n\n");
    }
    let name = if depth == 0 { "/" } else { node.display_name() };
    out.push_str(&spacing);
    out.push_str(name);
    out.push_str(" {\n");

    for prop in node.props.iter().filter(|p| p.name != "name") {
        out.push_str(&"  ".repeat(depth + 1));
        out.push_str(&prop.name);
        if let Some(rendered) = dts_value(&prop.value) {
            out.push_str(" = ");
            out.push_str(&rendered);
        }
        out.push_str(";\n");
    }

    for child in &node.children {
        out.push('\n');
        dts_node(child, depth + 1, out);
    }

    out.push_str(&spacing);
    out.push_str("};\n");
}

/// Render a tree as an ASCII drawing with per-node property lines.
///
/// Dumping the same tree twice yields byte-identical output.
#[must_use]
pub fn dump(root: &AdtNode) -> String {
    let mut out = String::new();
    dump_node(root, 0, true, &mut out);
    out
}

fn dump_node(node: &AdtNode, depth: usize, last: bool, out: &mut String) {
    let space = "  ".repeat(depth);
    let leader = if last && node.children.is_empty() {
        "    "
    } else {
        "|   "
    };

    out.push_str(&space);
    out.push_str("+- [");
    out.push_str(node.display_name());
    out.push_str("]\n");

    for prop in &node.props {
        out.push_str(&space);
        out.push_str(leader);
        // Infallible: writing to a String.
        writeln!(out, " {}: {}", prop.name, prop.value).unwrap();
    }

    if !node.children.is_empty() {
        out.push_str(&space);
        out.push_str("\\_,\n");
        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            dump_node(child, depth + 1, i + 1 == count, out);
        }
    }
}
