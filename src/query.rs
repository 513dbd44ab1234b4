//! Queries over the logical tree: path lookup, search, structural diff and
//! register address translation.

use core::fmt::Write;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::adt::{AdtNode, AdtProp, AdtValue};
use crate::error::DevTreeError;
use crate::priv_util::SliceRead;

/// One hit produced by [`get`].
#[derive(Debug, Clone, Copy)]
pub enum PathMatch<'a> {
    Prop(&'a AdtProp),
    Node(&'a AdtNode),
}

/// Resolve a path of child names, optionally ending in a property name.
///
/// At the final segment the node's own property of that name matches first,
/// then every same-named child. A property and a child sharing a name both
/// match; this ambiguity is part of the query's contract.
#[must_use]
pub fn get<'a>(node: &'a AdtNode, path: &[&str]) -> Vec<PathMatch<'a>> {
    let mut results = Vec::new();
    let head = match path.first() {
        Some(&head) => head,
        None => return results,
    };

    if path.len() == 1 {
        if let Some(prop) = node.prop(head) {
            results.push(PathMatch::Prop(prop));
        }
    }

    for child in &node.children {
        if child.name() == Some(head) {
            if path.len() == 1 {
                results.push(PathMatch::Node(child));
            } else {
                results.extend(get(child, &path[1..]));
            }
        }
    }

    results
}

/// Depth-first search for nodes whose property `pname` equals `pvalue`.
///
/// Returns every match as a full path of node names, the matching node's own
/// name included as the last segment. No early termination.
#[must_use]
pub fn find(node: &AdtNode, pname: &str, pvalue: &AdtValue) -> Vec<Vec<String>> {
    find_in(node, pname, pvalue, &[])
}

fn find_in(node: &AdtNode, pname: &str, pvalue: &AdtValue, path: &[String]) -> Vec<Vec<String>> {
    let mut results = Vec::new();
    let nname = node.display_name().to_string();

    if node.prop_value(pname) == Some(pvalue) {
        let mut hit = path.to_vec();
        hit.push(nname.clone());
        results.push(hit);
    }

    let mut child_path = path.to_vec();
    child_path.push(nname);
    for child in &node.children {
        results.extend(find_in(child, pname, pvalue, &child_path));
    }

    results
}

/// Structural diff of two trees at property granularity.
///
/// The report lists, per differing node path, removed properties (`-key`)
/// then added ones (`+key`); a changed property appears as a removed/added
/// pair. Children are matched by their `name` property; within a group of
/// same-named siblings the pairing is positional, in declaration order.
/// Unmatched children are reported as wholly deleted or added subtrees.
#[must_use]
pub fn diff(a: Option<&AdtNode>, b: Option<&AdtNode>) -> String {
    let mut out = String::new();
    diff_nodes(a, b, &[], &mut out);
    out
}

fn path_string(path: &[String]) -> String {
    let mut s = String::from("/");
    s.push_str(&path.join("/"));
    s
}

fn diff_nodes(a: Option<&AdtNode>, b: Option<&AdtNode>, path: &[String], out: &mut String) {
    static EMPTY: &[AdtProp] = &[];
    let a_props = a.map_or(EMPTY, |n| n.props.as_slice());
    let b_props = b.map_or(EMPTY, |n| n.props.as_slice());

    let mut removed: Vec<&AdtProp> = Vec::new();
    let mut added: Vec<&AdtProp> = Vec::new();
    let mut b_consumed = alloc::vec![false; b_props.len()];

    for ap in a_props {
        match b_props.iter().position(|bp| bp.name == ap.name) {
            None => removed.push(ap),
            Some(i) => {
                if ap.value != b_props[i].value {
                    removed.push(ap);
                    added.push(&b_props[i]);
                }
                b_consumed[i] = true;
            }
        }
    }
    for (i, bp) in b_props.iter().enumerate() {
        if !b_consumed[i] {
            added.push(bp);
        }
    }

    if !removed.is_empty() || !added.is_empty() {
        let p = path_string(path);
        // Infallible: writing to a String.
        writeln!(out, "--- {}", p).unwrap();
        writeln!(out, "+++ {}", p).unwrap();
        for prop in removed {
            writeln!(out, "-{}: {}", prop.name, prop.value).unwrap();
        }
        for prop in added {
            writeln!(out, "+{}: {}", prop.name, prop.value).unwrap();
        }
    }

    // Group b's children by name, preserving declaration order both across
    // and within groups.
    struct Group<'n> {
        name: &'n str,
        nodes: Vec<&'n AdtNode>,
        next: usize,
    }
    let mut b_groups: Vec<Group> = Vec::new();
    if let Some(b) = b {
        for child in &b.children {
            let name = child.display_name();
            match b_groups.iter_mut().find(|g| g.name == name) {
                Some(group) => group.nodes.push(child),
                None => b_groups.push(Group {
                    name,
                    nodes: alloc::vec![child],
                    next: 0,
                }),
            }
        }
    }

    if let Some(a) = a {
        for child in &a.children {
            let name = child.display_name();
            let paired = b_groups.iter_mut().find(|g| g.name == name).and_then(|g| {
                let n = g.nodes.get(g.next).copied();
                g.next += 1;
                n
            });
            match paired {
                Some(b_child) => {
                    let mut child_path = path.to_vec();
                    child_path.push(name.to_string());
                    diff_nodes(Some(child), Some(b_child), &child_path, out);
                }
                None => show_node_changed(child, path, '-', "deleted", out),
            }
        }
    }

    for group in &b_groups {
        for child in group.nodes.iter().skip(group.next) {
            show_node_changed(child, path, '+', "added", out);
        }
    }
}

/// Report a wholly added or deleted subtree, every property prefixed.
fn show_node_changed(node: &AdtNode, path: &[String], prefix: char, label: &str, out: &mut String) {
    let name = node.display_name().to_string();
    let mut node_path = path.to_vec();
    node_path.push(name);
    let p = path_string(&node_path);

    // Infallible: writing to a String.
    writeln!(out, "--- {}", p).unwrap();
    writeln!(out, "+++ {} ({})", p, label).unwrap();
    for prop in &node.props {
        writeln!(out, "{}{}: {}", prefix, prop.name, prop.value).unwrap();
    }

    for child in &node.children {
        show_node_changed(child, &node_path, prefix, label, out);
    }
}

/// One child-bus to parent-bus remapping of a `ranges` table.
struct AddrRange {
    child_address: u64,
    parent_address: u64,
    length: u64,
}

fn cells_value(node: &AdtNode, name: &str) -> Option<u32> {
    match node.prop_value(name) {
        Some(AdtValue::U32(v)) => Some(*v),
        _ => None,
    }
}

/// Read one little-endian cell-encoded number.
fn read_cells(buf: &[u8], off: &mut usize, cells: u32) -> Result<u64, DevTreeError> {
    let v = match cells {
        0 => 0,
        1 => u64::from(buf.read_le_u32(*off)?),
        2 => buf.read_le_u64(*off)?,
        // Wider addresses exist in principle but nothing we parse emits them.
        _ => return Err(DevTreeError::ParseError),
    };
    *off += cells as usize * 4;
    Ok(v)
}

/// A `ranges` or `reg` payload as its raw byte span.
///
/// Payloads short enough to trip the 4-byte u32 heuristic (or long enough to
/// classify as strings) cannot be re-read as cells; that is malformed input.
fn cell_payload(value: &AdtValue) -> Result<&[u8], DevTreeError> {
    match value {
        AdtValue::Bytes(b) => Ok(b),
        AdtValue::Empty => Ok(&[]),
        _ => Err(DevTreeError::ParseError),
    }
}

fn parse_ranges(
    value: &AdtValue,
    child_cells: u32,
    parent_cells: Option<u32>,
    size_cells: u32,
) -> Result<Vec<AddrRange>, DevTreeError> {
    let buf = cell_payload(value)?;
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    // A non-empty table needs the enclosing level's address width.
    let parent_cells = parent_cells.ok_or(DevTreeError::ParseError)?;

    let mut ranges = Vec::new();
    let mut off = 0;
    while off < buf.len() {
        let child_address = read_cells(buf, &mut off, child_cells)?;
        let parent_address = read_cells(buf, &mut off, parent_cells)?;
        let length = read_cells(buf, &mut off, size_cells)?;
        ranges.push(AddrRange {
            child_address,
            parent_address,
            length,
        });
    }
    Ok(ranges)
}

fn parse_regs(
    value: &AdtValue,
    addr_cells: Option<u32>,
    size_cells: Option<u32>,
) -> Result<Vec<(u64, u64)>, DevTreeError> {
    let buf = cell_payload(value)?;
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    let addr_cells = addr_cells.ok_or(DevTreeError::ParseError)?;
    let size_cells = size_cells.ok_or(DevTreeError::ParseError)?;

    let mut regs = Vec::new();
    let mut off = 0;
    while off < buf.len() {
        let address = read_cells(buf, &mut off, addr_cells)?;
        let length = read_cells(buf, &mut off, size_cells)?;
        regs.push((address, length));
    }
    Ok(regs)
}

/// Walk `path` from `root` and translate the leaf's `reg` entries into the
/// outermost address space.
///
/// Every visited node that declares both `#address-cells` and `#size-cells`
/// updates the current cell widths, and its `ranges` table (if any) is pushed
/// onto the address-space stack. The leaf's `reg` is decoded with the
/// last-seen widths and each register is rewritten through the stack from the
/// innermost level outward. A level with ranges but no covering entry fails
/// with [`DevTreeError::UnmappedAddress`]; a level with an empty table passes
/// addresses through untouched. A leaf without `reg` yields no entries.
pub fn regs(root: &AdtNode, path: &[&str]) -> Result<Vec<(u64, u64)>, DevTreeError> {
    let mut node = root;
    let mut remaining = path;
    let mut addrspaces: Vec<Vec<AddrRange>> = Vec::new();
    let mut last_addr_cells: Option<u32> = None;
    let mut last_size_cells: Option<u32> = None;

    let regs = loop {
        if let (Some(addr_cells), Some(size_cells)) = (
            cells_value(node, "#address-cells"),
            cells_value(node, "#size-cells"),
        ) {
            if let Some(ranges) = node.prop_value("ranges") {
                addrspaces.push(parse_ranges(
                    ranges,
                    addr_cells,
                    last_addr_cells,
                    size_cells,
                )?);
            }
            last_addr_cells = Some(addr_cells);
            last_size_cells = Some(size_cells);
        }

        if remaining.is_empty() {
            break match node.prop_value("reg") {
                Some(value) => parse_regs(value, last_addr_cells, last_size_cells)?,
                None => Vec::new(),
            };
        }

        node = node
            .children
            .iter()
            .find(|c| c.name() == Some(remaining[0]))
            .ok_or(DevTreeError::NodeNotFound)?;
        remaining = &remaining[1..];
    };

    let mut resolved = Vec::new();
    for (mut address, length) in regs {
        for addrspace in addrspaces.iter().rev() {
            let covering = addrspace.iter().find(|r| {
                address >= r.child_address
                    && u128::from(address) + u128::from(length)
                        <= u128::from(r.child_address) + u128::from(r.length)
            });
            match covering {
                Some(r) => {
                    address = r
                        .parent_address
                        .checked_add(address - r.child_address)
                        .ok_or(DevTreeError::ParseError)?;
                }
                None => {
                    if !addrspace.is_empty() {
                        return Err(DevTreeError::UnmappedAddress);
                    }
                }
            }
        }
        resolved.push((address, length));
    }

    Ok(resolved)
}
