extern crate adt_rs;

mod common;

use adt_rs::query::{self, PathMatch};
use adt_rs::{AdtNode, AdtProp, AdtValue, DevTreeError};
use common::node_with_props;

fn ranges_bytes(triples: &[(u32, u32, u32)]) -> AdtValue {
    let mut bytes = Vec::new();
    for &(child, parent, len) in triples {
        bytes.extend_from_slice(&child.to_le_bytes());
        bytes.extend_from_slice(&parent.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
    }
    AdtValue::Bytes(bytes)
}

fn reg_bytes(pairs: &[(u32, u32)]) -> AdtValue {
    let mut bytes = Vec::new();
    for &(addr, len) in pairs {
        bytes.extend_from_slice(&addr.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
    }
    AdtValue::Bytes(bytes)
}

#[test]
fn get_resolves_nested_paths() {
    let mut root = AdtNode::with_name("device-tree");
    let mut bus = AdtNode::with_name("bus");
    bus.children.push(node_with_props(
        "uart",
        vec![("status", AdtValue::Str("okay".to_string()))],
    ));
    root.children.push(bus);

    let hits = query::get(&root, &["bus", "uart", "status"]);
    assert_eq!(hits.len(), 1);
    match hits[0] {
        PathMatch::Prop(p) => assert_eq!(p.value, AdtValue::Str("okay".to_string())),
        PathMatch::Node(_) => panic!("expected property match"),
    }
}

#[test]
fn get_reports_property_and_child_sharing_a_name() {
    let mut root = AdtNode::with_name("device-tree");
    root.props.push(AdtProp::new("twin", AdtValue::U32(1)));
    root.children.push(AdtNode::with_name("twin"));

    let hits = query::get(&root, &["twin"]);
    assert_eq!(hits.len(), 2);
    assert!(matches!(hits[0], PathMatch::Prop(_)));
    assert!(matches!(hits[1], PathMatch::Node(_)));
}

#[test]
fn get_on_missing_path_is_empty() {
    let root = AdtNode::with_name("device-tree");
    assert!(query::get(&root, &["nope"]).is_empty());
    assert!(query::get(&root, &[]).is_empty());
}

#[test]
fn find_collects_all_matches() {
    let mut root = AdtNode::with_name("device-tree");
    let mut bus = AdtNode::with_name("bus");
    bus.children.push(node_with_props(
        "eth0",
        vec![("status", AdtValue::Str("okay".to_string()))],
    ));
    bus.children.push(node_with_props(
        "eth1",
        vec![("status", AdtValue::Str("okay".to_string()))],
    ));
    root.children.push(bus);

    let hits = query::find(&root, "status", &AdtValue::Str("okay".to_string()));
    assert_eq!(
        hits,
        vec![
            vec!["device-tree".to_string(), "bus".to_string(), "eth0".to_string()],
            vec!["device-tree".to_string(), "bus".to_string(), "eth1".to_string()],
        ]
    );
}

#[test]
fn find_by_name() {
    let mut root = AdtNode::with_name("device-tree");
    root.children.push(AdtNode::with_name("target"));
    let hits = query::find(&root, "name", &AdtValue::Str("target".to_string()));
    assert_eq!(
        hits,
        vec![vec!["device-tree".to_string(), "target".to_string()]]
    );
}

#[test]
fn diff_reports_changed_property_and_added_subtree() {
    let mut a = AdtNode::with_name("device-tree");
    a.children.push(node_with_props("foo", vec![("x", AdtValue::U32(1))]));

    let mut b = AdtNode::with_name("device-tree");
    b.children.push(node_with_props("foo", vec![("x", AdtValue::U32(2))]));
    b.children.push(AdtNode::with_name("bar"));

    let report = query::diff(Some(&a), Some(&b));
    assert_eq!(
        report,
        "--- /foo\n\
         +++ /foo\n\
         -x: 0x1\n\
         +x: 0x2\n\
         --- /bar\n\
         +++ /bar (added)\n\
         +name: \"bar\"\n"
    );
}

#[test]
fn diff_reports_deleted_subtree_recursively() {
    let mut a = AdtNode::with_name("device-tree");
    let mut gone = AdtNode::with_name("gone");
    gone.children.push(AdtNode::with_name("inner"));
    a.children.push(gone);
    let b = AdtNode::with_name("device-tree");

    let report = query::diff(Some(&a), Some(&b));
    assert_eq!(
        report,
        "--- /gone\n\
         +++ /gone (deleted)\n\
         -name: \"gone\"\n\
         --- /gone/inner\n\
         +++ /gone/inner (deleted)\n\
         -name: \"inner\"\n"
    );
}

#[test]
fn diff_pairs_same_name_children_positionally() {
    let mut a = AdtNode::with_name("device-tree");
    a.children.push(node_with_props("dup", vec![("x", AdtValue::U32(1))]));
    a.children.push(node_with_props("dup", vec![("x", AdtValue::U32(2))]));

    let mut b = AdtNode::with_name("device-tree");
    b.children.push(node_with_props("dup", vec![("x", AdtValue::U32(1))]));
    b.children.push(node_with_props("dup", vec![("x", AdtValue::U32(3))]));

    let report = query::diff(Some(&a), Some(&b));
    // First pair is identical; only the second (positional) pair differs.
    assert_eq!(
        report,
        "--- /dup\n\
         +++ /dup\n\
         -x: 0x2\n\
         +x: 0x3\n"
    );
}

#[test]
fn diff_of_identical_trees_is_empty() {
    let a = AdtNode::with_name("device-tree");
    assert!(query::diff(Some(&a), Some(&a.clone())).is_empty());
}

fn translation_tree() -> AdtNode {
    let mut root = node_with_props(
        "device-tree",
        vec![
            ("#address-cells", AdtValue::U32(1)),
            ("#size-cells", AdtValue::U32(1)),
        ],
    );
    let mut parent = node_with_props(
        "parent",
        vec![
            ("#address-cells", AdtValue::U32(1)),
            ("#size-cells", AdtValue::U32(1)),
            ("ranges", ranges_bytes(&[(0x1000, 0x2000, 0x100)])),
        ],
    );
    parent.children.push(node_with_props(
        "child",
        vec![("reg", reg_bytes(&[(0x1050, 0x10)]))],
    ));
    root.children.push(parent);
    root
}

#[test]
fn regs_translates_through_ranges() {
    let root = translation_tree();
    let regs = query::regs(&root, &["parent", "child"]).unwrap();
    assert_eq!(regs, vec![(0x2050, 0x10)]);
}

#[test]
fn regs_fails_on_unmapped_address() {
    let mut root = translation_tree();
    root.children[0].children[0].props[1] =
        AdtProp::new("reg", reg_bytes(&[(0x5000, 0x10)]));
    assert_eq!(
        query::regs(&root, &["parent", "child"]).unwrap_err(),
        DevTreeError::UnmappedAddress
    );
}

#[test]
fn regs_passes_through_empty_ranges_level() {
    let mut root = translation_tree();
    // An empty ranges table remaps nothing but raises no error either.
    root.children[0].props[3] = AdtProp::new("ranges", AdtValue::Bytes(Vec::new()));
    let regs = query::regs(&root, &["parent", "child"]).unwrap();
    assert_eq!(regs, vec![(0x1050, 0x10)]);
}

#[test]
fn regs_without_reg_property_is_empty() {
    let mut root = translation_tree();
    root.children[0].children[0].props.retain(|p| p.name != "reg");
    assert!(query::regs(&root, &["parent", "child"]).unwrap().is_empty());
}

#[test]
fn regs_unknown_child_is_not_found() {
    let root = translation_tree();
    assert_eq!(
        query::regs(&root, &["parent", "missing"]).unwrap_err(),
        DevTreeError::NodeNotFound
    );
}

#[test]
fn regs_translates_across_two_levels() {
    let mut root = node_with_props(
        "device-tree",
        vec![
            ("#address-cells", AdtValue::U32(1)),
            ("#size-cells", AdtValue::U32(1)),
        ],
    );
    let mut outer = node_with_props(
        "outer",
        vec![
            ("#address-cells", AdtValue::U32(1)),
            ("#size-cells", AdtValue::U32(1)),
            ("ranges", ranges_bytes(&[(0x0, 0x9000_0000, 0x1_0000)])),
        ],
    );
    let mut inner = node_with_props(
        "inner",
        vec![
            ("#address-cells", AdtValue::U32(1)),
            ("#size-cells", AdtValue::U32(1)),
            ("ranges", ranges_bytes(&[(0x100, 0x1000, 0x100)])),
        ],
    );
    inner.children.push(node_with_props(
        "leaf",
        vec![("reg", reg_bytes(&[(0x120, 0x8)]))],
    ));
    outer.children.push(inner);
    root.children.push(outer);

    // 0x120 -> (inner) 0x1020 -> (outer) 0x9000_1020
    let regs = query::regs(&root, &["outer", "inner", "leaf"]).unwrap();
    assert_eq!(regs, vec![(0x9000_1020, 0x8)]);
}

#[test]
fn regs_supports_two_cell_addresses() {
    let mut root = node_with_props(
        "device-tree",
        vec![
            ("#address-cells", AdtValue::U32(2)),
            ("#size-cells", AdtValue::U32(1)),
        ],
    );
    let mut leaf_reg = Vec::new();
    leaf_reg.extend_from_slice(&0x2_0000_1000u64.to_le_bytes());
    leaf_reg.extend_from_slice(&0x40u32.to_le_bytes());
    root.children.push(node_with_props(
        "leaf",
        vec![("reg", AdtValue::Bytes(leaf_reg))],
    ));

    let regs = query::regs(&root, &["leaf"]).unwrap();
    assert_eq!(regs, vec![(0x2_0000_1000, 0x40)]);
}
