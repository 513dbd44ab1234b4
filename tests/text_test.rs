extern crate adt_rs;

mod common;

use adt_rs::text::{dump, to_dts};
use adt_rs::{AdtNode, AdtProp, AdtValue};
use common::node_with_props;

fn sample_tree() -> AdtNode {
    let mut root = node_with_props(
        "device-tree",
        vec![("model", AdtValue::Str("test".to_string()))],
    );
    let mut chosen = node_with_props(
        "chosen",
        vec![
            ("bootargs", AdtValue::Str("x".to_string())),
            ("#address-cells", AdtValue::U32(0x10)),
            ("raw", AdtValue::Bytes(vec![0x01, 0x02])),
            ("flags", AdtValue::Empty),
            (
                "compatible",
                AdtValue::StrList(vec!["a".to_string(), "b".to_string()]),
            ),
        ],
    );
    chosen.children.push(AdtNode::with_name("leaf"));
    root.children.push(chosen);
    root
}

#[test]
fn dts_renders_canonical_source() {
    let expected = "\
/dts-v1/;

/ {
  model = \"test\";

  chosen {
    bootargs = \"x\";
    #address-cells = <0x10>;
    raw = [0102];
    flags;
    compatible = \"a\",\"b\";

    leaf {
    };
  };
};
";
    assert_eq!(to_dts(&sample_tree()), expected);
}

#[test]
fn dts_escapes_quotes() {
    let root = node_with_props(
        "device-tree",
        vec![("s", AdtValue::Str("a\"b".to_string()))],
    );
    assert!(to_dts(&root).contains("s = \"a\\\"b\";"));
}

#[test]
fn dump_draws_tree_structure() {
    let mut root = node_with_props("device-tree", vec![("a", AdtValue::U32(1))]);
    root.children.push(AdtNode::with_name("c1"));
    let expected = "\
+- [device-tree]
|    name: \"device-tree\"
|    a: 0x1
\\_,
  +- [c1]
       name: \"c1\"
";
    assert_eq!(dump(&root), expected);
}

#[test]
fn dump_marks_nameless_nodes() {
    let mut node = AdtNode::new();
    node.props.push(AdtProp::new("k", AdtValue::U32(2)));
    let out = dump(&node);
    assert!(out.starts_with("+- [<unnamed>]\n"));
}

#[test]
fn dump_is_deterministic() {
    let tree = sample_tree();
    assert_eq!(dump(&tree), dump(&tree));
}

#[test]
fn dump_leader_keeps_bar_for_non_last_children() {
    let mut root = AdtNode::with_name("device-tree");
    let mut first = AdtNode::with_name("first");
    first.children.push(AdtNode::with_name("nested"));
    root.children.push(first);
    root.children.push(AdtNode::with_name("second"));
    let out = dump(&root);

    // "first" is not the last child, so its property lines keep the bar.
    assert!(out.contains("  +- [first]\n  |    name: \"first\"\n"));
    // "second" is last and childless, so its lines drop it.
    assert!(out.contains("  +- [second]\n       name: \"second\"\n"));
}
