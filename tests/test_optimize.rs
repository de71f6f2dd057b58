use insta::assert_snapshot;
use rstest::rstest;

use nsscope::{PrefixedNamespace, Tree};

fn optimized(xml: &str) -> String {
    let mut tree = Tree::new();
    let root = tree.parse(xml).unwrap();
    tree.optimize_namespaces(root).unwrap();
    tree.to_string(root).unwrap()
}

#[rstest]
#[case::no_namespaces(
    "<root><a><b><c><d><e/></d></c></b></a></root>",
    "<root><a><b><c><d><e/></d></c></b></a></root>"
)]
#[case::only_unused(
    r#"<root xmlns:test0="ns:test0/"><a xmlns:test1="ns:test1/"><b xmlns:test2="ns:test2/"/><c xmlns:test2="ns:test2/"/></a><a xmlns:test1="ns:test1/"><b xmlns:test3="ns:test3/"/><c xmlns:test3="ns:test3/"/></a></root>"#,
    "<root><a><b/><c/></a><a><b/><c/></a></root>"
)]
#[case::empty_default_not_written_at_root(
    r#"<root xmlns=""><a xmlns=""><b xmlns="ns:test1/"><c xmlns="ns:test1/"><d xmlns=""><e xmlns=""><f xmlns="ns:test2/"/></e></d></c></b></a></root>"#,
    r#"<root><a><b xmlns="ns:test1/"><c><d xmlns=""><e><f xmlns="ns:test2/"/></e></d></c></b></a></root>"#
)]
#[case::one_branch_is_default(
    r#"<root xmlns="ns:default-override/"><a xmlns="ns:default-override/"/><test:b xmlns="" xmlns:test="ns:test/"><c test:foo="bar" xmlns="" xmlns:test="ns:test/"/></test:b></root>"#,
    r#"<root xmlns="ns:default-override/"><a/><test:b xmlns="" xmlns:test="ns:test/"><c test:foo="bar"/></test:b></root>"#
)]
#[case::peers_with_same_prefix_but_different_namespace(
    r#"<root><test:a xmlns:test="ns:test1"/><test:b xmlns:test="ns:test1"/><test:c xmlns:test="ns:test2"/><test:d xmlns:test="ns:test2"/></root>"#,
    r#"<root><test:a xmlns:test="ns:test1"/><test:b xmlns:test="ns:test1"/><test:c xmlns:test="ns:test2"/><test:d xmlns:test="ns:test2"/></root>"#
)]
#[case::repeated_default_change(
    r#"<root xmlns="ns:test1/"><a xmlns="ns:test1/"><b xmlns="ns:test2/"><c xmlns="ns:test2/"><d xmlns="ns:test3/"><e xmlns="ns:test3/"><f xmlns="ns:test1/"><g xmlns="ns:test1/"><h xmlns="ns:test4/"/></g></f></e></d></c></b></a></root>"#,
    r#"<root xmlns="ns:test1/"><a><b xmlns="ns:test2/"><c><d xmlns="ns:test3/"><e><f xmlns="ns:test1/"><g><h xmlns="ns:test4/"/></g></f></e></d></c></b></a></root>"#
)]
#[case::repeated_reuse_of_namespace(
    r#"<test1:root xmlns:test1="ns:test/"><test1:a xmlns:test1="ns:test/"><test2:b xmlns:test2="ns:test/"><test2:c xmlns:test2="ns:test/"><test3:d xmlns:test3="ns:test/"><test3:e xmlns:test3="ns:test/"><test1:f xmlns:test1="ns:test/"><test1:g xmlns:test1="ns:test/"><test4:h xmlns:test4="ns:test/"/></test1:g></test1:f></test3:e></test3:d></test2:c></test2:b></test1:a></test1:root>"#,
    r#"<test1:root xmlns:test1="ns:test/"><test1:a><test2:b xmlns:test2="ns:test/"><test2:c><test3:d xmlns:test3="ns:test/"><test3:e><test1:f><test1:g><test4:h xmlns:test4="ns:test/"/></test1:g></test1:f></test3:e></test3:d></test2:c></test2:b></test1:a></test1:root>"#
)]
#[case::repeated_reuse_of_namespace_without_redeclaring(
    r#"<test1:root xmlns:test1="ns:test/"><test2:a xmlns:test2="ns:test/"><test3:b xmlns:test3="ns:test/"><test1:c><test2:d><test3:e/></test2:d></test1:c></test3:b></test2:a></test1:root>"#,
    r#"<test1:root xmlns:test1="ns:test/"><test2:a xmlns:test2="ns:test/"><test3:b xmlns:test3="ns:test/"><test1:c><test2:d><test3:e/></test2:d></test1:c></test3:b></test2:a></test1:root>"#
)]
#[case::repeated_reuse_of_prefix(
    r#"<test:root xmlns:test="ns:test1/"><test:a xmlns:test="ns:test1/"><test:b xmlns:test="ns:test2/"><test:c xmlns:test="ns:test2/"><test:d xmlns:test="ns:test3/"><test:e xmlns:test="ns:test3/"><test:f xmlns:test="ns:test1/"><test:g xmlns:test="ns:test1/"><test:h xmlns:test="ns:test4/"/></test:g></test:f></test:e></test:d></test:c></test:b></test:a></test:root>"#,
    r#"<test:root xmlns:test="ns:test1/"><test:a><test:b xmlns:test="ns:test2/"><test:c><test:d xmlns:test="ns:test3/"><test:e><test:f xmlns:test="ns:test1/"><test:g><test:h xmlns:test="ns:test4/"/></test:g></test:f></test:e></test:d></test:c></test:b></test:a></test:root>"#
)]
#[case::one_element_two_prefixes_one_namespace(
    r#"<root><test1:a xmlns:test1="ns:test"><test2:a xmlns:test2="ns:test" xmlns:test3="ns:test" test3:attr="foo"/></test1:a></root>"#,
    r#"<root><test1:a xmlns:test1="ns:test"><test2:a xmlns:test2="ns:test" xmlns:test3="ns:test" test3:attr="foo"/></test1:a></root>"#
)]
#[case::pruning_exposes_outer_binding(
    r#"<p:root xmlns:p="u2"><c xmlns:p="u1"><p:g xmlns:p="u2"/></c></p:root>"#,
    r#"<p:root xmlns:p="u2"><c><p:g/></c></p:root>"#
)]
#[case::pruning_makes_default_reset_redundant(
    r#"<p:root xmlns:p="x" xmlns="u1"><c xmlns=""/></p:root>"#,
    r#"<p:root xmlns:p="x"><c/></p:root>"#
)]
#[case::text_and_comments_untouched(
    r#"<root xmlns:p="ns"><!--c-->text<p:a xmlns:p="ns">more</p:a><?pi data?></root>"#,
    r#"<root xmlns:p="ns"><!--c-->text<p:a>more</p:a><?pi data?></root>"#
)]
fn test_optimize(#[case] xml: &str, #[case] expected: &str) {
    assert_eq!(optimized(xml), expected);
}

#[test]
fn test_optimize_complex_graph() {
    let xml = concat!(
        r#"<root xmlns="ns:default1/">"#,
        r#"<test1:test xmlns:test1="ns:test1/">"#,
        r#"<foo test1:attr="bar" xmlns="ns:default2/">"#,
        r#"<abc xmlns:test1="ns:test1-override/" test1:override="test"/>"#,
        r#"</foo>"#,
        r#"</test1:test>"#,
        r#"<test1:test xmlns:test1="ns:test1/" xmlns:unused="ns:remove/"/>"#,
        r#"<test><test1:bar xmlns:test1="ns:test1-override/"/></test>"#,
        r#"</root>"#
    );
    assert_snapshot!(
        optimized(xml),
        @r#"<root xmlns="ns:default1/"><test1:test xmlns:test1="ns:test1/"><foo test1:attr="bar" xmlns="ns:default2/"><abc xmlns:test1="ns:test1-override/" test1:override="test"/></foo></test1:test><test1:test xmlns:test1="ns:test1/"/><test><test1:bar xmlns:test1="ns:test1-override/"/></test></root>"#
    );
}

#[test]
fn test_optimize_is_idempotent() {
    let xml = r#"<root xmlns="a" xmlns:p="b"><p:x xmlns="a" xmlns:q="c"><y xmlns=""/></p:x></root>"#;
    let mut tree = Tree::new();
    let root = tree.parse(xml).unwrap();
    tree.optimize_namespaces(root).unwrap();
    let once = tree.to_string(root).unwrap();
    tree.optimize_namespaces(root).unwrap();
    assert_eq!(tree.to_string(root).unwrap(), once);
    assert_eq!(
        once,
        r#"<root xmlns="a" xmlns:p="b"><p:x><y xmlns=""/></p:x></root>"#
    );
}

#[test]
fn test_optimize_unprefixed_attribute_keeps_default() {
    // an unprefixed attribute is in no namespace, but it still looks up the
    // empty prefix, which keeps the default declaration around
    assert_eq!(
        optimized(r#"<p:root xmlns:p="ns" xmlns="d" a="1"/>"#),
        r#"<p:root xmlns:p="ns" xmlns="d" a="1"/>"#
    );
}

#[test]
fn test_optimize_duplicate_declarations_first_wins() {
    let mut tree = Tree::new();
    let root = tree.parse(r#"<root><p:a xmlns:p="first"><p:b/></p:a></root>"#).unwrap();
    let doc = tree.document_element(root).unwrap();
    let a = tree.first_child(doc).unwrap();
    tree.add_namespace_declaration(a, &PrefixedNamespace::new("p", "second").unwrap())
        .unwrap();
    tree.add_namespace_declaration(a, &PrefixedNamespace::new("p", "first").unwrap())
        .unwrap();
    tree.optimize_namespaces(root).unwrap();
    assert_eq!(
        tree.to_string(root).unwrap(),
        r#"<root><p:a xmlns:p="first"><p:b/></p:a></root>"#
    );
}

#[test]
fn test_optimize_element_subtree() {
    let mut tree = Tree::new();
    let root = tree
        .parse(r#"<root xmlns:p="ns" xmlns:u="unused"><p:a xmlns:p="ns" xmlns:v="unused"><p:b xmlns:p="other"/></p:a></root>"#)
        .unwrap();
    let doc = tree.document_element(root).unwrap();
    let a = tree.first_child(doc).unwrap();
    assert_eq!(tree.optimize_namespaces(a).unwrap(), a);
    // declarations outside the subtree stay, even when unused
    assert_eq!(
        tree.to_string(root).unwrap(),
        r#"<root xmlns:p="ns" xmlns:u="unused"><p:a><p:b xmlns:p="other"/></p:a></root>"#
    );
}

#[test]
fn test_optimize_deep_tree() {
    let depth = 20_000;
    let mut tree = Tree::new();
    let root = tree.new_document();
    let binding = PrefixedNamespace::new("p", "ns").unwrap();
    let mut parent = root;
    for _ in 0..depth {
        let element = tree.append_element(parent, &binding, "e").unwrap();
        tree.add_namespace_declaration(element, &binding).unwrap();
        parent = element;
    }
    tree.optimize_namespaces(root).unwrap();
    let declarations = tree
        .descendants(root)
        .filter(|node| tree.is_element(*node))
        .map(|node| tree.attribute_nodes(node).count())
        .sum::<usize>();
    assert_eq!(declarations, 1);
}

#[test]
fn test_optimize_repeated_prefix_after_inherited_binding() {
    // the first declaration restates the inherited binding and goes; the
    // second binds p differently and is what the element resolves p to
    let mut tree = Tree::new();
    let root = tree
        .parse(r#"<p:root xmlns:p="u"><p:a/></p:root>"#)
        .unwrap();
    let doc = tree.document_element(root).unwrap();
    let a = tree.first_child(doc).unwrap();
    tree.add_namespace_declaration(a, &PrefixedNamespace::new("p", "u").unwrap())
        .unwrap();
    tree.add_namespace_declaration(a, &PrefixedNamespace::new("p", "v").unwrap())
        .unwrap();
    assert_eq!(tree.namespace_for_prefix(a, "p"), Some("v"));

    tree.optimize_namespaces(root).unwrap();
    assert_eq!(
        tree.to_string(root).unwrap(),
        r#"<p:root xmlns:p="u"><p:a xmlns:p="v"/></p:root>"#
    );
    assert_eq!(tree.namespace_for_prefix(a, "p"), Some("v"));
}
