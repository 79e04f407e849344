//! Parser Tests - Declarations
//!
//! Every Thrift declaration kind, its payload and its ranges.

use rstest::rstest;
use thriftls::base::Span;
use thriftls::parser::parse;
use thriftls::syntax::{NodeData, NodeKind, Requiredness};

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_helpers::*;

// ============================================================================
// Whole documents
// ============================================================================

#[test]
fn test_empty_document_has_empty_body() {
    let parse = parse("");
    assert!(parse.tree.body().is_empty());
    assert!(parse.errors.is_empty());
    assert_eq!(parse.tree.document().kind(), NodeKind::Document);
    assert_eq!(parse.tree.document().parent, None);
}

#[test]
fn test_parse_is_deterministic() {
    let first = parse(FULL_FILE);
    let second = parse(FULL_FILE);
    assert_eq!(first.tree.snapshot(), second.tree.snapshot());
    assert_eq!(first.errors, second.errors);
}

#[test]
fn test_full_file_top_level_kinds() {
    let tree = parse_clean(FULL_FILE);
    assert_eq!(
        top_level_kinds(&tree),
        vec![
            NodeKind::Comment,
            NodeKind::Include,
            NodeKind::Include,
            NodeKind::Namespace,
            NodeKind::Namespace,
            NodeKind::Const,
            NodeKind::Const,
            NodeKind::Const,
            NodeKind::Typedef,
            NodeKind::Enum,
            NodeKind::Enum,
            NodeKind::Comment,
            NodeKind::Struct,
            NodeKind::Union,
            NodeKind::Exception,
            NodeKind::Service,
            NodeKind::Service,
        ]
    );
    assert!(tree.validate().is_ok());
}

#[rstest]
#[case(SIMPLE_STRUCT, NodeKind::Struct, "User")]
#[case(SIMPLE_ENUM, NodeKind::Enum, "Color")]
#[case(SIMPLE_TYPEDEF, NodeKind::Typedef, "UserId")]
#[case("union U {}", NodeKind::Union, "U")]
#[case("exception E {}", NodeKind::Exception, "E")]
#[case("service S {}", NodeKind::Service, "S")]
#[case("const string GREETING = \"hi\"", NodeKind::Const, "GREETING")]
#[case("namespace py demo.api", NodeKind::Namespace, "demo.api")]
fn test_single_declaration(#[case] source: &str, #[case] kind: NodeKind, #[case] name: &str) {
    let tree = parse_clean(source);
    assert_eq!(tree.body().len(), 1);
    let node = &tree[tree.body()[0]];
    assert_eq!(node.kind(), kind);
    assert_eq!(node.name(), Some(name));
}

// ============================================================================
// Payloads
// ============================================================================

#[test]
fn test_struct_fields() {
    let tree = parse_clean(FULL_FILE);
    let user = declaration(&tree, "User");
    assert_eq!(names(&tree, user.fields()), vec!["id", "name", "scores"]);
    assert_eq!(user.annotation("table"), Some("\"users\""));

    let name = &tree[user.fields()[1]];
    match &name.data {
        NodeData::Field {
            field_id,
            requiredness,
            field_type,
            default_value,
        } => {
            assert_eq!(*field_id, Some(2));
            assert_eq!(*requiredness, Requiredness::Optional);
            assert_eq!(field_type.as_str(), "string");
            assert_eq!(default_value.as_deref(), Some("\"anon\""));
        }
        other => panic!("expected a field, got {other:?}"),
    }
    assert_eq!(name.annotation("go.tag"), Some("'json:\"name\"'"));

    let scores = &tree[user.fields()[2]];
    match &scores.data {
        NodeData::Field { field_type, .. } => {
            assert_eq!(field_type.as_str(), "list<map<string, i32>>")
        }
        other => panic!("expected a field, got {other:?}"),
    }
}

#[test]
fn test_enum_members() {
    let tree = parse_clean(FULL_FILE);
    let status = declaration(&tree, "Status");
    assert_eq!(names(&tree, status.members()), vec!["ACTIVE", "DISABLED"]);
    let disabled = &tree[status.members()[1]];
    assert_eq!(disabled.annotation("deprecated"), Some("\"true\""));
    assert!(matches!(
        &disabled.data,
        NodeData::EnumMember { value: Some(v) } if v == "2"
    ));

    let legacy = declaration(&tree, "Legacy");
    assert_eq!(names(&tree, legacy.members()), vec!["old", "older"]);
    assert!(matches!(
        legacy.data,
        NodeData::Enum {
            string_enum: true,
            ..
        }
    ));
}

#[test]
fn test_service_functions() {
    let tree = parse_clean(FULL_FILE);
    let service = declaration(&tree, "UserService");
    assert!(matches!(
        &service.data,
        NodeData::Service { extends: Some(base), .. } if base == "Base"
    ));
    assert_eq!(names(&tree, service.functions()), vec!["get", "touch", "all"]);

    let get = &tree[service.functions()[0]];
    assert_eq!(names(&tree, get.arguments()), vec!["id"]);
    assert_eq!(names(&tree, get.throws()), vec!["missing"]);

    let touch = &tree[service.functions()[1]];
    assert!(matches!(
        &touch.data,
        NodeData::Function { oneway: true, return_type, .. } if return_type == "void"
    ));

    let all = &tree[service.functions()[2]];
    assert_eq!(all.annotation("cached"), Some("\"true\""));
}

#[test]
fn test_const_values() {
    let tree = parse_clean(FULL_FILE);
    let limits = declaration(&tree, "LIMITS");
    assert_eq!(
        limits.data,
        NodeData::Const {
            value_type: "map<string, i32>".into(),
            value: "{ \"low\": 1, \"high\": 10 }".to_string(),
        }
    );
    assert_eq!(limits.range.start.line, 8);
    assert_eq!(limits.range.end.line, 11);
}

#[test]
fn test_includes_and_namespaces() {
    let tree = parse_clean(FULL_FILE);
    let includes: Vec<_> = tree
        .declarations_of(NodeKind::Include)
        .map(|id| tree[id].data.clone())
        .collect();
    assert_eq!(
        includes,
        vec![
            NodeData::Include {
                path: "shared.thrift".into(),
                cpp: false,
            },
            NodeData::Include {
                path: "<vector>".into(),
                cpp: true,
            },
        ]
    );
    let scopes: Vec<_> = tree
        .declarations_of(NodeKind::Namespace)
        .map(|id| tree[id].data.detail())
        .collect();
    assert_eq!(scopes, vec!["go", "*"]);
}

// ============================================================================
// Ranges and parents
// ============================================================================

#[test]
fn test_struct_range_and_name_range() {
    let tree = parse_clean(SIMPLE_STRUCT);
    let user = declaration(&tree, "User");
    assert_eq!(user.range, Span::from_coords(0, 0, 2, 1));
    assert_eq!(user.name_range, Some(Span::from_coords(0, 7, 0, 11)));
    let field = &tree[user.fields()[0]];
    assert_eq!(field.range, Span::from_coords(1, 2, 1, 16));
}

#[test]
fn test_parents_point_at_containers() {
    let tree = parse_clean(FULL_FILE);
    for &top in tree.body() {
        assert_eq!(tree[top].parent, Some(tree.root()));
        for child in tree.children(top) {
            assert_eq!(tree[child].parent, Some(top));
            for grandchild in tree.children(child) {
                assert_eq!(tree[grandchild].parent, Some(child));
            }
        }
    }
}

#[test]
fn test_node_at_finds_deepest() {
    let tree = parse_clean(SIMPLE_STRUCT);
    let id = tree
        .node_at(thriftls::base::Position::new(1, 12))
        .expect("a node at the field name");
    assert_eq!(tree[id].kind(), NodeKind::Field);
    assert_eq!(tree.ancestors(id).len(), 2);
}

#[test]
fn test_utf16_columns() {
    let tree = parse_clean("// ünïcødé 😀\nstruct A {}\n");
    let comment = &tree[tree.body()[0]];
    assert_eq!(comment.range.end, thriftls::base::Position::new(0, 13));
}
