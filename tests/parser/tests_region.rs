//! Parser Tests - Bounded Parses and Affected Regions

use rstest::rstest;
use thriftls::base::LineRange;
use thriftls::parser::{DEFAULT_REGION_WINDOW, analyze_affected_region, parse, parse_range};
use thriftls::syntax::NodeKind;

use crate::helpers::source_fixtures::*;

#[test]
fn test_parse_range_finds_struct() {
    let fragment = parse_range(STRUCT_AND_SERVICE, 2, 5);
    assert!(
        fragment
            .nodes()
            .iter()
            .any(|&id| fragment.tree[id].kind() == NodeKind::Struct)
    );
    assert!(fragment.errors.is_empty());
}

#[test]
fn test_parse_range_positions_are_absolute() {
    let fragment = parse_range(STRUCT_AND_SERVICE, 6, 8);
    assert_eq!(fragment.len(), 1);
    let service = &fragment.tree[fragment.nodes()[0]];
    assert_eq!(service.name(), Some("TestService"));
    assert_eq!(service.range.start.line, 6);
    assert_eq!(service.range.end.line, 8);
}

#[test]
fn test_parse_range_matches_full_parse_nodes() {
    let full = parse(STRUCT_AND_SERVICE).tree;
    let fragment = parse_range(STRUCT_AND_SERVICE, 2, 5);
    let from_full = full.snapshot_of(full.body()[1]);
    let from_fragment = fragment.tree.snapshot_of(fragment.nodes()[0]);
    assert_eq!(from_full, from_fragment);
}

#[test]
fn test_parse_range_clamps_bounds() {
    let fragment = parse_range(SIMPLE_STRUCT, 0, 100);
    assert_eq!(fragment.len(), 1);
    assert_eq!(fragment.lines.end, 3);
}

#[test]
fn test_edit_on_field_line_covers_struct() {
    let region = analyze_affected_region(STRUCT_AND_SERVICE, LineRange::line(4), DEFAULT_REGION_WINDOW);
    assert!(region.contains_range(&LineRange::new(2, 5)), "{region}");
}

#[rstest]
#[case(3)]
#[case(4)]
fn test_edit_inside_body_is_exactly_struct(#[case] line: usize) {
    let region = analyze_affected_region(STRUCT_AND_SERVICE, LineRange::line(line), DEFAULT_REGION_WINDOW);
    assert_eq!(region, LineRange::new(2, 5));
}

#[test]
fn test_edit_inside_service_covers_service() {
    let region = analyze_affected_region(STRUCT_AND_SERVICE, LineRange::line(7), DEFAULT_REGION_WINDOW);
    assert_eq!(region, LineRange::new(6, 8));
}

#[test]
fn test_multiline_const_is_one_unit() {
    let source = "const map<string, i32> M = {\n  \"a\": 1,\n  \"b\": 2\n}\nstruct S {}\n";
    let region = analyze_affected_region(source, LineRange::line(2), DEFAULT_REGION_WINDOW);
    assert_eq!(region, LineRange::new(0, 3));
}
