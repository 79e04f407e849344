//! End-to-end tests for AnalysisHost: cached and incremental parsing.

use std::sync::Arc;

use rstest::rstest;
use thriftls::base::{ContentChange, LineRange, Span, TextDocument};
use thriftls::ide::AnalysisHost;
use thriftls::incremental::{IncrementalError, IncrementalOptions};
use thriftls::parser::parse;
use thriftls::syntax::{NodeKind, SyntaxTree};
use tokio_util::sync::CancellationToken;

use crate::helpers::source_fixtures::*;
use crate::helpers::tree_helpers::*;

const URI: &str = "file:///demo.thrift";

fn open(host: &mut AnalysisHost, text: &str) -> TextDocument {
    let doc = TextDocument::thrift(URI, text);
    host.parse_with_cache(&doc);
    doc
}

fn edit(host: &mut AnalysisHost, doc: &mut TextDocument, range: Span, text: &str) {
    let version = doc.version() + 1;
    host.did_change(doc, version, &[ContentChange::replace(range, text)])
        .unwrap();
}

fn assert_matches_full_parse(tree: &SyntaxTree, text: &str) {
    let full = parse(text).tree;
    assert_eq!(tree.snapshot(), full.snapshot());
    assert!(tree.validate().is_ok());
}

#[test]
fn test_parse_with_cache_reuses_tree() {
    let mut host = AnalysisHost::new();
    let doc = TextDocument::thrift(URI, SIMPLE_STRUCT);
    let first = host.parse_with_cache(&doc);
    let second = host.parse_with_cache(&doc);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(host.is_cached(doc.id()));
}

#[test]
fn test_parse_with_cache_misses_after_change() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, SIMPLE_STRUCT);
    let first = host.parse_with_cache(&doc);
    edit(&mut host, &mut doc, Span::from_coords(0, 7, 0, 11), "Account");
    let second = host.parse_with_cache(&doc);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.top_level_names(), vec!["Account"]);
}

#[test]
fn test_edit_inside_struct_reparses_its_region() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    edit(&mut host, &mut doc, Span::from_coords(4, 5, 4, 8), "i64");

    let result = host.reparse(&doc).unwrap();
    assert_eq!(result.region, Some(LineRange::new(2, 5)));
    assert!(!result.full_reparse);
    assert_eq!(result.affected_nodes.len(), 1);
    assert_eq!(result.affected_nodes[0].name.as_deref(), Some("TestStruct"));
    assert_eq!(result.new_nodes.len(), 1);
    assert_eq!(result.ast[result.new_nodes[0]].kind(), NodeKind::Struct);
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_inserted_line_shifts_following_service() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    edit(&mut host, &mut doc, Span::from_coords(4, 0, 4, 0), "  3: bool active,\n");

    let result = host.reparse(&doc).unwrap();
    assert_eq!(result.region, Some(LineRange::new(2, 6)));
    let service = declaration(&result.ast, "TestService");
    assert_eq!(service.range.start.line, 7);
    let fields = declaration(&result.ast, "TestStruct").fields();
    assert_eq!(names(&result.ast, fields), vec!["name", "active", "id"]);
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_deleted_declaration_leaves_gap() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    edit(&mut host, &mut doc, Span::from_coords(6, 0, 9, 0), "");

    let result = host.reparse(&doc).unwrap();
    assert!(!result.full_reparse);
    assert!(result.new_nodes.is_empty());
    assert_eq!(result.affected_nodes[0].name.as_deref(), Some("TestService"));
    assert_eq!(
        top_level_kinds(&result.ast),
        vec![NodeKind::Namespace, NodeKind::Struct]
    );
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_repeated_region_content_hits_region_cache() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);

    edit(&mut host, &mut doc, Span::from_coords(3, 12, 3, 16), "title");
    let first = host.reparse(&doc).unwrap();
    assert!(!first.region_cache_hit);

    edit(&mut host, &mut doc, Span::from_coords(3, 12, 3, 17), "name");
    let reverted = host.reparse(&doc).unwrap();
    assert!(!reverted.region_cache_hit);

    edit(&mut host, &mut doc, Span::from_coords(3, 12, 3, 16), "title");
    let again = host.reparse(&doc).unwrap();
    assert!(again.region_cache_hit);
    assert_eq!(again.region, Some(LineRange::new(2, 5)));
    assert_matches_full_parse(&again.ast, doc.text());
}

#[test]
fn test_region_cache_can_be_disabled() {
    let mut host = AnalysisHost::with_options(IncrementalOptions::default().with_region_cache(false));
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    for text in ["title", "name", "title"] {
        let end = if text == "name" { 17 } else { 16 };
        edit(&mut host, &mut doc, Span::from_coords(3, 12, 3, end), text);
        assert!(!host.reparse(&doc).unwrap().region_cache_hit);
    }
}

#[test]
fn test_closing_brace_early_pulls_in_following_units() {
    let old = "struct A {\n  1: i32 x\n\n  2: i32 y\n}\n";
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, old);
    edit(&mut host, &mut doc, Span::from_coords(0, 10, 0, 10), "}");

    let result = host.reparse(&doc).unwrap();
    assert!(!result.full_reparse);
    // Lines 2 and 3 became units of their own; the old struct ran to line 4
    assert_eq!(result.region, Some(LineRange::new(0, 4)));
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_expansion_limit_falls_back_to_full_parse() {
    let old = "struct A {\n  1: i32 x\n\n  2: i32 y\n}\n";
    let options = IncrementalOptions::default().with_max_region_expansions(0);
    let mut host = AnalysisHost::with_options(options);
    let mut doc = open(&mut host, old);
    edit(&mut host, &mut doc, Span::from_coords(0, 10, 0, 10), "}");

    let result = host.reparse(&doc).unwrap();
    assert!(result.full_reparse);
    assert_eq!(result.region, None);
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_full_replacement_reparses_everything() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    host.did_change(&mut doc, 2, &[ContentChange::full(FULL_FILE)])
        .unwrap();

    let result = host.reparse(&doc).unwrap();
    assert_matches_full_parse(&result.ast, FULL_FILE);
}

#[test]
fn test_reparse_without_changes_returns_cached_tree() {
    let mut host = AnalysisHost::new();
    let doc = open(&mut host, STRUCT_AND_SERVICE);
    let cached = host.cached_tree(doc.id()).unwrap();
    let result = host.reparse(&doc).unwrap();
    assert!(Arc::ptr_eq(&cached, &result.ast));
    assert!(result.region.is_none());
}

#[test]
fn test_first_reparse_is_full() {
    let mut host = AnalysisHost::new();
    let doc = TextDocument::thrift(URI, STRUCT_AND_SERVICE);
    let result = host.reparse(&doc).unwrap();
    assert!(result.full_reparse);
    assert_eq!(result.new_nodes.len(), 3);
}

#[test]
fn test_cancelled_parse_is_not_cached() {
    let mut host = AnalysisHost::new();
    let doc = TextDocument::thrift(URI, FULL_FILE);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = host.parse_with_cache_cancellable(&doc, &cancel);
    assert!(result.cancelled);
    assert!(!host.is_cached(doc.id()));

    let result = host.parse_with_cache_cancellable(&doc, &CancellationToken::new());
    assert!(!result.cancelled);
    assert!(host.is_cached(doc.id()));
}

#[test]
fn test_diagnostics_follow_edits() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    assert!(host.diagnostics(doc.id()).is_empty());

    edit(&mut host, &mut doc, Span::from_coords(3, 12, 3, 16), "");
    host.reparse(&doc).unwrap();
    let errors = host.diagnostics(doc.id());
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e.range.start.line == 3));

    edit(&mut host, &mut doc, Span::from_coords(3, 12, 3, 12), "name");
    host.reparse(&doc).unwrap();
    assert!(host.diagnostics(doc.id()).is_empty());
}

#[test]
fn test_clear_document_cache() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    edit(&mut host, &mut doc, Span::from_coords(4, 5, 4, 8), "i64");
    host.reparse(&doc).unwrap();

    assert!(host.clear_document_cache(doc.id()));
    assert!(!host.is_cached(doc.id()));
    assert!(host.get_cached_ast_range(doc.id(), LineRange::new(2, 5), "").is_none());
    assert!(!host.clear_document_cache(doc.id()));

    let result = host.reparse(&doc).unwrap();
    assert!(result.full_reparse);
}

#[rstest]
#[case("proto")]
#[case("plaintext")]
fn test_other_languages_are_rejected(#[case] language: &str) {
    let mut host = AnalysisHost::new();
    let doc = TextDocument::new(URI, language, 0, "struct A {}\n");
    let err = host.reparse(&doc).unwrap_err();
    assert!(matches!(err, IncrementalError::UnsupportedLanguage { .. }));
}

#[rstest]
#[case(Span::from_coords(3, 12, 3, 16), "title")]
#[case(Span::from_coords(2, 7, 2, 17), "Renamed")]
#[case(Span::from_coords(5, 1, 5, 1), "\nconst i32 X = 1")]
#[case(Span::from_coords(7, 2, 7, 12), "string")]
#[case(Span::from_coords(0, 0, 1, 0), "")]
fn test_incremental_matches_full_parse(#[case] range: Span, #[case] text: &str) {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, STRUCT_AND_SERVICE);
    edit(&mut host, &mut doc, range, text);
    let result = host.reparse(&doc).unwrap();
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_closing_a_comment_reparses_the_lines_it_uncovers() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, "foo /*\nstruct A {}\n\nstruct B {}\n");
    assert!(host.cached_tree(doc.id()).unwrap().top_level_names().is_empty());
    edit(&mut host, &mut doc, Span::from_coords(1, 0, 1, 0), "*/");

    let result = host.reparse(&doc).unwrap();
    assert!(!result.full_reparse);
    // `struct A` shares its line with the comment's end, so recovery eats it
    assert_eq!(result.ast.top_level_names(), vec!["B"]);
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_opening_a_comment_hides_the_lines_after_it() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, "struct A {}\n\nstruct B {}\n\nstruct C {}\n");
    edit(&mut host, &mut doc, Span::from_coords(0, 0, 0, 0), "/*");

    let result = host.reparse(&doc).unwrap();
    assert!(result.ast.top_level_names().is_empty());
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_annotation_typed_below_closing_line_stays_orphaned() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, "struct A {\n}\n\nstruct B {}\n");
    edit(&mut host, &mut doc, Span::from_coords(2, 0, 2, 0), "(x = 1)");

    let result = host.reparse(&doc).unwrap();
    assert_eq!(result.region, Some(LineRange::line(2)));
    assert_eq!(
        top_level_kinds(&result.ast),
        vec![NodeKind::Struct, NodeKind::Annotation, NodeKind::Struct]
    );
    assert_matches_full_parse(&result.ast, doc.text());
}

#[test]
fn test_rejected_batch_keeps_tree_in_step_with_buffer() {
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, "struct A {}\n");
    let changes = [
        ContentChange::replace(Span::from_coords(0, 7, 0, 8), "Renamed"),
        ContentChange::replace(Span::from_coords(0, 5, 0, 1), ""),
    ];
    let err = host.did_change(&mut doc, 1, &changes).unwrap_err();
    assert!(matches!(err, IncrementalError::Document(_)));
    assert_eq!(doc.text(), "struct A {}\n");
    assert_eq!(host.consume_dirty_range(doc.id()), None);

    edit(&mut host, &mut doc, Span::from_coords(0, 8, 0, 8), "B");
    let result = host.reparse(&doc).unwrap();
    assert_eq!(result.ast.top_level_names(), vec!["AB"]);
    assert_matches_full_parse(&result.ast, doc.text());
}

/// xorshift64, so every seed replays the same edit sequence
struct EditRng(u64);

impl EditRng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const SNIPPETS: &[&str] = &[
    "{",
    "}",
    "/*",
    "*/",
    "(x = 1)",
    "(",
    ")",
    "\n",
    "\n\n",
    "struct S {",
    "1: i32 f,",
    "enum E { A = 1 }\n",
    "// c",
    "\"s\"",
    "",
];

/// A random single-range edit over an ASCII document
fn random_edit(rng: &mut EditRng, text: &str) -> (Span, &'static str) {
    let lines: Vec<&str> = text.split('\n').collect();
    let start_line = rng.below(lines.len());
    let start_col = rng.below(lines[start_line].len() + 1);
    let (end_line, end_col) = if rng.below(3) == 0 {
        let end_line = (start_line + rng.below(3)).min(lines.len() - 1);
        let from = if end_line == start_line { start_col } else { 0 };
        (end_line, from + rng.below(lines[end_line].len() - from + 1))
    } else {
        (start_line, start_col)
    };
    let snippet = SNIPPETS[rng.below(SNIPPETS.len())];
    (
        Span::from_coords(start_line, start_col, end_line, end_col),
        snippet,
    )
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(42)]
#[case(1234)]
#[case(0x5eed)]
#[case(987_654_321)]
fn test_random_edit_sequence_matches_full_parse(#[case] seed: u64) {
    let mut rng = EditRng(seed);
    let mut host = AnalysisHost::new();
    let mut doc = open(&mut host, FULL_FILE);
    for step in 0..60 {
        let (range, text) = random_edit(&mut rng, doc.text());
        edit(&mut host, &mut doc, range, text);
        let result = host.reparse(&doc).unwrap();
        let full = parse(doc.text()).tree;
        assert_eq!(
            result.ast.snapshot(),
            full.snapshot(),
            "seed {seed}, step {step}: {range:?} <- {text:?}\n{}",
            doc.text()
        );
        assert!(result.ast.validate().is_ok());
    }
}
