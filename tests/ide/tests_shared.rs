//! SharedAnalysisHost: per-document shards across threads.

use std::sync::Arc;
use std::thread;

use thriftls::base::{ContentChange, DocumentId, Span, TextDocument};
use thriftls::ide::SharedAnalysisHost;
use thriftls::incremental::IncrementalError;

use crate::helpers::source_fixtures::*;

#[test]
fn test_edit_and_reparse_through_shard() {
    let shared = SharedAnalysisHost::new();
    let mut doc = TextDocument::thrift("file:///s.thrift", STRUCT_AND_SERVICE);
    shared.parse_with_cache(&doc);

    let change = ContentChange::replace(Span::from_coords(2, 7, 2, 17), "Renamed");
    shared.did_change(&mut doc, 1, &[change]).unwrap();
    let result = shared.reparse(&doc).unwrap();
    assert!(!result.full_reparse);
    assert_eq!(result.ast.top_level_names(), vec!["demo", "Renamed", "TestService"]);
}

#[test]
fn test_close_drops_document_state() {
    let shared = SharedAnalysisHost::new();
    let doc = TextDocument::thrift("file:///s.thrift", SIMPLE_ENUM);
    shared.parse_with_cache(&doc);
    assert_eq!(shared.document_count(), 1);

    shared.close(doc.id()).unwrap();
    assert_eq!(shared.document_count(), 0);
    assert_eq!(
        shared.close(doc.id()),
        Err(IncrementalError::UnknownDocument(DocumentId::new("file:///s.thrift")))
    );
}

#[test]
fn test_concurrent_edits_on_separate_documents() {
    let shared = Arc::new(SharedAnalysisHost::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let uri = format!("file:///doc{i}.thrift");
                let mut doc = TextDocument::thrift(uri.as_str(), STRUCT_AND_SERVICE);
                shared.parse_with_cache(&doc);
                for version in 1..=10 {
                    let change = ContentChange::replace(
                        Span::from_coords(4, 5, 4, 8),
                        if version % 2 == 0 { "i32" } else { "i64" },
                    );
                    shared.did_change(&mut doc, version, &[change]).unwrap();
                    shared.reparse(&doc).unwrap();
                }
                shared.parse_with_cache(&doc).top_level_names().len()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 3);
    }
}
