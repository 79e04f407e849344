//! Dirty-range tracker tests.

use rstest::rstest;
use thriftls::base::{ContentChange, DocumentId, LineRange, Span};
use thriftls::incremental::{ChangeChannel, ChangeEvent, DirtyRangeTracker};

const URI: &str = "file:///demo.thrift";

fn line_edit(line: usize) -> ContentChange {
    ContentChange::replace(Span::from_coords(line, 0, line, 3), "abc")
}

fn thrift_event(changes: Vec<ContentChange>) -> ChangeEvent {
    ChangeEvent::new(URI, "thrift", changes)
}

#[test]
fn test_adjacent_edits_merge() {
    let mut tracker = DirtyRangeTracker::default();
    tracker.mark_changes(&thrift_event(vec![line_edit(2)]), ChangeChannel::Parsing);
    tracker.mark_changes(&thrift_event(vec![line_edit(3)]), ChangeChannel::Parsing);
    let range = tracker
        .consume_dirty_range(&DocumentId::new(URI))
        .expect("pending range");
    assert!(range.contains_range(&LineRange::new(2, 3)));
    assert_eq!(range, LineRange::new(2, 3));
}

#[test]
fn test_consume_clears() {
    let mut tracker = DirtyRangeTracker::default();
    let id = DocumentId::new(URI);
    tracker.mark_changes(&thrift_event(vec![line_edit(1)]), ChangeChannel::Parsing);
    assert!(tracker.consume_dirty_range(&id).is_some());
    assert_eq!(tracker.consume_dirty_range(&id), None);
}

#[rstest]
#[case(vec![2, 3], LineRange::new(2, 3))]
#[case(vec![3, 2], LineRange::new(2, 3))]
#[case(vec![7, 1, 4], LineRange::new(1, 7))]
#[case(vec![5], LineRange::line(5))]
fn test_union_is_order_independent(#[case] lines: Vec<usize>, #[case] expected: LineRange) {
    let mut tracker = DirtyRangeTracker::default();
    for line in lines {
        tracker.mark_changes(&thrift_event(vec![line_edit(line)]), ChangeChannel::Parsing);
    }
    assert_eq!(
        tracker.consume_dirty_range(&DocumentId::new(URI)),
        Some(expected)
    );
}

#[test]
fn test_channels_are_independent() {
    let mut tracker = DirtyRangeTracker::default();
    let id = DocumentId::new(URI);
    tracker.mark_changes(&thrift_event(vec![line_edit(1)]), ChangeChannel::Parsing);
    tracker.mark_changes(&thrift_event(vec![line_edit(8)]), ChangeChannel::Diagnostics);

    assert_eq!(tracker.consume_dirty_range(&id), Some(LineRange::line(1)));
    assert_eq!(
        tracker.consume(&id, ChangeChannel::Diagnostics),
        Some(LineRange::line(8))
    );
    assert_eq!(tracker.consume(&id, ChangeChannel::SemanticTokens), None);
}

#[test]
fn test_non_thrift_documents_create_no_state() {
    let mut tracker = DirtyRangeTracker::default();
    let event = ChangeEvent::new("file:///notes.md", "markdown", vec![line_edit(0)]);
    assert!(!tracker.mark_changes(&event, ChangeChannel::Parsing));
    let id = DocumentId::new("file:///notes.md");
    assert!(!tracker.is_tracked(&id));
    assert_eq!(tracker.consume_dirty_range(&id), None);
}

#[test]
fn test_custom_languages() {
    let mut tracker = DirtyRangeTracker::new(["idl"]);
    let event = ChangeEvent::new("file:///a.idl", "idl", vec![line_edit(0)]);
    assert!(tracker.mark_changes(&event, ChangeChannel::Parsing));
}

#[test]
fn test_shared_event_shifts_each_channel_once() {
    let mut tracker = DirtyRangeTracker::default();
    let id = DocumentId::new(URI);
    let far = thrift_event(vec![line_edit(10)]);
    let lines_added = thrift_event(vec![ContentChange::replace(
        Span::from_coords(2, 0, 2, 0),
        "a\nb\n",
    )]);
    for channel in [ChangeChannel::Parsing, ChangeChannel::Diagnostics] {
        tracker.mark_changes(&far, channel);
        tracker.mark_changes(&lines_added, channel);
    }

    let expected = vec![LineRange::new(2, 4), LineRange::line(12)];
    assert_eq!(tracker.pending(&id, ChangeChannel::Parsing), expected);
    assert_eq!(tracker.pending(&id, ChangeChannel::Diagnostics), expected);
}

#[test]
fn test_full_replacement_stays_on_its_channel() {
    let mut tracker = DirtyRangeTracker::default();
    let id = DocumentId::new(URI);
    tracker.mark_changes(&thrift_event(vec![line_edit(3)]), ChangeChannel::Parsing);
    tracker.mark_changes(
        &thrift_event(vec![ContentChange::full("a\nb\n")]),
        ChangeChannel::Diagnostics,
    );

    assert_eq!(
        tracker.pending(&id, ChangeChannel::Parsing),
        vec![LineRange::line(3)]
    );
    assert_eq!(
        tracker.consume(&id, ChangeChannel::Diagnostics),
        Some(LineRange::new(0, 2))
    );
}
