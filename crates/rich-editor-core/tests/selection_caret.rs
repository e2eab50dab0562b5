use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use rich_editor_core::{
    CaretMoveIntent, RichEditor, SpanResult, TextAttr, TextRange, TextSpanOptions, TextStyle,
};

fn editor_with(text: &str) -> RichEditor {
    let mut editor = RichEditor::new();
    editor.add_text_span(TextSpanOptions::new(text));
    editor
}

#[test]
fn test_set_selection_clamps_and_orders() {
    let mut editor = editor_with("hello world");
    assert!(editor.set_selection(20, 6, true));
    assert_eq!(editor.selection(), TextRange::new(6, 11));
    assert_eq!(editor.caret_offset(), 11);
    assert_eq!(editor.selector().base_offset(), 6);
    assert_eq!(editor.selector().destination_offset(), 11);

    editor.set_selection(2, 8, false);
    assert_eq!(editor.caret_offset(), 2);
    assert_eq!(editor.selector().base_offset(), 8);
    assert!(!editor.selector().is_forward());
}

#[test]
fn test_minus_one_pair_clears_selection() {
    let mut editor = editor_with("hello");
    editor.set_selection(1, 3, true);
    assert!(editor.set_selection(-1, -1, true));
    assert!(!editor.selector().has_selection());
    assert_eq!(editor.selector().base_offset(), -1);
    assert_eq!(editor.caret_offset(), 3);
}

#[test]
fn test_equal_offsets_move_caret() {
    let mut editor = editor_with("hello");
    editor.set_selection(-5, -5, true);
    assert_eq!(editor.caret_offset(), 0);
    assert!(!editor.selector().has_selection());
}

#[test]
fn test_select_all() {
    let mut empty = RichEditor::new();
    assert!(empty.select_all());
    assert!(!empty.selector().has_selection());

    let mut editor = editor_with("abc");
    editor.select_all();
    assert_eq!(editor.selection(), TextRange::new(0, 3));
}

#[test]
fn test_left_right_collapse_selection() {
    let mut editor = editor_with("abcdef");
    editor.set_selection(2, 4, true);
    editor.move_caret(CaretMoveIntent::Left);
    assert_eq!(editor.caret_offset(), 2);
    assert!(!editor.selector().has_selection());

    editor.set_selection(2, 4, false);
    editor.move_caret(CaretMoveIntent::Right);
    assert_eq!(editor.caret_offset(), 4);
}

#[test]
fn test_right_steps_over_grapheme() {
    let mut editor = editor_with("e\u{301}x");
    editor.set_caret_offset(0);
    editor.move_caret(CaretMoveIntent::Right);
    assert_eq!(editor.caret_offset(), 2);
    editor.move_caret(CaretMoveIntent::Left);
    assert_eq!(editor.caret_offset(), 0);
}

#[test]
fn test_word_and_paragraph_moves() {
    let mut editor = editor_with("hello world\nnext");
    editor.set_caret_offset(0);
    let mut stops = Vec::new();
    for _ in 0..3 {
        editor.move_caret(CaretMoveIntent::RightWord);
        stops.push(editor.caret_offset());
    }
    assert_eq!(stops, vec![5, 11, 12]);

    editor.move_caret(CaretMoveIntent::LeftWord);
    assert_eq!(editor.caret_offset(), 11);
    editor.move_caret(CaretMoveIntent::LeftWord);
    assert_eq!(editor.caret_offset(), 6);

    editor.set_caret_offset(14);
    editor.move_caret(CaretMoveIntent::ParagraphBegin);
    assert_eq!(editor.caret_offset(), 12);
    editor.move_caret(CaretMoveIntent::ParagraphEnd);
    assert_eq!(editor.caret_offset(), 16);
    editor.move_caret(CaretMoveIntent::Home);
    assert_eq!(editor.caret_offset(), 0);
    editor.move_caret(CaretMoveIntent::End);
    assert_eq!(editor.caret_offset(), 16);
}

#[test]
fn test_handle_select_extends_from_anchor() {
    let mut editor = editor_with("hello world");
    editor.set_caret_offset(6);
    editor.handle_select(CaretMoveIntent::RightWord);
    assert_eq!(editor.selection(), TextRange::new(6, 11));

    editor.handle_select(CaretMoveIntent::Home);
    assert_eq!(editor.selection(), TextRange::new(0, 6));
    assert!(!editor.selector().is_forward());
    assert_eq!(editor.caret_offset(), 0);
}

#[test]
fn test_select_event_only_for_ranges() {
    let mut editor = editor_with("hello");
    let selected = Arc::new(Mutex::new(Vec::new()));
    let s = selected.clone();
    editor
        .events_mut()
        .set_on_select(move |range| s.lock().unwrap().push(range));

    editor.set_caret_offset(2);
    editor.set_selection(1, 4, true);
    editor.move_caret(CaretMoveIntent::End);
    editor.select_all();

    assert_eq!(
        *selected.lock().unwrap(),
        vec![TextRange::new(1, 4), TextRange::new(0, 5)]
    );
}

#[test]
fn test_cursor_blocked_during_preview() {
    let mut editor = editor_with("abc");
    editor.set_preview_text("d", -1, -1);
    assert!(!editor.set_caret_offset(0));
    assert!(!editor.set_selection(0, 2, true));
    assert!(!editor.move_caret(CaretMoveIntent::Home));
    assert!(!editor.handle_select(CaretMoveIntent::Home));
    assert!(!editor.clear_selection());
    assert_eq!(editor.caret_offset(), 4);
    assert!(editor.is_previewing());
}

#[test]
fn test_clear_selection_keeps_caret() {
    let mut editor = editor_with("abcd");
    editor.set_selection(1, 3, true);
    assert!(editor.clear_selection());
    assert_eq!(editor.selector().range(), None);
    assert_eq!(editor.caret_offset(), 3);
    assert!(!editor.clear_selection());
}

#[test]
fn test_selection_spans_reports_overlaps() {
    let mut editor = editor_with("ab");
    let large = TextStyle::new().with(TextAttr::FontSize(20.0));
    editor.add_text_span(TextSpanOptions::new("cd").with_style(large));
    editor.set_selection(1, 3, true);
    let info = editor.selection_spans();
    assert_eq!(info.selection, TextRange::new(1, 3));
    assert_eq!(info.spans.len(), 2);
    let SpanResult::Text(first) = &info.spans[0] else {
        panic!("expected a text span");
    };
    assert_eq!(first.value, "ab");
}
