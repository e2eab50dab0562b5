use pretty_assertions::assert_eq;
use rich_editor_core::{
    Clipboard, ClipboardData, DragPayload, DragStatus, EditOutcome, EditorError, ImageSource,
    ImageSpanOptions, InMemoryClipboard, RecordType, RichEditor, SpanKind, TextAttr, TextRange,
    TextSpanOptions, TextStyle,
};

fn editor_with(text: &str) -> RichEditor {
    let mut editor = RichEditor::new();
    editor.add_text_span(TextSpanOptions::new(text));
    editor
}

fn drag(editor: &mut RichEditor, start: i64, end: i64, drop: i64) -> EditOutcome {
    editor.set_selection(start, end, true);
    let payload = editor.on_drag_start().unwrap();
    editor.set_caret_offset(drop);
    let outcome = editor
        .handle_on_drag_drop_text_operation(&payload.plain_text, true)
        .unwrap();
    editor.on_drag_end();
    outcome
}

#[test]
fn test_move_forward() {
    let mut editor = editor_with("one two three");
    assert!(drag(&mut editor, 0, 4, 8).is_applied());
    assert_eq!(editor.text_content(), "two one three");
    assert_eq!(editor.caret_offset(), 8);
    assert_eq!(editor.last_record_type(), Some(RecordType::Drag));
    assert_eq!(editor.drag_status(), DragStatus::None);
    assert_eq!(editor.span_count(), 1);
}

#[test]
fn test_move_backward() {
    let mut editor = editor_with("one two three");
    assert!(drag(&mut editor, 8, 13, 0).is_applied());
    assert_eq!(editor.text_content(), "threeone two ");
    assert_eq!(editor.caret_offset(), 5);
}

#[test]
fn test_move_is_one_undo_step() {
    let mut editor = editor_with("abcdef");
    let depth = editor.undo_depth();
    drag(&mut editor, 0, 2, 6);
    assert_eq!(editor.text_content(), "cdefab");
    assert_eq!(editor.undo_depth(), depth + 1);

    editor.undo().unwrap();
    assert_eq!(editor.text_content(), "abcdef");
    editor.redo().unwrap();
    assert_eq!(editor.text_content(), "cdefab");
}

#[test]
fn test_move_keeps_styles_and_images() {
    let mut editor = editor_with("ab");
    editor.add_image_span(ImageSpanOptions::new(ImageSource::new("i.png")));
    let bold = TextStyle::new().with(TextAttr::FontWeight(700));
    editor.add_text_span(TextSpanOptions::new("cd").with_style(bold.clone()));

    drag(&mut editor, 1, 4, 0);
    assert_eq!(editor.text_content(), "b\u{FFFC}cad");
    let kinds: Vec<_> = editor.document().spans().iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![SpanKind::Text, SpanKind::Image, SpanKind::Text, SpanKind::Text, SpanKind::Text]
    );
    assert_eq!(editor.document().spans()[2].text_style(), &bold);
    assert!(editor.document().is_consistent());
}

#[test]
fn test_receiver_inserts_text_at_caret() {
    let mut source = editor_with("hello");
    source.set_selection(0, 5, true);
    let payload = source.on_drag_start().unwrap();

    let mut target = editor_with("[]");
    target.set_caret_offset(1);
    let outcome = target
        .handle_on_drag_drop_text_operation(&payload.plain_text, false)
        .unwrap();
    assert_eq!(outcome, EditOutcome::Applied);
    assert_eq!(target.text_content(), "[hello]");
    assert_eq!(target.caret_offset(), 6);
    assert_eq!(source.text_content(), "hello");
}

#[test]
fn test_sponsor_drop_without_session() {
    let mut editor = editor_with("abc");
    let err = editor
        .handle_on_drag_drop_text_operation("x", true)
        .unwrap_err();
    assert!(matches!(err, EditorError::NoDragSession));
}

#[test]
fn test_custom_drag_start_payload_keeps_selection() {
    let mut editor = editor_with("abcdef");
    editor.events_mut().set_on_drag_start(|info| DragPayload {
        plain_text: format!("<{}>", info.plain_text),
        ..DragPayload::default()
    });
    editor.set_selection(1, 3, true);
    let payload = editor.on_drag_start().unwrap();
    assert_eq!(payload.plain_text, "<bc>");
    assert_eq!(editor.selection(), TextRange::new(1, 3));
    assert!(editor.is_drag_sponsor());
}

#[test]
fn test_vetoed_drop_keeps_session() {
    let mut editor = editor_with("abcdef");
    editor.set_selection(0, 2, true);
    let payload = editor.on_drag_start().unwrap();
    editor.events_mut().set_on_will_change(|_| false);
    editor.set_caret_offset(6);
    let outcome = editor
        .handle_on_drag_drop_text_operation(&payload.plain_text, true)
        .unwrap();
    assert_eq!(outcome, EditOutcome::Vetoed);
    assert_eq!(editor.text_content(), "abcdef");
    assert_eq!(editor.drag_range(), Some(TextRange::new(0, 2)));
}

#[test]
fn test_copy_paste_between_editors() {
    let shared = InMemoryClipboard::new();
    let mut source = editor_with("ab");
    source.add_image_span(ImageSpanOptions::new(ImageSource::new("i.png")));
    source.set_clipboard(Box::new(shared.clone()));
    source.select_all();
    assert!(source.copy().unwrap());

    let data = shared.read().unwrap();
    assert_eq!(data.plain_text, "ab");
    assert_eq!(data.spans().unwrap().map(|s| s.len()), Some(2));

    let mut target = editor_with("xy");
    target.set_clipboard(Box::new(shared));
    target.set_caret_offset(1);
    assert!(target.paste().unwrap().is_applied());
    assert_eq!(target.text_content(), "xab\u{FFFC}y");
    assert_eq!(target.caret_offset(), 4);
}

#[test]
fn test_cut_is_undoable() {
    let mut editor = editor_with("hello world");
    editor.set_selection(5, 11, true);
    assert!(editor.cut().unwrap().is_applied());
    assert_eq!(editor.text_content(), "hello");

    editor.undo().unwrap();
    assert_eq!(editor.text_content(), "hello world");
    assert_eq!(editor.selection(), TextRange::new(5, 11));
}

#[test]
fn test_paste_plain_text_over_selection() {
    let mut clipboard = InMemoryClipboard::new();
    clipboard.write(ClipboardData::plain("XYZ"));
    let mut editor = editor_with("abcdef");
    editor.set_clipboard(Box::new(clipboard));
    editor.set_selection(1, 5, true);
    editor.paste().unwrap();
    assert_eq!(editor.text_content(), "aXYZf");
}

#[test]
fn test_paste_with_empty_clipboard() {
    let mut editor = editor_with("abc");
    assert_eq!(editor.paste().unwrap(), EditOutcome::Unchanged);
    assert!(!editor.copy().unwrap());
}
