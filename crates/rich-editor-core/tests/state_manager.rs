use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use rich_editor_core::{
    ClipboardCommand, Command, CommandResult, CursorCommand, EditCommand, EditorStateManager,
    ImeCommand, StateChange, StateChangeType, StyleCommand, TextAttr, TextRange, TextSpanOptions,
    TextStyle,
};

fn edit(command: EditCommand) -> Command {
    Command::Edit(command)
}

fn insert(text: &str) -> Command {
    edit(EditCommand::InsertValue { text: text.into() })
}

fn preview(value: &str) -> Command {
    Command::Ime(ImeCommand::SetPreviewText {
        value: value.into(),
        start: -1,
        end: -1,
    })
}

fn record(manager: &mut EditorStateManager) -> Arc<Mutex<Vec<StateChange>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    manager.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
    log
}

#[test]
fn test_deltas_keep_a_plain_text_mirror_in_sync() {
    let mut manager = EditorStateManager::new();
    let mirror = Arc::new(Mutex::new(String::new()));
    let m = mirror.clone();
    manager.subscribe(move |change| {
        if let Some(delta) = &change.text_delta {
            let mut text = m.lock().unwrap();
            *text = delta.apply_to(&text);
        }
    });

    let script = vec![
        edit(EditCommand::AddTextSpan(TextSpanOptions::new("hello world"))),
        Command::Cursor(CursorCommand::SetCaret { offset: 5 }),
        insert(","),
        Command::Cursor(CursorCommand::SetSelection {
            start: 7,
            end: 12,
            forward: true,
        }),
        insert("there"),
        edit(EditCommand::Undo),
        edit(EditCommand::Redo),
        preview("!"),
        preview("!?"),
        Command::Ime(ImeCommand::FinishTextPreview),
        edit(EditCommand::DeleteBackwardWord),
        preview("x"),
        Command::Ime(ImeCommand::CancelPreview),
        Command::Cursor(CursorCommand::SelectAll),
        Command::Clipboard(ClipboardCommand::Cut),
        edit(EditCommand::Undo),
    ];
    for command in script {
        manager.execute(command).unwrap();
    }

    let content = manager.editor().text_content();
    assert_eq!(*mirror.lock().unwrap(), content);
    assert!(content.starts_with("hello, there"));
}

#[test]
fn test_full_state_snapshot() {
    let mut manager = EditorStateManager::new();
    manager
        .execute(edit(EditCommand::AddTextSpan(TextSpanOptions::new("ab\ncd"))))
        .unwrap();
    manager
        .execute(Command::Cursor(CursorCommand::SetSelection {
            start: 1,
            end: 4,
            forward: false,
        }))
        .unwrap();

    let state = manager.get_full_state();
    assert_eq!(state.document.char_count, 5);
    assert_eq!(state.document.paragraph_count, 2);
    assert_eq!(state.document.span_count, 2);
    assert_eq!(state.selection.selection, TextRange::new(1, 4));
    assert_eq!(state.selection.caret, 1);
    assert_eq!(state.selection.base_offset, 4);
    assert_eq!(state.selection.destination_offset, 1);
    assert!(!state.selection.forward);
    assert!(state.undo_redo.can_undo);
    assert!(!state.preview.active);
    assert!(!state.scroll.auto_scrolling);
    assert_eq!(state.document.version, 2);
}

#[test]
fn test_change_types_follow_commands() {
    let mut manager = EditorStateManager::new();
    let log = record(&mut manager);

    manager.execute(insert("abc")).unwrap();
    manager
        .execute(Command::Cursor(CursorCommand::SetCaret { offset: 1 }))
        .unwrap();
    let bold = TextStyle::new().with(TextAttr::FontWeight(700));
    manager
        .execute(Command::Style(StyleCommand::UpdateSpanStyle {
            start: 0,
            end: 2,
            text_style: Some(bold),
            image_style: None,
        }))
        .unwrap();
    manager.execute(preview("z")).unwrap();
    manager.execute(Command::Ime(ImeCommand::FinishTextPreview)).unwrap();

    let types: Vec<_> = log.lock().unwrap().iter().map(|c| c.change_type).collect();
    assert_eq!(
        types,
        vec![
            StateChangeType::DocumentModified,
            StateChangeType::SelectionChanged,
            StateChangeType::StyleChanged,
            StateChangeType::PreviewChanged,
            StateChangeType::PreviewChanged,
        ]
    );
    let versions: Vec<_> = log
        .lock()
        .unwrap()
        .iter()
        .map(|c| (c.old_version, c.new_version))
        .collect();
    assert_eq!(versions, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
}

#[test]
fn test_no_op_commands_are_silent() {
    let mut manager = EditorStateManager::new();
    manager.execute(insert("abc")).unwrap();
    let version = manager.version();
    let log = record(&mut manager);

    manager.execute(insert("")).unwrap();
    manager
        .execute(edit(EditCommand::DeleteBackward { length: 0 }))
        .unwrap();
    manager
        .execute(Command::Cursor(CursorCommand::SetCaret { offset: 3 }))
        .unwrap();
    let copied = manager
        .execute(Command::Clipboard(ClipboardCommand::Copy))
        .unwrap();
    assert_eq!(copied, CommandResult::Bool(false));
    manager
        .execute(Command::Cursor(CursorCommand::SetCaret { offset: 0 }))
        .unwrap();
    manager
        .execute(edit(EditCommand::DeleteBackward { length: 1 }))
        .unwrap();

    assert_eq!(manager.version(), version + 1);
    assert!(!manager.has_changed_since(version + 1));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_modified_flag_tracks_clean_point() {
    let mut manager = EditorStateManager::new();
    manager.execute(insert("abc")).unwrap();
    assert!(manager.get_document_state().is_modified);

    manager.mark_saved();
    assert!(!manager.get_document_state().is_modified);
    assert!(manager.get_undo_redo_state().is_clean);

    manager.execute(insert("d")).unwrap();
    assert!(manager.get_document_state().is_modified);
    manager.execute(edit(EditCommand::Undo)).unwrap();
    assert!(!manager.get_document_state().is_modified);

    manager.execute(preview("x")).unwrap();
    assert!(manager.get_document_state().is_modified);
    manager.execute(Command::Ime(ImeCommand::CancelPreview)).unwrap();
    assert!(!manager.get_document_state().is_modified);
}

#[test]
fn test_preview_state_follows_composition() {
    let mut manager = EditorStateManager::new();
    manager.execute(insert("ab")).unwrap();
    manager.execute(preview("xy")).unwrap();

    let state = manager.get_preview_state();
    assert!(state.active);
    assert_eq!(state.range, Some(TextRange::new(2, 4)));
    assert_eq!(state.content, "xy");

    manager.execute(Command::Ime(ImeCommand::FinishTextPreview)).unwrap();
    assert!(!manager.get_preview_state().active);
    assert_eq!(manager.editor().text_content(), "abxy");
}
