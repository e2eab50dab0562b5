use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rich_editor_core::{
    Command, CommandExecutor, CursorCommand, EditCommand, EditorStateManager, ImageSource,
    ImageSpanOptions, RichEditor, TextAttr, TextSpanOptions, TextStyle,
};

/// Editor holding `paragraphs` paragraphs, alternating plain and bold spans with an image
/// every tenth paragraph.
fn large_editor(paragraphs: usize) -> RichEditor {
    let mut editor = RichEditor::new();
    let bold = TextStyle::new().with(TextAttr::FontWeight(700));
    for i in 0..paragraphs {
        editor.add_text_span(TextSpanOptions::new(format!("{i:06} the quick brown fox ")));
        editor.add_text_span(
            TextSpanOptions::new("jumps over the lazy dog\n").with_style(bold.clone()),
        );
        if i % 10 == 0 {
            editor.add_image_span(ImageSpanOptions::new(ImageSource::new("bench.png")));
        }
    }
    editor.clear_history();
    editor
}

fn bench_build_document(c: &mut Criterion) {
    c.bench_function("build/2k_paragraphs", |b| {
        b.iter(|| {
            let editor = large_editor(black_box(2_000));
            black_box(editor.span_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || {
                let mut executor = CommandExecutor::from_editor(large_editor(2_000));
                let middle = (executor.editor().len() / 2) as i64;
                executor
                    .execute(Command::Cursor(CursorCommand::SetCaret { offset: middle }))
                    .unwrap();
                executor
            },
            |mut executor| {
                for _ in 0..100 {
                    executor
                        .execute(Command::Edit(EditCommand::InsertValue {
                            text: "x".to_string(),
                        }))
                        .unwrap();
                }
                black_box(executor.undo_depth());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_range_delete_and_undo(c: &mut Criterion) {
    c.bench_function("delete_range_undo/1k_offsets", |b| {
        b.iter_batched(
            || large_editor(2_000),
            |mut editor| {
                let start = (editor.len() / 3) as i64;
                editor.set_selection(start, start + 1_000, true);
                editor.delete_backward(1);
                editor.undo().unwrap();
                black_box(editor.len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_state_queries(c: &mut Criterion) {
    let mut manager = EditorStateManager::from_executor(CommandExecutor::from_editor(
        large_editor(2_000),
    ));
    manager
        .execute(Command::Cursor(CursorCommand::SetSelection {
            start: 100,
            end: 5_000,
            forward: true,
        }))
        .unwrap();

    c.bench_function("state/full_snapshot_and_selection_spans", |b| {
        b.iter(|| {
            black_box(manager.get_full_state());
            black_box(manager.editor().selection_spans().spans.len());
        })
    });
}

criterion_group!(
    benches,
    bench_build_document,
    bench_typing_in_middle,
    bench_range_delete_and_undo,
    bench_state_queries
);
criterion_main!(benches);
