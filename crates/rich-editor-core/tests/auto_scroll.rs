use pretty_assertions::assert_eq;
use rich_editor_core::autoscroll::{
    AutoScrollEvent, AutoScrollParam, AutoScroller, EdgeDetectionStrategy, OffsetF, RectF,
    ScrollGeometry,
};
use rich_editor_core::{AutoScrollConfig, RichEditor, ScrollSource, TextSpanOptions};

const CONTENT_TOP: f32 = 100.0;

/// Content area 100..300, text 600 tall scrolled 50px down from its top.
fn scrolled_scroller() -> AutoScroller {
    let mut scroller = AutoScroller::new(AutoScrollConfig::default());
    scroller.set_geometry(ScrollGeometry {
        content_rect: RectF::new(0.0, CONTENT_TOP, 300.0, 200.0),
        frame_rect: RectF::new(0.0, CONTENT_TOP - 10.0, 300.0, 220.0),
        rich_text_rect: RectF::new(0.0, CONTENT_TOP - 50.0, 300.0, 600.0),
    });
    scroller
}

fn mouse_at(scroller: &mut AutoScroller, y: f32) -> bool {
    scroller.auto_scroll_by_edge_detection(
        AutoScrollParam::new(AutoScrollEvent::Mouse),
        OffsetF::new(10.0, y),
        EdgeDetectionStrategy::OutBoundary,
    )
}

#[test]
fn test_pointer_inside_top_band_starts_scrolling() {
    let mut scroller = scrolled_scroller();
    let edge = scroller.config().edge_distance_px();

    assert!(mouse_at(&mut scroller, CONTENT_TOP + edge - 1.0));
    assert!(scroller.is_auto_scrolling());
    let offset = scroller.current_param().map(|p| p.offset).unwrap_or_default();
    assert!(offset > 0.0);
    // The first step runs immediately.
    assert_eq!(scroller.scroll_offset(), -50.0 + offset);
}

#[test]
fn test_pointer_outside_band_stays_idle() {
    let mut scroller = scrolled_scroller();
    let edge = scroller.config().edge_distance_px();

    assert!(!mouse_at(&mut scroller, CONTENT_TOP + edge + 1.0));
    assert!(!scroller.is_auto_scrolling());
    assert_eq!(scroller.scroll_offset(), -50.0);
}

#[test]
fn test_retreat_from_band_stops() {
    let mut scroller = scrolled_scroller();
    assert!(mouse_at(&mut scroller, CONTENT_TOP + 1.0));
    assert!(!mouse_at(&mut scroller, CONTENT_TOP + 100.0));
    assert!(!scroller.is_auto_scrolling());
}

#[test]
fn test_ticks_run_until_top_is_reached() {
    let mut scroller = scrolled_scroller();
    mouse_at(&mut scroller, CONTENT_TOP + 5.0);

    let mut ticks = 0;
    while scroller.is_auto_scrolling() && ticks < 1000 {
        scroller.on_auto_scroll_tick();
        ticks += 1;
    }
    assert!(!scroller.is_auto_scrolling());
    assert!(scroller.is_reach_top());
    assert_eq!(scroller.scroll_offset(), 0.0);
    assert_eq!(scroller.on_auto_scroll_tick(), 0.0);
}

#[test]
fn test_bottom_band_scrolls_up() {
    let mut scroller = scrolled_scroller();
    let bottom = CONTENT_TOP + 200.0;
    assert!(mouse_at(&mut scroller, bottom - 2.0));
    assert!(scroller.current_param().is_some_and(|p| p.offset < 0.0));
    assert!(scroller.scroll_offset() < -50.0);
}

#[test]
fn test_drag_speed_grows_with_intrusion() {
    let scroller = scrolled_scroller();
    let shallow = scroller.calc_drag_speed(58.0, 0.0, 50.0);
    let deep = scroller.calc_drag_speed(58.0, 0.0, 5.0);
    assert!(shallow > 0.0);
    assert!(deep > shallow);
    let config = AutoScrollConfig::default();
    let max = config.max_drag_speed * config.interval_ms as f32 / 1000.0;
    assert!(deep <= max);
}

#[test]
fn test_drag_uses_frame_band() {
    let mut scroller = scrolled_scroller();
    let frame_top = CONTENT_TOP - 10.0;
    let running = scroller.auto_scroll_by_edge_detection(
        AutoScrollParam::new(AutoScrollEvent::Drag),
        OffsetF::new(10.0, frame_top + 30.0),
        EdgeDetectionStrategy::OutBoundary,
    );
    assert!(running);
    scroller.stop_auto_scroll();
    assert!(!scroller.is_auto_scrolling());
}

#[test]
fn test_editor_scrollable_needs_content_and_overflow() {
    let mut editor = RichEditor::new();
    editor.scroller_mut().set_geometry(ScrollGeometry {
        content_rect: RectF::new(0.0, 0.0, 100.0, 100.0),
        frame_rect: RectF::new(0.0, 0.0, 100.0, 100.0),
        rich_text_rect: RectF::new(0.0, 0.0, 100.0, 400.0),
    });
    assert!(!editor.check_scrollable());
    editor.add_text_span(TextSpanOptions::new("x"));
    assert!(editor.check_scrollable());
}

#[test]
fn test_drag_end_stops_auto_scroll() {
    let mut editor = RichEditor::new();
    editor.add_text_span(TextSpanOptions::new("abc"));
    editor.scroller_mut().set_geometry(ScrollGeometry {
        content_rect: RectF::new(0.0, 0.0, 100.0, 200.0),
        frame_rect: RectF::new(0.0, 0.0, 100.0, 200.0),
        rich_text_rect: RectF::new(0.0, -100.0, 100.0, 600.0),
    });
    editor.set_selection(0, 2, true);
    editor.on_drag_start().unwrap();
    editor.scroller_mut().auto_scroll_by_edge_detection(
        AutoScrollParam::new(AutoScrollEvent::Drag),
        OffsetF::new(5.0, 5.0),
        EdgeDetectionStrategy::OutBoundary,
    );
    assert!(editor.scroller().is_auto_scrolling());

    editor.on_drag_end();
    assert!(!editor.scroller().is_auto_scrolling());
}

#[test]
fn test_scroll_callback_respects_boundaries() {
    let mut scroller = scrolled_scroller();
    assert!(scroller.on_scroll_callback(0.0, ScrollSource::Start));

    assert!(scroller.on_scroll_callback(80.0, ScrollSource::Update));
    assert!(scroller.is_reach_top());
    assert_eq!(scroller.scroll_offset(), 0.0);
    assert!(!scroller.on_scroll_callback(5.0, ScrollSource::Update));

    assert!(scroller.on_scroll_callback(-20.0, ScrollSource::Update));
    assert_eq!(scroller.state().scroll_offset, -20.0);
}
