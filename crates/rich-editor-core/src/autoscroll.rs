//! Auto-scroll by edge detection.
//!
//! # Overview
//!
//! While a selection handle, the mouse or a drag pointer sits inside the edge band at the top or
//! bottom of the visible content, the editor scrolls continuously. The band is
//! [`AutoScrollConfig::edge_distance_px`] for handles and the mouse and the wider
//! [`AutoScrollConfig::drag_edge_distance_px`] for drags.
//!
//! The scroller does not own a timer. When scrolling starts the first step runs immediately; the
//! host then calls [`AutoScroller::on_auto_scroll_tick`] every `interval_ms` until
//! [`AutoScroller::is_auto_scrolling`] turns false. A step that moves nothing ends the session.
//! Hosts must call [`AutoScroller::stop_auto_scroll`] when the gesture ends.
//!
//! Offsets follow one sign convention everywhere: positive moves the content down (revealing what
//! is above), negative moves it up.
//!
//! # Example
//!
//! ```rust
//! use rich_editor_core::autoscroll::{AutoScroller, RectF, ScrollGeometry, ScrollSource};
//! use rich_editor_core::AutoScrollConfig;
//!
//! let mut scroller = AutoScroller::new(AutoScrollConfig::default());
//! scroller.set_geometry(ScrollGeometry {
//!     content_rect: RectF::new(0.0, 0.0, 100.0, 100.0),
//!     frame_rect: RectF::new(0.0, 0.0, 100.0, 100.0),
//!     rich_text_rect: RectF::new(0.0, 0.0, 100.0, 140.0),
//! });
//! assert!(scroller.on_scroll_callback(-10.0, ScrollSource::Update));
//! assert_eq!(scroller.scroll_offset(), -10.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AutoScrollConfig;

/// A point in px.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OffsetF {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl OffsetF {
    /// Point at (`x`, `y`).
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in px.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl RectF {
    /// Rectangle at (`x`, `y`) of the given size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn offset(&self) -> OffsetF {
        OffsetF::new(self.x, self.y)
    }
}

/// The rectangles auto-scroll works with, supplied by the layout layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollGeometry {
    /// Visible content area.
    pub content_rect: RectF,
    /// Whole editor frame.
    pub frame_rect: RectF,
    /// Laid-out text; taller than the content rect when scrollable.
    pub rich_text_rect: RectF,
}

/// Screen-space selection handles that follow the text while it scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionHandles {
    /// Handle at the selection base.
    pub first_handle: RectF,
    /// Handle at the selection destination.
    pub second_handle: RectF,
    /// Paint offset of the selection base.
    pub base_offset: OffsetF,
    /// Paint offset of the selection destination.
    pub destination_offset: OffsetF,
}

impl SelectionHandles {
    fn translate_y(&mut self, dy: f32) {
        self.first_handle.y += dy;
        self.second_handle.y += dy;
        self.base_offset.y += dy;
        self.destination_offset.y += dy;
    }
}

/// What is driving the scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AutoScrollEvent {
    /// A selection handle is being dragged.
    Handle,
    /// A drag and drop session.
    Drag,
    /// Mouse selection.
    Mouse,
    /// Nothing.
    #[default]
    None,
    /// The caret moved out of view.
    Caret,
}

/// Whether the pointer may leave the hot area and keep scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EdgeDetectionStrategy {
    /// Keep scrolling while the pointer is past the band, even outside the hot area.
    #[default]
    OutBoundary,
    /// Only scroll while the pointer stays inside the hot area.
    InBoundary,
    /// Never scroll.
    Disable,
}

/// Parameters of one auto-scroll request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoScrollParam {
    /// Trigger.
    pub event: AutoScrollEvent,
    /// Handle rectangle, for [`AutoScrollEvent::Handle`].
    pub handle_rect: RectF,
    /// Offset applied per step; computed by the scroller.
    pub offset: f32,
    /// Whether the next step is the first of the session.
    pub is_first_run: bool,
}

impl AutoScrollParam {
    /// Request for `event`.
    pub fn new(event: AutoScrollEvent) -> Self {
        Self {
            event,
            ..Self::default()
        }
    }

    /// Request for a handle occupying `handle_rect`.
    pub fn handle(handle_rect: RectF) -> Self {
        Self {
            event: AutoScrollEvent::Handle,
            handle_rect,
            ..Self::default()
        }
    }
}

/// Where a scroll callback comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScrollSource {
    /// A scroll gesture begins.
    Start,
    /// The user moves the content.
    Update,
    /// Fling or animation frames.
    Animation,
    /// Auto-scroll steps.
    AutoScroll,
}

/// Snapshot of the scroll state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    /// `rich_text_rect.y - content_rect.y`; zero or negative.
    pub scroll_offset: f32,
    /// Whether an auto-scroll session is running.
    pub auto_scrolling: bool,
    /// Whether the text is scrolled to its top.
    pub reach_top: bool,
    /// Whether the text is scrolled to its bottom.
    pub reach_bottom: bool,
}

const EPSILON: f32 = 0.001;

fn near_zero(v: f32) -> bool {
    v.abs() < EPSILON
}

/// Edge-detecting scroller.
#[derive(Debug, Clone)]
pub struct AutoScroller {
    config: AutoScrollConfig,
    geometry: ScrollGeometry,
    handles: Option<SelectionHandles>,
    scroll_offset: f32,
    prev_point: Option<OffsetF>,
    current: Option<AutoScrollParam>,
}

impl AutoScroller {
    /// Idle scroller with empty geometry.
    pub fn new(config: AutoScrollConfig) -> Self {
        Self {
            config,
            geometry: ScrollGeometry::default(),
            handles: None,
            scroll_offset: 0.0,
            prev_point: None,
            current: None,
        }
    }

    /// Settings in use.
    pub fn config(&self) -> &AutoScrollConfig {
        &self.config
    }

    /// Current rectangles.
    pub fn geometry(&self) -> &ScrollGeometry {
        &self.geometry
    }

    /// Replace the rectangles after a layout pass.
    pub fn set_geometry(&mut self, geometry: ScrollGeometry) {
        self.geometry = geometry;
        self.scroll_offset = geometry.rich_text_rect.y - geometry.content_rect.y;
    }

    /// Selection handles currently shown.
    pub fn selection_handles(&self) -> Option<&SelectionHandles> {
        self.handles.as_ref()
    }

    /// Show (or hide with `None`) selection handles.
    pub fn set_selection_handles(&mut self, handles: Option<SelectionHandles>) {
        self.handles = handles;
    }

    /// `rich_text_rect.y - content_rect.y`.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Whether a session is running.
    pub fn is_auto_scrolling(&self) -> bool {
        self.current.is_some()
    }

    /// Parameters of the running session.
    pub fn current_param(&self) -> Option<&AutoScrollParam> {
        self.current.as_ref()
    }

    /// Whether the text's top is at the content top.
    pub fn is_reach_top(&self) -> bool {
        (self.geometry.rich_text_rect.y - self.geometry.content_rect.y).abs() < EPSILON
    }

    /// Whether the text's bottom is at the content bottom.
    pub fn is_reach_bottom(&self) -> bool {
        (self.geometry.rich_text_rect.bottom() - self.geometry.content_rect.bottom()).abs() < EPSILON
    }

    /// Whether the text is taller than the content area.
    pub fn is_overflowing(&self) -> bool {
        self.geometry.rich_text_rect.height > self.geometry.content_rect.height
    }

    /// Snapshot for state queries.
    pub fn state(&self) -> ScrollState {
        ScrollState {
            scroll_offset: self.scroll_offset,
            auto_scrolling: self.is_auto_scrolling(),
            reach_top: self.is_reach_top(),
            reach_bottom: self.is_reach_bottom(),
        }
    }

    /// Evaluate a pointer position and start, retarget or stop auto-scroll.
    ///
    /// Returns whether a session is running afterwards.
    pub fn auto_scroll_by_edge_detection(
        &mut self,
        mut param: AutoScrollParam,
        point: OffsetF,
        strategy: EdgeDetectionStrategy,
    ) -> bool {
        if self
            .prev_point
            .is_some_and(|prev| (prev.y - point.y).abs() < EPSILON)
        {
            return self.is_auto_scrolling();
        }
        self.prev_point = Some(point);

        if strategy == EdgeDetectionStrategy::Disable {
            self.stop();
            return false;
        }

        let dragging = param.event == AutoScrollEvent::Drag;
        let edge = if dragging {
            self.config.drag_edge_distance_px()
        } else {
            self.config.edge_distance_px()
        };
        let hot = if dragging {
            self.geometry.frame_rect
        } else {
            self.geometry.content_rect
        };
        if hot.height < edge {
            debug!(target: "rich_editor.autoscroll", height = hot.height, edge, "hot_area_too_small");
            self.stop();
            return false;
        }
        if strategy == EdgeDetectionStrategy::InBoundary && (point.y < hot.y || point.y > hot.bottom()) {
            self.stop();
            return false;
        }

        let top_threshold = hot.y + edge;
        let bottom_threshold = hot.bottom() - edge;
        let probe_bottom = match param.event {
            AutoScrollEvent::Handle => point.y + param.handle_rect.height,
            _ => point.y,
        };

        let offset = if probe_bottom > bottom_threshold {
            if dragging {
                -self.calc_drag_speed(bottom_threshold, hot.bottom(), point.y)
            } else {
                bottom_threshold - probe_bottom
            }
        } else if point.y < top_threshold {
            if dragging {
                self.calc_drag_speed(top_threshold, hot.y, point.y)
            } else {
                top_threshold - point.y
            }
        } else {
            self.stop();
            return false;
        };

        param.offset = offset;
        self.schedule(param);
        self.is_auto_scrolling()
    }

    /// Drag speed for a pointer at `point` inside the band `[hot_start, hot_end]`.
    ///
    /// The intrusion ratio goes through a sharp ease curve and scales the configured maximum
    /// speed down to one timer interval.
    pub fn calc_drag_speed(&self, hot_start: f32, hot_end: f32, point: f32) -> f32 {
        let span = hot_end - hot_start;
        if near_zero(span) {
            return 0.0;
        }
        let ratio = ((point - hot_start) / span).clamp(0.0, 1.0);
        let factor = sharp_curve(ratio);
        self.config.max_drag_speed * factor / 1000.0 * self.config.interval_ms as f32
    }

    fn schedule(&mut self, mut param: AutoScrollParam) {
        if (param.offset > 0.0 && self.is_reach_top()) || (param.offset < 0.0 && self.is_reach_bottom()) {
            self.stop();
            return;
        }
        if let Some(current) = self.current.as_mut() {
            current.offset = param.offset;
            current.handle_rect = param.handle_rect;
            return;
        }
        param.is_first_run = true;
        debug!(target: "rich_editor.autoscroll", event = ?param.event, offset = param.offset, "auto_scroll_start");
        self.current = Some(param);
        self.on_auto_scroll_tick();
    }

    /// Run one scroll step. Returns the applied delta; zero means the session ended.
    pub fn on_auto_scroll_tick(&mut self) -> f32 {
        let Some(param) = self.current.as_mut() else {
            return 0.0;
        };
        param.is_first_run = false;
        let offset = param.offset;
        let moved = self.move_text_rect(offset);
        trace!(target: "rich_editor.autoscroll", offset, moved, "auto_scroll_step");
        if near_zero(moved) {
            self.stop();
            return 0.0;
        }
        moved
    }

    /// End the session and forget the last pointer position.
    pub fn stop_auto_scroll(&mut self) {
        self.stop();
        self.prev_point = None;
    }

    fn stop(&mut self) {
        if self.current.take().is_some() {
            debug!(target: "rich_editor.autoscroll", scroll_offset = self.scroll_offset, "auto_scroll_stop");
        }
    }

    /// Scroll callback from the host's scrollable container.
    ///
    /// Returns `false` when the text is already at the boundary the offset points to.
    pub fn on_scroll_callback(&mut self, offset: f32, source: ScrollSource) -> bool {
        if source == ScrollSource::Start {
            return true;
        }
        if (offset > 0.0 && self.is_reach_top()) || (offset < 0.0 && self.is_reach_bottom()) {
            return false;
        }
        self.move_text_rect(offset);
        true
    }

    /// Move the text by `offset`, clamped so the content area stays covered. Returns the applied
    /// delta.
    fn move_text_rect(&mut self, offset: f32) -> f32 {
        let content = self.geometry.content_rect;
        let rich = &mut self.geometry.rich_text_rect;
        if rich.height <= content.height {
            return 0.0;
        }
        let min_y = content.bottom() - rich.height;
        let new_y = (rich.y + offset).clamp(min_y, content.y);
        let delta = new_y - rich.y;
        if near_zero(delta) {
            return 0.0;
        }
        rich.y = new_y;
        self.scroll_offset = rich.y - content.y;
        if let Some(handles) = self.handles.as_mut() {
            handles.translate_y(delta);
        }
        delta
    }
}

/// Cubic bezier (0.33, 0, 0.67, 1) evaluated at `x`.
fn sharp_curve(x: f32) -> f32 {
    const X1: f32 = 0.33;
    const Y1: f32 = 0.0;
    const X2: f32 = 0.67;
    const Y2: f32 = 1.0;
    let bezier = |t: f32, p1: f32, p2: f32| {
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    };
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    let mut t = x;
    for _ in 0..32 {
        t = (lo + hi) / 2.0;
        if bezier(t, X1, X2) < x {
            lo = t;
        } else {
            hi = t;
        }
    }
    bezier(t, Y1, Y2)
}
