//! The virtual scroll viewport controller.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::fixed_size::{FixedSizeConfig, FixedSizeVirtualScrollStrategy};
use crate::repeater::{RenderedContent, RepeaterId};
use crate::scheduler::{AfterFlush, AuditGate, ChangeDetectionBatch};
use crate::strategy::{ViewportHandle, VirtualScrollStrategy};
use crate::stream::{Subject, Subscription};
use crate::{
    Direction, OffsetAnchor, Orientation, Range, Result, ScrollBehavior, ScrollEdge,
    ScrollToOptions, ScrollableElement, VirtualScrollError,
};

/// When scroll events reach the strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollScheduler {
    /// Once per [`VirtualScrollViewport::run_animation_frame`].
    #[default]
    AnimationFrame,
    /// During [`VirtualScrollViewport::run_microtasks`], for hosts without animation frames.
    Microtask,
}

/// Construction options for [`VirtualScrollViewport`].
#[derive(Clone, Debug)]
pub struct ViewportOptions<S> {
    pub strategy: Option<S>,
    pub orientation: Orientation,
    pub direction: Direction,
    /// Never remove rendered items from the start of the range; the content offset stays 0.
    pub append_only: bool,
    pub scroll_scheduler: ScrollScheduler,
}

impl<S> Default for ViewportOptions<S> {
    fn default() -> Self {
        Self {
            strategy: None,
            orientation: Orientation::Vertical,
            direction: Direction::Ltr,
            append_only: false,
            scroll_scheduler: ScrollScheduler::AnimationFrame,
        }
    }
}

impl<S> ViewportOptions<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            strategy: Some(strategy),
            ..Self::default()
        }
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_append_only(mut self, append_only: bool) -> Self {
        self.append_only = append_only;
        self
    }

    pub fn with_scroll_scheduler(mut self, scroll_scheduler: ScrollScheduler) -> Self {
        self.scroll_scheduler = scroll_scheduler;
        self
    }
}

struct AttachedRepeater {
    id: RepeaterId,
    content: Weak<dyn RenderedContent>,
    _data: Subscription,
}

/// Everything the strategy may read or write; split from the strategy so both can be
/// borrowed at once.
struct ViewportCore<E> {
    element: E,
    orientation: Orientation,
    direction: Direction,
    append_only: bool,
    data_length: usize,
    viewport_size: f64,
    total_content_size: f64,
    rendered_range: Range,
    rendered_content_offset: f64,
    offset_needs_rewrite: bool,
    rendered_content_transform: Option<String>,
    change_detection: ChangeDetectionBatch,
    rendered_range_stream: Subject<Range>,
    incoming_data_length: Rc<Cell<Option<usize>>>,
    repeater: Option<AttachedRepeater>,
}

impl<E: ScrollableElement> ViewportCore<E> {
    fn live_repeater(&self) -> Option<Rc<dyn RenderedContent>> {
        let content = self.repeater.as_ref()?.content.upgrade()?;
        if content.is_destroyed() {
            None
        } else {
            Some(content)
        }
    }

    fn mark_change_detection_needed(&mut self, after: Option<AfterFlush>) {
        if self.change_detection.request(after) {
            vtrace!(?after, "change detection scheduled");
        }
    }

    fn measure_viewport_size(&mut self) {
        self.viewport_size = if self.element.is_browser() {
            self.element.measure_viewport_size(self.orientation)
        } else {
            0.0
        };
    }

    fn measure_viewport_offset(&self, edge: Option<ScrollEdge>) -> f64 {
        if !self.element.is_browser() {
            return 0.0;
        }
        let edge = edge
            .unwrap_or(ScrollEdge::leading(self.orientation))
            .resolve(self.direction);
        self.element.measure_viewport_offset(edge)
    }

    fn measure_rendered_content_size(&self) -> f64 {
        if !self.element.is_browser() {
            return 0.0;
        }
        self.element.measure_rendered_content_size(self.orientation)
    }

    fn spacer_size(&self) -> (Option<f64>, Option<f64>) {
        match self.orientation {
            Orientation::Horizontal => (Some(self.total_content_size), None),
            Orientation::Vertical => (None, Some(self.total_content_size)),
        }
    }
}

impl<E: ScrollableElement> ViewportHandle for ViewportCore<E> {
    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn data_length(&self) -> usize {
        self.data_length
    }

    fn viewport_size(&self) -> f64 {
        self.viewport_size
    }

    fn rendered_range(&self) -> Range {
        self.rendered_range
    }

    fn measure_scroll_offset(&self, edge: Option<ScrollEdge>) -> f64 {
        if !self.element.is_browser() {
            return 0.0;
        }
        let physical = edge
            .unwrap_or(ScrollEdge::leading(self.orientation))
            .resolve(self.direction);
        let offset = self.element.measure_scroll_offset(physical);
        // The viewport offset is always taken from the leading edge, whichever edge the
        // scroll offset is measured from.
        (offset - self.measure_viewport_offset(None)).max(0.0)
    }

    fn measure_range_size(&self, range: Range) -> Result<f64> {
        match self.live_repeater() {
            Some(content) => content.measure_range_size(range, self.orientation),
            None => Ok(0.0),
        }
    }

    fn offset_to_rendered_content_start(&self) -> Option<f64> {
        if self.offset_needs_rewrite {
            None
        } else {
            Some(self.rendered_content_offset)
        }
    }

    fn set_total_content_size(&mut self, size: f64) {
        if self.total_content_size != size {
            self.total_content_size = size;
            self.mark_change_detection_needed(None);
        }
    }

    fn set_rendered_range(&mut self, range: Range) {
        if self.rendered_range == range {
            return;
        }
        let range = if self.append_only {
            Range::new(0, self.rendered_range.end.max(range.end))
        } else {
            range
        };
        vtrace!(start = range.start, end = range.end, "set_rendered_range");
        self.rendered_range = range;
        self.rendered_range_stream.next(range);
        self.mark_change_detection_needed(Some(AfterFlush::ContentRendered));
    }

    fn set_rendered_content_offset(&mut self, offset: f64, anchor: OffsetAnchor) {
        let offset = if self.append_only && anchor == OffsetAnchor::ToStart {
            0.0
        } else {
            offset
        };
        self.rendered_content_offset = offset;

        let axis = self.orientation.axis();
        let sign =
            if self.orientation == Orientation::Horizontal && self.direction == Direction::Rtl {
                -1.0
            } else {
                1.0
            };
        // `+ 0.0` turns a negative zero into `0`.
        let mut transform = format!("translate{axis}({}px)", sign * offset + 0.0);
        if anchor == OffsetAnchor::ToEnd {
            transform.push_str(&format!(" translate{axis}(-100%)"));
            self.offset_needs_rewrite = true;
        }

        if self.rendered_content_transform.as_deref() != Some(transform.as_str()) {
            self.rendered_content_transform = Some(transform);
            self.mark_change_detection_needed(Some(AfterFlush::OffsetChanged));
        }
    }

    fn scroll_to_offset(&mut self, offset: f64, behavior: ScrollBehavior) {
        let mut options = ScrollToOptions {
            behavior,
            ..ScrollToOptions::default()
        };
        match (self.orientation, self.direction) {
            (Orientation::Vertical, _) => options.top = Some(offset),
            (Orientation::Horizontal, Direction::Ltr) => options.left = Some(offset),
            (Orientation::Horizontal, Direction::Rtl) => options.right = Some(offset),
        }
        self.element.scroll_to(options);
    }
}

/// A scrollable viewport that renders only the slice of a large list that is visible, plus
/// buffers.
///
/// The viewport does not own a clock. The host forwards scroll and resize events and pumps
/// the two scheduling boundaries:
///
/// ```text
/// scroll event ─▶ handle_scroll_event ─┐ (coalesced)
///                                      ▼
///                     run_animation_frame ─▶ strategy.on_content_scrolled
///                                      │
///                                      ▼
///                        run_microtasks ─▶ flush: transform, spacer, repeater check,
///                                                 after-flush strategy hooks
/// ```
///
/// Range, offset and size changes requested in between are batched into one flush.
pub struct VirtualScrollViewport<S, E> {
    strategy: S,
    core: ViewportCore<E>,
    scroll_scheduler: ScrollScheduler,
    scroll_audit: AuditGate,
    element_scrolled: Subject<()>,
    initialized: bool,
    destroyed: bool,
}

impl<S, E> VirtualScrollViewport<S, E>
where
    S: VirtualScrollStrategy,
    E: ScrollableElement,
{
    /// # Errors
    ///
    /// [`VirtualScrollError::MissingStrategy`] when `options.strategy` is `None`.
    pub fn new(options: ViewportOptions<S>, element: E) -> Result<Self> {
        let strategy = options
            .strategy
            .ok_or(VirtualScrollError::MissingStrategy)?;
        Ok(Self {
            strategy,
            core: ViewportCore {
                element,
                orientation: options.orientation,
                direction: options.direction,
                append_only: options.append_only,
                data_length: 0,
                viewport_size: 0.0,
                total_content_size: 0.0,
                rendered_range: Range::EMPTY,
                rendered_content_offset: 0.0,
                offset_needs_rewrite: false,
                rendered_content_transform: None,
                change_detection: ChangeDetectionBatch::default(),
                rendered_range_stream: Subject::new(),
                incoming_data_length: Rc::new(Cell::new(None)),
                repeater: None,
            },
            scroll_scheduler: options.scroll_scheduler,
            scroll_audit: AuditGate::default(),
            element_scrolled: Subject::new(),
            initialized: false,
            destroyed: false,
        })
    }

    /// Measures the viewport, attaches the strategy and queues the initial scroll pass.
    ///
    /// Does nothing when the element has no live layout.
    pub fn init(&mut self) {
        if self.initialized || self.destroyed {
            return;
        }
        self.initialized = true;
        if !self.core.element.is_browser() {
            vdebug!("VirtualScrollViewport::init: no layout, skipping");
            return;
        }
        self.core.measure_viewport_size();
        vdebug!(
            viewport_size = self.core.viewport_size,
            orientation = ?self.core.orientation,
            "VirtualScrollViewport::init"
        );
        self.strategy.attach(&mut self.core);
        self.scroll_audit.arm();
        self.core.mark_change_detection_needed(None);
    }

    /// Detaches the repeater and the strategy and completes every stream.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        vdebug!("VirtualScrollViewport::destroy");
        self.destroyed = true;
        self.detach();
        self.strategy.detach();
        self.core.rendered_range_stream.complete();
        self.element_scrolled.complete();
        self.core.change_detection.clear();
        self.scroll_audit.fire();
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Forwards a raw scroll event. Events arriving before the next boundary coalesce.
    pub fn handle_scroll_event(&mut self) {
        if self.destroyed {
            return;
        }
        self.element_scrolled.next(());
        if self.initialized && self.core.element.is_browser() && self.scroll_audit.arm() {
            vtrace!("scroll audit armed");
        }
    }

    /// Forwards a change of the window/viewport size.
    pub fn handle_resize(&mut self) {
        if self.destroyed {
            return;
        }
        self.check_viewport_size();
    }

    /// The animation-frame boundary: delivers coalesced scrolls, then drains microtasks.
    pub fn run_animation_frame(&mut self) {
        if self.scroll_scheduler == ScrollScheduler::AnimationFrame && self.scroll_audit.fire() {
            self.strategy.on_content_scrolled(&mut self.core);
        }
        self.run_microtasks();
    }

    /// The microtask boundary: applies data-length changes and runs change-detection flushes
    /// until nothing is pending.
    pub fn run_microtasks(&mut self) {
        loop {
            let mut progressed = false;
            if let Some(data_length) = self.core.incoming_data_length.take() {
                self.on_data_length(data_length);
                progressed = true;
            }
            if self.scroll_scheduler == ScrollScheduler::Microtask && self.scroll_audit.fire() {
                self.strategy.on_content_scrolled(&mut self.core);
                progressed = true;
            }
            if self.core.change_detection.is_pending() {
                self.do_change_detection();
                progressed = true;
            }
            if !progressed {
                break;
            }
        }
    }

    pub fn has_pending_work(&self) -> bool {
        self.core.change_detection.is_pending()
            || self.scroll_audit.is_armed()
            || self.core.incoming_data_length.get().is_some()
    }

    fn on_data_length(&mut self, data_length: usize) {
        if self.destroyed {
            return;
        }
        if data_length != self.core.data_length {
            vdebug!(
                from = self.core.data_length,
                to = data_length,
                "data length changed"
            );
            self.core.data_length = data_length;
            self.strategy.on_data_length_changed(&mut self.core);
        }
        self.core.mark_change_detection_needed(None);
    }

    fn do_change_detection(&mut self) {
        let after = self.core.change_detection.begin();
        if self.destroyed {
            return;
        }
        vtrace!(after = after.len(), "change detection flush");

        let core = &mut self.core;
        if let Some(transform) = &core.rendered_content_transform {
            core.element.apply_content_transform(transform);
        }
        let (width, height) = core.spacer_size();
        core.element.apply_spacer_size(width, height);
        core.element.mark_for_check();
        if let Some(content) = core.live_repeater() {
            content.detect_changes();
        }

        for action in after {
            match action {
                AfterFlush::ContentRendered => self.strategy.on_content_rendered(&mut self.core),
                AfterFlush::OffsetChanged if self.core.offset_needs_rewrite => {
                    let content_size = self.core.measure_rendered_content_size();
                    self.core.rendered_content_offset -= content_size;
                    self.core.offset_needs_rewrite = false;
                    let offset = self.core.rendered_content_offset;
                    self.core
                        .set_rendered_content_offset(offset, OffsetAnchor::ToStart);
                }
                AfterFlush::OffsetChanged => {
                    self.strategy.on_rendered_offset_changed(&mut self.core)
                }
            }
        }
    }

    pub(crate) fn attach<T: 'static>(
        &mut self,
        id: RepeaterId,
        content: Weak<dyn RenderedContent>,
        data_stream: &Subject<Rc<[T]>>,
    ) -> Result<()> {
        if self.core.live_repeater().is_some() {
            return Err(VirtualScrollError::RepeaterAlreadyAttached);
        }
        let incoming = Rc::clone(&self.core.incoming_data_length);
        let data = data_stream.subscribe(move |data: &Rc<[T]>| incoming.set(Some(data.len())));
        self.core.repeater = Some(AttachedRepeater {
            id,
            content,
            _data: data,
        });
        Ok(())
    }

    /// Stops listening to the attached repeater. The data length is kept.
    pub fn detach(&mut self) {
        if let Some(_repeater) = self.core.repeater.take() {
            vdebug!(id = _repeater.id.get(), "VirtualScrollViewport::detach");
        }
    }

    /// Id of the live repeater, if one is attached.
    pub fn attached_repeater(&self) -> Option<RepeaterId> {
        self.core.live_repeater()?;
        self.core.repeater.as_ref().map(|r| r.id)
    }

    /// Re-measures the viewport and lets the strategy recompute.
    pub fn check_viewport_size(&mut self) {
        self.core.measure_viewport_size();
        self.strategy.on_data_length_changed(&mut self.core);
    }

    pub fn scroll_to_offset(&mut self, offset: f64, behavior: ScrollBehavior) {
        self.core.scroll_to_offset(offset, behavior);
    }

    pub fn scroll_to_index(&mut self, index: usize, behavior: ScrollBehavior) {
        self.strategy
            .scroll_to_index(&mut self.core, index, behavior);
    }

    /// Scroll offset from `edge` (the leading edge when `None`), relative to the viewport's
    /// own offset from its leading edge inside the scroll host. Never negative.
    pub fn measure_scroll_offset(&self, edge: Option<ScrollEdge>) -> f64 {
        self.core.measure_scroll_offset(edge)
    }

    pub fn measure_viewport_offset(&self, edge: Option<ScrollEdge>) -> f64 {
        self.core.measure_viewport_offset(edge)
    }

    pub fn measure_rendered_content_size(&self) -> f64 {
        self.core.measure_rendered_content_size()
    }

    /// Total extent of the views rendered for `range`; 0 without a repeater.
    ///
    /// # Errors
    ///
    /// [`VirtualScrollError::RangeNotRendered`] when `range` is not inside the rendered range.
    pub fn measure_range_size(&self, range: Range) -> Result<f64> {
        self.core.measure_range_size(range)
    }

    pub fn set_total_content_size(&mut self, size: f64) {
        self.core.set_total_content_size(size);
    }

    pub fn set_rendered_range(&mut self, range: Range) {
        self.core.set_rendered_range(range);
    }

    pub fn set_rendered_content_offset(&mut self, offset: f64, anchor: OffsetAnchor) {
        self.core.set_rendered_content_offset(offset, anchor);
    }

    pub fn offset_to_rendered_content_start(&self) -> Option<f64> {
        self.core.offset_to_rendered_content_start()
    }

    /// Emits every new rendered range.
    pub fn rendered_range_stream(&self) -> Subject<Range> {
        self.core.rendered_range_stream.clone()
    }

    /// Emits once per raw scroll event.
    pub fn element_scrolled(&self) -> Subject<()> {
        self.element_scrolled.clone()
    }

    pub fn scrolled_index_change(&self) -> Subject<usize> {
        self.strategy.scrolled_index_change()
    }

    pub fn rendered_range(&self) -> Range {
        self.core.rendered_range
    }

    pub fn data_length(&self) -> usize {
        self.core.data_length
    }

    pub fn viewport_size(&self) -> f64 {
        self.core.viewport_size
    }

    pub fn total_content_size(&self) -> f64 {
        self.core.total_content_size
    }

    /// Spacer width; `None` for a vertical viewport.
    pub fn total_content_width(&self) -> Option<f64> {
        self.core.spacer_size().0
    }

    /// Spacer height; `None` for a horizontal viewport.
    pub fn total_content_height(&self) -> Option<f64> {
        self.core.spacer_size().1
    }

    pub fn rendered_content_transform(&self) -> Option<&str> {
        self.core.rendered_content_transform.as_deref()
    }

    pub fn orientation(&self) -> Orientation {
        self.core.orientation
    }

    pub fn direction(&self) -> Direction {
        self.core.direction
    }

    /// Re-applies the content transform, whose sign depends on the direction of a horizontal
    /// viewport.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.core.direction == direction {
            return;
        }
        self.core.direction = direction;
        if self.core.rendered_content_transform.is_some() {
            let anchor = if self.core.offset_needs_rewrite {
                OffsetAnchor::ToEnd
            } else {
                OffsetAnchor::ToStart
            };
            let offset = self.core.rendered_content_offset;
            self.core.set_rendered_content_offset(offset, anchor);
        }
    }

    pub fn append_only(&self) -> bool {
        self.core.append_only
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Runs `f` with the strategy and the viewport handle it drives.
    pub fn with_strategy<R>(&mut self, f: impl FnOnce(&mut S, &mut dyn ViewportHandle) -> R) -> R {
        f(&mut self.strategy, &mut self.core)
    }

    pub fn element(&self) -> &E {
        &self.core.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.core.element
    }
}

impl<E: ScrollableElement> VirtualScrollViewport<FixedSizeVirtualScrollStrategy, E> {
    /// Replaces the fixed-size geometry and recomputes the range right away.
    ///
    /// # Errors
    ///
    /// Returns the error of [`FixedSizeConfig::validate`]; nothing is changed in that case.
    pub fn update_item_and_buffer_size(&mut self, config: FixedSizeConfig) -> Result<()> {
        self.strategy
            .update_item_and_buffer_size(config, &mut self.core)
    }
}

impl<S, E> fmt::Debug for VirtualScrollViewport<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualScrollViewport")
            .field("orientation", &self.core.orientation)
            .field("direction", &self.core.direction)
            .field("append_only", &self.core.append_only)
            .field("data_length", &self.core.data_length)
            .field("viewport_size", &self.core.viewport_size)
            .field("total_content_size", &self.core.total_content_size)
            .field("rendered_range", &self.core.rendered_range)
            .field("transform", &self.core.rendered_content_transform)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
