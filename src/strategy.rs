use crate::stream::Subject;
use crate::{OffsetAnchor, Orientation, Range, Result, ScrollBehavior, ScrollEdge};

/// The viewport as seen by a [`VirtualScrollStrategy`].
///
/// Strategies read geometry through the getters and only change viewport state through the
/// setters; they never hold on to the viewport between calls.
pub trait ViewportHandle {
    fn orientation(&self) -> Orientation;

    /// Number of items in the bound dataset.
    fn data_length(&self) -> usize;

    /// Size of the viewport along the scroll axis, in pixels.
    fn viewport_size(&self) -> f64;

    fn rendered_range(&self) -> Range;

    /// Scroll offset of the viewport itself (not of an outer scrollable) from `edge`, or from
    /// the leading edge of the scroll axis when `edge` is `None`.
    fn measure_scroll_offset(&self, edge: Option<ScrollEdge>) -> f64;

    /// Total DOM extent of the views rendered for `range`.
    ///
    /// # Errors
    ///
    /// Fails when `range` is not inside the rendered range.
    fn measure_range_size(&self, range: Range) -> Result<f64>;

    /// Offset of the rendered block from the content start, or `None` while an end-relative
    /// offset is waiting to be rewritten.
    fn offset_to_rendered_content_start(&self) -> Option<f64>;

    fn set_total_content_size(&mut self, size: f64);

    fn set_rendered_range(&mut self, range: Range);

    fn set_rendered_content_offset(&mut self, offset: f64, anchor: OffsetAnchor);

    fn scroll_to_offset(&mut self, offset: f64, behavior: ScrollBehavior);
}

/// Decides which slice of the dataset a virtual scroll viewport renders.
///
/// The viewport passes itself to every hook. A strategy that is not attached must treat all
/// hooks as no-ops.
pub trait VirtualScrollStrategy {
    /// Emits the index of the first visible item whenever it changes.
    fn scrolled_index_change(&self) -> Subject<usize>;

    fn attach(&mut self, viewport: &mut dyn ViewportHandle);

    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    fn on_content_scrolled(&mut self, viewport: &mut dyn ViewportHandle);

    fn on_data_length_changed(&mut self, viewport: &mut dyn ViewportHandle);

    fn on_content_rendered(&mut self, viewport: &mut dyn ViewportHandle);

    fn on_rendered_offset_changed(&mut self, viewport: &mut dyn ViewportHandle);

    fn scroll_to_index(
        &mut self,
        viewport: &mut dyn ViewportHandle,
        index: usize,
        behavior: ScrollBehavior,
    );
}
