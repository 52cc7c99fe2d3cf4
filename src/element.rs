use crate::{Orientation, PhysicalEdge, ScrollToOptions};

/// The scrollable host a [`crate::VirtualScrollViewport`] measures and drives.
///
/// This is the seam to the rendering platform (a DOM element, a terminal pane, a canvas
/// widget). The viewport never caches what it reads here: every measurement is taken when
/// the windowing math needs it.
///
/// The scrollable may be the viewport itself or an outer container the viewport is embedded
/// in; [`Self::measure_viewport_offset`] tells the two apart.
pub trait ScrollableElement {
    /// Whether a live layout exists. When `false` (e.g. server-side rendering) the viewport
    /// skips every measurement-dependent initialisation.
    fn is_browser(&self) -> bool {
        true
    }

    /// Raw scroll offset of the scrollable measured from `edge`.
    fn measure_scroll_offset(&self, edge: PhysicalEdge) -> f64;

    /// Client size of the scrollable along `orientation`.
    fn measure_viewport_size(&self, orientation: Orientation) -> f64;

    /// Distance from the scrollable's `edge` (in scrolled content coordinates) to the same edge
    /// of the viewport element. Zero when the viewport is the scrollable.
    fn measure_viewport_offset(&self, _edge: PhysicalEdge) -> f64 {
        0.0
    }

    /// Laid-out size of the block holding the rendered items.
    fn measure_rendered_content_size(&self, orientation: Orientation) -> f64;

    fn scroll_to(&mut self, options: ScrollToOptions);

    /// Applies the CSS-style transform (e.g. `translateY(120px)`) to the rendered block.
    fn apply_content_transform(&mut self, transform: &str);

    /// Resizes the spacer that gives the scrollable its full scroll extent. The axis that is
    /// not scrolled is `None` and must be left unconstrained.
    fn apply_spacer_size(&mut self, width: Option<f64>, height: Option<f64>);

    /// Asks the host framework to re-render the viewport's template.
    fn mark_for_check(&mut self) {}
}
