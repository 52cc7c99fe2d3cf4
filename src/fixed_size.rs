use crate::strategy::{ViewportHandle, VirtualScrollStrategy};
use crate::stream::Subject;
use crate::{OffsetAnchor, Range, Result, ScrollBehavior, VirtualScrollError};

/// Item and buffer geometry for [`FixedSizeVirtualScrollStrategy`].
///
/// Buffers are measured in pixels beyond the visible viewport: once the rendered content
/// ahead of (or behind) the viewport drops below `min_buffer_px`, the range is extended so
/// that up to `max_buffer_px` is rendered on that side.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedSizeConfig {
    pub item_size: f64,
    pub min_buffer_px: f64,
    pub max_buffer_px: f64,
}

impl Default for FixedSizeConfig {
    fn default() -> Self {
        Self {
            item_size: 20.0,
            min_buffer_px: 100.0,
            max_buffer_px: 200.0,
        }
    }
}

impl FixedSizeConfig {
    pub fn new(item_size: f64, min_buffer_px: f64, max_buffer_px: f64) -> Self {
        Self {
            item_size,
            min_buffer_px,
            max_buffer_px,
        }
    }

    pub fn with_item_size(mut self, item_size: f64) -> Self {
        self.item_size = item_size;
        self
    }

    pub fn with_buffer(mut self, min_buffer_px: f64, max_buffer_px: f64) -> Self {
        self.min_buffer_px = min_buffer_px;
        self.max_buffer_px = max_buffer_px;
        self
    }

    /// # Errors
    ///
    /// [`VirtualScrollError::BufferSizeInverted`] when `max_buffer_px < min_buffer_px`, and
    /// [`VirtualScrollError::InvalidItemSize`] for a negative or non-finite item size.
    pub fn validate(&self) -> Result<()> {
        if self.max_buffer_px < self.min_buffer_px {
            return Err(VirtualScrollError::BufferSizeInverted {
                min_buffer_px: self.min_buffer_px,
                max_buffer_px: self.max_buffer_px,
            });
        }
        if !self.item_size.is_finite() || self.item_size < 0.0 {
            return Err(VirtualScrollError::InvalidItemSize {
                item_size: self.item_size,
            });
        }
        Ok(())
    }

    pub fn total_content_size(&self, data_length: usize) -> f64 {
        data_length as f64 * self.item_size
    }

    /// Index of the first visible item as a fractional position. Zero for a zero item size.
    pub fn first_visible_index(&self, scroll_offset: f64) -> f64 {
        if self.item_size > 0.0 {
            scroll_offset / self.item_size
        } else {
            0.0
        }
    }

    /// Computes the range to render for the given viewport geometry.
    pub fn compute(&self, input: RangeInput) -> RangeUpdate {
        let item_size = self.item_size;
        let min_buffer = self.min_buffer_px;
        let max_buffer = self.max_buffer_px;
        let len = input.data_length as f64;
        let viewport_size = input.viewport_size;

        let shrunk = clamp_after_shrink(self, input);
        let mut start = shrunk.start;
        let mut end = shrunk.end;
        let scroll_offset = shrunk.scroll_offset;
        let first_visible = shrunk.first_visible;

        let start_buffer = scroll_offset - start * item_size;
        if start_buffer < min_buffer && start != 0.0 {
            let expand_start = ((max_buffer - start_buffer) / item_size).ceil();
            start = (start - expand_start).max(0.0);
            end = len.min((first_visible + (viewport_size + min_buffer) / item_size).ceil());
        } else {
            let end_buffer = end * item_size - (scroll_offset + viewport_size);
            if end_buffer < min_buffer && end != len {
                let expand_end = ((max_buffer - end_buffer) / item_size).ceil();
                if expand_end > 0.0 {
                    end = len.min(end + expand_end);
                    start = (first_visible - min_buffer / item_size).floor().max(0.0);
                }
            }
        }

        let end = to_index(end, input.data_length);
        let start = to_index(start, end);
        let range = Range { start, end };

        RangeUpdate {
            range,
            content_offset: (item_size * start as f64).round(),
            total_content_size: self.total_content_size(input.data_length),
            first_visible_index: to_index(first_visible.floor(), usize::MAX),
        }
    }
}

/// Geometry the range computation reads from the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeInput {
    pub rendered: Range,
    pub viewport_size: f64,
    pub data_length: usize,
    pub scroll_offset: f64,
}

/// What the strategy pushes back to the viewport after a range computation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeUpdate {
    pub range: Range,
    /// Pixel offset of the first rendered item, rounded to whole pixels.
    pub content_offset: f64,
    pub total_content_size: f64,
    pub first_visible_index: usize,
}

/// The range after the post-shrink correction, before buffering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShrinkClamp {
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub(crate) scroll_offset: f64,
    pub(crate) first_visible: f64,
}

/// When the previously rendered range runs past the (just shrunk) dataset, pulls the first
/// visible index back so a full viewport of items ends exactly at the new data length.
pub(crate) fn clamp_after_shrink(config: &FixedSizeConfig, input: RangeInput) -> ShrinkClamp {
    let item_size = config.item_size;
    let len = input.data_length as f64;
    let mut start = input.rendered.start as f64;
    let mut end = input.rendered.end as f64;
    let mut scroll_offset = input.scroll_offset;
    let mut first_visible = config.first_visible_index(scroll_offset);

    if input.rendered.end > input.data_length {
        let max_visible = (input.viewport_size / item_size).ceil();
        let clamped = first_visible.min(len - max_visible).max(0.0);
        if first_visible != clamped {
            vwarn!(
                first_visible,
                clamped,
                data_length = input.data_length,
                "scroll position past the end of a shrunk list"
            );
            first_visible = clamped;
            scroll_offset = clamped * item_size;
            start = first_visible.floor();
        }
        end = (start + max_visible).min(len).max(0.0);
    }

    ShrinkClamp {
        start,
        end,
        scroll_offset,
        first_visible,
    }
}

/// Converts an index computed in floating point into `[0, max]`. NaN maps to zero.
fn to_index(value: f64, max: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    if value >= max as f64 {
        return max;
    }
    value as usize
}

/// Virtual scrolling strategy for lists whose items all share one size along the scroll axis.
#[derive(Debug)]
pub struct FixedSizeVirtualScrollStrategy {
    config: FixedSizeConfig,
    attached: bool,
    scrolled_index_change: Subject<usize>,
}

impl Default for FixedSizeVirtualScrollStrategy {
    fn default() -> Self {
        Self::from_valid(FixedSizeConfig::default())
    }
}

impl FixedSizeVirtualScrollStrategy {
    /// # Errors
    ///
    /// Returns the error of [`FixedSizeConfig::validate`].
    pub fn new(config: FixedSizeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: FixedSizeConfig) -> Self {
        Self {
            config,
            attached: false,
            scrolled_index_change: Subject::distinct(),
        }
    }

    pub fn config(&self) -> FixedSizeConfig {
        self.config
    }

    pub fn item_size(&self) -> f64 {
        self.config.item_size
    }

    pub fn min_buffer_px(&self) -> f64 {
        self.config.min_buffer_px
    }

    pub fn max_buffer_px(&self) -> f64 {
        self.config.max_buffer_px
    }

    /// Replaces the geometry without recomputing anything.
    ///
    /// # Errors
    ///
    /// Returns the error of [`FixedSizeConfig::validate`]; the current geometry is kept.
    pub fn set_config(&mut self, config: FixedSizeConfig) -> Result<()> {
        config.validate()?;
        vdebug!(
            item_size = config.item_size,
            min_buffer_px = config.min_buffer_px,
            max_buffer_px = config.max_buffer_px,
            "FixedSizeVirtualScrollStrategy::set_config"
        );
        self.config = config;
        Ok(())
    }

    /// Replaces the geometry and immediately recomputes the total size and rendered range.
    ///
    /// # Errors
    ///
    /// Returns the error of [`FixedSizeConfig::validate`]; nothing is changed in that case.
    pub fn update_item_and_buffer_size(
        &mut self,
        config: FixedSizeConfig,
        viewport: &mut dyn ViewportHandle,
    ) -> Result<()> {
        self.set_config(config)?;
        self.update_total_content_size(viewport);
        self.update_rendered_range(viewport);
        Ok(())
    }

    fn update_total_content_size(&self, viewport: &mut dyn ViewportHandle) {
        if !self.attached {
            return;
        }
        let size = self.config.total_content_size(viewport.data_length());
        viewport.set_total_content_size(size);
    }

    fn update_rendered_range(&self, viewport: &mut dyn ViewportHandle) {
        if !self.attached {
            return;
        }
        let input = RangeInput {
            rendered: viewport.rendered_range(),
            viewport_size: viewport.viewport_size(),
            data_length: viewport.data_length(),
            scroll_offset: viewport.measure_scroll_offset(None),
        };
        let update = self.config.compute(input);
        vtrace!(
            ?input,
            start = update.range.start,
            end = update.range.end,
            first_visible = update.first_visible_index,
            "FixedSizeVirtualScrollStrategy::update_rendered_range"
        );

        viewport.set_rendered_range(update.range);
        viewport.set_rendered_content_offset(update.content_offset, OffsetAnchor::ToStart);
        self.scrolled_index_change.next(update.first_visible_index);
    }
}

impl VirtualScrollStrategy for FixedSizeVirtualScrollStrategy {
    fn scrolled_index_change(&self) -> Subject<usize> {
        self.scrolled_index_change.clone()
    }

    fn attach(&mut self, viewport: &mut dyn ViewportHandle) {
        vdebug!(
            item_size = self.config.item_size,
            data_length = viewport.data_length(),
            "FixedSizeVirtualScrollStrategy::attach"
        );
        self.attached = true;
        self.update_total_content_size(viewport);
        self.update_rendered_range(viewport);
    }

    fn detach(&mut self) {
        vdebug!("FixedSizeVirtualScrollStrategy::detach");
        self.scrolled_index_change.complete();
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn on_content_scrolled(&mut self, viewport: &mut dyn ViewportHandle) {
        self.update_rendered_range(viewport);
    }

    fn on_data_length_changed(&mut self, viewport: &mut dyn ViewportHandle) {
        self.update_total_content_size(viewport);
        self.update_rendered_range(viewport);
    }

    fn on_content_rendered(&mut self, _viewport: &mut dyn ViewportHandle) {}

    fn on_rendered_offset_changed(&mut self, _viewport: &mut dyn ViewportHandle) {}

    fn scroll_to_index(
        &mut self,
        viewport: &mut dyn ViewportHandle,
        index: usize,
        behavior: ScrollBehavior,
    ) {
        if !self.attached {
            return;
        }
        viewport.scroll_to_offset(index as f64 * self.config.item_size, behavior);
    }
}
