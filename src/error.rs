use crate::Range;

/// Configuration errors raised by the virtual scrolling components.
///
/// These are programming mistakes (inverted buffers, a viewport without a strategy, a second
/// repeater, measuring items that are not rendered). Geometry that is only momentarily
/// inconsistent, such as a scroll offset past the end of a list that just shrank, is clamped
/// instead and never reported here.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum VirtualScrollError {
    #[error(
        "maxBufferPx ({max_buffer_px}) must be greater than or equal to minBufferPx ({min_buffer_px})"
    )]
    BufferSizeInverted {
        min_buffer_px: f64,
        max_buffer_px: f64,
    },

    #[error("item size must be a finite, non-negative number of pixels (got {item_size})")]
    InvalidItemSize { item_size: f64 },

    #[error("a virtual scroll viewport requires a scroll strategy")]
    MissingStrategy,

    #[error("the virtual scroll viewport is already attached to a repeater")]
    RepeaterAlreadyAttached,

    #[error("attempted to measure {requested:?}, which is outside the rendered range {rendered:?}")]
    RangeNotRendered { requested: Range, rendered: Range },
}

pub type Result<T, E = VirtualScrollError> = std::result::Result<T, E>;
