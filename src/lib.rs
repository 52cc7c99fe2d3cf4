//! A headless virtual scrolling engine: render only the slice of a large list that is
//! visible in a scrollable viewport, plus configurable buffers.
//!
//! Three components cooperate:
//! - a [`VirtualScrollStrategy`] decides which index range to render. The bundled
//!   [`FixedSizeVirtualScrollStrategy`] assumes every item has the same size along the scroll
//!   axis.
//! - a [`VirtualScrollViewport`] measures the scrollable, tracks data length, rendered range,
//!   content offset and total content size, and batches the resulting updates.
//! - a [`VirtualForOf`] repeater binds a data source to the viewport, diffs the rendered slice
//!   and recycles views.
//!
//! The crate is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`ScrollableElement`] (scroll offsets, viewport size, content transform and spacer)
//! - a [`ViewHost`] (creating, updating, measuring and destroying item views)
//! - the event pump: scroll/resize events, animation frames and microtask boundaries
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod data_source;
mod differ;
mod element;
mod error;
mod fixed_size;
mod key;
mod recycle;
mod repeater;
mod scheduler;
mod stream;
mod strategy;
mod types;
mod view;
mod viewport;


pub use data_source::{ArrayDataSource, CollectionViewer, DataInput, DataSource};
pub use differ::{IterableChanges, IterableDiffer, Operation};
pub use element::ScrollableElement;
pub use error::{Result, VirtualScrollError};
pub use fixed_size::{FixedSizeConfig, FixedSizeVirtualScrollStrategy, RangeInput, RangeUpdate};
pub use key::TrackKey;
pub use recycle::{DEFAULT_VIEW_CACHE_SIZE, RecycleViewRepeater};
pub use repeater::{RepeaterId, TrackByFn, VirtualForOf};
pub use stream::{Subject, Subscription};
pub use strategy::{ViewportHandle, VirtualScrollStrategy};
pub use types::{
    Direction, OffsetAnchor, Orientation, PhysicalEdge, Range, ScrollBehavior, ScrollEdge,
    ScrollToOptions, ViewExtent,
};
pub use view::{EmbeddedView, ItemContext, ViewHost};
pub use viewport::{ScrollScheduler, ViewportOptions, VirtualScrollViewport};
