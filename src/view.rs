use crate::{Orientation, ViewExtent};

/// Per-view template context: the bound item plus its position in the full dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemContext<T> {
    pub item: T,
    /// Index of `item` in the full (untruncated) dataset.
    pub index: usize,
    /// Length of the full dataset.
    pub count: usize,
    pub first: bool,
    pub last: bool,
    pub even: bool,
    pub odd: bool,
}

impl<T> ItemContext<T> {
    pub fn new(item: T, index: usize, count: usize) -> Self {
        let mut context = Self {
            item,
            index,
            count,
            first: false,
            last: false,
            even: false,
            odd: false,
        };
        context.set_position(index, count);
        context
    }

    /// Updates `index`/`count` and the flags derived from them.
    pub fn set_position(&mut self, index: usize, count: usize) {
        self.index = index;
        self.count = count;
        self.first = index == 0;
        self.last = index + 1 == count;
        self.even = index % 2 == 0;
        self.odd = !self.even;
    }
}

/// Creates, updates, measures and destroys the platform views a
/// [`crate::VirtualForOf`] renders items into.
///
/// The repeater owns the views it gets from [`Self::create_view`] and keeps detached ones in a
/// bounded cache for reuse; the host only sees them again through the other hooks.
pub trait ViewHost<T> {
    type View;

    fn create_view(&mut self, context: &ItemContext<T>) -> Self::View;

    /// Runs change detection for one view with its current context.
    fn update_view(&mut self, view: &mut Self::View, context: &ItemContext<T>);

    fn destroy_view(&mut self, view: Self::View);

    /// Called when a view is (re)inserted into the rendered block at `index`.
    fn insert_view(&mut self, _view: &mut Self::View, _index: usize) {}

    /// Called when a view leaves the rendered block and is parked in the recycling cache.
    fn detach_view(&mut self, _view: &mut Self::View) {}

    /// Laid-out extent of the view along `orientation`, or `None` for a view without nodes.
    fn measure_view(&self, view: &Self::View, orientation: Orientation) -> Option<ViewExtent>;
}

/// A live view together with the context it was last rendered with.
#[derive(Clone, Debug)]
pub struct EmbeddedView<T, V> {
    pub view: V,
    pub context: ItemContext<T>,
}
