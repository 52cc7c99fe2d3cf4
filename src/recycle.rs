use crate::differ::{IterableChanges, Operation};
use crate::view::{EmbeddedView, ItemContext, ViewHost};

/// Number of detached views kept for reuse by default.
pub const DEFAULT_VIEW_CACHE_SIZE: usize = 20;

/// Applies differ operations to a view container, recycling views instead of destroying them.
///
/// Removed views are detached and pushed onto a bounded cache; inserts pop the most recently
/// cached view before falling back to creating one. Once the cache is full, further removed
/// views are destroyed. Cached views keep no context; a reused view gets a fresh one.
#[derive(Debug)]
pub struct RecycleViewRepeater<V> {
    cache: Vec<V>,
    view_cache_size: usize,
}

impl<V> Default for RecycleViewRepeater<V> {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_CACHE_SIZE)
    }
}

impl<V> RecycleViewRepeater<V> {
    pub fn new(view_cache_size: usize) -> Self {
        Self {
            cache: Vec::new(),
            view_cache_size,
        }
    }

    pub fn view_cache_size(&self) -> usize {
        self.view_cache_size
    }

    /// Changes the cache bound. Views beyond the new bound are destroyed.
    pub fn set_view_cache_size<T, H>(&mut self, view_cache_size: usize, host: &mut H)
    where
        H: ViewHost<T, View = V>,
    {
        self.view_cache_size = view_cache_size;
        while self.cache.len() > view_cache_size {
            if let Some(view) = self.cache.pop() {
                host.destroy_view(view);
            }
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Applies `changes` to `container` so it lines up with `items`.
    ///
    /// `context_for(current_index, item)` builds the context of an inserted view; positions
    /// are refreshed by the caller once all operations ran.
    pub fn apply_changes<T, H>(
        &mut self,
        changes: &IterableChanges,
        container: &mut Vec<EmbeddedView<T, V>>,
        host: &mut H,
        items: &[T],
        context_for: impl Fn(usize, &T) -> ItemContext<T>,
    ) where
        T: Clone,
        H: ViewHost<T, View = V>,
    {
        for op in &changes.operations {
            match *op {
                Operation::Insert { current_index } => {
                    let context = context_for(current_index, &items[current_index]);
                    let mut view = match self.cache.pop() {
                        Some(view) => view,
                        None => host.create_view(&context),
                    };
                    host.insert_view(&mut view, current_index);
                    container.insert(current_index, EmbeddedView { view, context });
                }
                Operation::Remove {
                    adjusted_previous_index,
                } => {
                    let EmbeddedView { mut view, .. } = container.remove(adjusted_previous_index);
                    host.detach_view(&mut view);
                    self.cache_or_destroy(view, host);
                }
                Operation::Move {
                    adjusted_previous_index,
                    current_index,
                } => {
                    let mut moved = container.remove(adjusted_previous_index);
                    moved.context.item = items[current_index].clone();
                    host.insert_view(&mut moved.view, current_index);
                    container.insert(current_index, moved);
                }
            }
        }
    }

    fn cache_or_destroy<T, H>(&mut self, view: V, host: &mut H)
    where
        H: ViewHost<T, View = V>,
    {
        if self.cache.len() < self.view_cache_size {
            self.cache.push(view);
        } else {
            host.destroy_view(view);
        }
    }

    /// Destroys every cached view.
    pub fn detach<T, H>(&mut self, host: &mut H)
    where
        H: ViewHost<T, View = V>,
    {
        for view in self.cache.drain(..) {
            host.destroy_view(view);
        }
    }
}
