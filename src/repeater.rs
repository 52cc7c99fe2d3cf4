//! The data-to-view binder of a virtual scroll viewport.
//!
//! [`VirtualForOf`] subscribes to a data source, keeps the slice of it that falls inside the
//! viewport's rendered range, and on every change-detection pass of the viewport diffs that
//! slice against the previous one and updates a pool of recyclable views to match.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::data_source::{CollectionViewer, DataInput, DataSource};
use crate::differ::{IterableChanges, IterableDiffer};
use crate::key::TrackKey;
use crate::recycle::{DEFAULT_VIEW_CACHE_SIZE, RecycleViewRepeater};
use crate::stream::{Subject, Subscription};
use crate::view::{EmbeddedView, ItemContext, ViewHost};
use crate::{
    Orientation, Range, Result, ScrollableElement, VirtualScrollError, VirtualScrollStrategy,
    VirtualScrollViewport,
};

static NEXT_REPEATER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique identity of a repeater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RepeaterId(u64);

impl RepeaterId {
    pub(crate) fn next() -> Self {
        Self(NEXT_REPEATER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Maps `(index in the full dataset, item)` to the identity used for diffing.
pub type TrackByFn<T, K> = Rc<dyn Fn(usize, &T) -> K>;

/// The repeater as seen by the viewport it is attached to.
pub(crate) trait RenderedContent {
    fn measure_range_size(&self, range: Range, orientation: Orientation) -> Result<f64>;

    /// Applies pending data or range changes to the views.
    fn detect_changes(&self);

    fn is_destroyed(&self) -> bool;
}

struct ForOfState<T, H: ViewHost<T>, K> {
    host: H,
    data: Rc<[T]>,
    rendered_range: Option<Range>,
    rendered_items: Vec<T>,
    differ: IterableDiffer<T, K>,
    track_by: TrackByFn<T, K>,
    views: Vec<EmbeddedView<T, H::View>>,
    recycler: RecycleViewRepeater<H::View>,
    needs_update: bool,
    destroyed: bool,
}

impl<T, H, K> ForOfState<T, H, K>
where
    T: Clone + PartialEq,
    H: ViewHost<T>,
    K: TrackKey,
{
    fn new(host: H, track_by: TrackByFn<T, K>) -> Self {
        Self {
            host,
            data: Rc::from(Vec::new()),
            rendered_range: None,
            rendered_items: Vec::new(),
            differ: IterableDiffer::new(),
            track_by,
            views: Vec::new(),
            recycler: RecycleViewRepeater::new(DEFAULT_VIEW_CACHE_SIZE),
            needs_update: false,
            destroyed: false,
        }
    }

    fn on_data(&mut self, data: Rc<[T]>) {
        self.data = data;
        self.on_rendered_data_change();
    }

    fn on_rendered_range(&mut self, range: Range) {
        self.rendered_range = Some(range);
        self.on_rendered_data_change();
    }

    fn on_rendered_data_change(&mut self) {
        let Some(range) = self.rendered_range else {
            return;
        };
        let slice = range.clamp_to(self.data.len());
        self.rendered_items.clear();
        self.rendered_items
            .extend_from_slice(&self.data[slice.start..slice.end]);
        self.needs_update = true;
    }

    fn rendered_start(&self) -> usize {
        self.rendered_range.map_or(0, |r| r.start)
    }

    fn detect_changes(&mut self) {
        if !self.needs_update || self.destroyed {
            return;
        }
        let start = self.rendered_start();
        let track_by = Rc::clone(&self.track_by);
        let changes = self
            .differ
            .diff(&self.rendered_items, &|i: usize, item: &T| track_by(start + i, item));
        match changes {
            None => self.update_context(),
            Some(changes) => self.apply_changes(&changes),
        }
        self.needs_update = false;
    }

    /// Nothing was inserted, removed or moved: refresh positions and re-render each view.
    fn update_context(&mut self) {
        let start = self.rendered_start();
        let count = self.data.len();
        for (i, embedded) in self.views.iter_mut().enumerate().rev() {
            embedded.context.set_position(start + i, count);
            self.host.update_view(&mut embedded.view, &embedded.context);
        }
    }

    fn apply_changes(&mut self, changes: &IterableChanges) {
        let start = self.rendered_start();
        let count = self.data.len();
        let Self {
            host,
            views,
            recycler,
            rendered_items,
            ..
        } = self;

        recycler.apply_changes(changes, views, host, rendered_items, |i, item| {
            ItemContext::new(item.clone(), start + i, count)
        });
        for &i in &changes.identity_changes {
            views[i].context.item = rendered_items[i].clone();
        }
        for (i, embedded) in views.iter_mut().enumerate().rev() {
            embedded.context.set_position(start + i, count);
            host.update_view(&mut embedded.view, &embedded.context);
        }
    }

    fn measure_range_size(&self, range: Range, orientation: Orientation) -> Result<f64> {
        if range.is_empty() {
            return Ok(0.0);
        }
        let rendered = self.rendered_range.unwrap_or_default();
        if !rendered.contains_range(range) {
            return Err(VirtualScrollError::RangeNotRendered {
                requested: range,
                rendered,
            });
        }

        let offset = range.start - rendered.start;
        let extent_at = |i: usize| {
            self.views
                .get(offset + i)
                .and_then(|v| self.host.measure_view(&v.view, orientation))
        };
        let first = (0..range.len()).find_map(extent_at);
        let last = (0..range.len()).rev().find_map(extent_at);
        match (first, last) {
            (Some(first), Some(last)) => Ok(last.end - first.start),
            _ => {
                vwarn!(?range, "measure_range_size: no measurable views in range");
                Ok(0.0)
            }
        }
    }
}

impl<T, H: ViewHost<T>, K> ForOfState<T, H, K> {
    fn destroy(&mut self) {
        self.destroyed = true;
        self.recycler.detach::<T, H>(&mut self.host);
        for embedded in self.views.drain(..) {
            self.host.destroy_view(embedded.view);
        }
    }
}

impl<T, H, K> RenderedContent for RefCell<ForOfState<T, H, K>>
where
    T: Clone + PartialEq,
    H: ViewHost<T>,
    K: TrackKey,
{
    fn measure_range_size(&self, range: Range, orientation: Orientation) -> Result<f64> {
        self.borrow().measure_range_size(range, orientation)
    }

    fn detect_changes(&self) {
        self.borrow_mut().detect_changes();
    }

    fn is_destroyed(&self) -> bool {
        self.borrow().destroyed
    }
}

/// Renders the slice of a dataset that falls inside a viewport's rendered range.
///
/// Items are keyed with a track-by function (value identity by default). When the rendered
/// slice changes, views of removed items are parked in a bounded cache and reused for new
/// items instead of being destroyed and recreated.
///
/// A viewport supports one repeater at a time; constructing a second one against the same
/// viewport fails with [`VirtualScrollError::RepeaterAlreadyAttached`].
pub struct VirtualForOf<T, H, K = T>
where
    H: ViewHost<T>,
{
    id: RepeaterId,
    state: Rc<RefCell<ForOfState<T, H, K>>>,
    data_stream: Subject<Rc<[T]>>,
    view_change: Subject<Range>,
    viewer: CollectionViewer,
    source: Option<Box<dyn DataSource<T>>>,
    source_subscription: Option<Subscription>,
    range_subscription: Option<Subscription>,
    destroyed: bool,
}

impl<T, H> VirtualForOf<T, H, T>
where
    T: TrackKey + PartialEq + 'static,
    H: ViewHost<T> + 'static,
{
    /// Creates a repeater keyed by item value and attaches it to `viewport`.
    ///
    /// # Errors
    ///
    /// [`VirtualScrollError::RepeaterAlreadyAttached`] if `viewport` already has a live
    /// repeater.
    pub fn new<S, E>(host: H, viewport: &mut VirtualScrollViewport<S, E>) -> Result<Self>
    where
        S: VirtualScrollStrategy,
        E: ScrollableElement,
    {
        Self::with_track_by(host, viewport, |_, item: &T| item.clone())
    }
}

impl<T, H, K> VirtualForOf<T, H, K>
where
    T: Clone + PartialEq + 'static,
    H: ViewHost<T> + 'static,
    K: TrackKey + 'static,
{
    /// Creates a repeater keyed by `track_by(index, item)` and attaches it to `viewport`.
    ///
    /// `index` is the item's position in the full dataset.
    ///
    /// # Errors
    ///
    /// [`VirtualScrollError::RepeaterAlreadyAttached`] if `viewport` already has a live
    /// repeater.
    pub fn with_track_by<S, E>(
        host: H,
        viewport: &mut VirtualScrollViewport<S, E>,
        track_by: impl Fn(usize, &T) -> K + 'static,
    ) -> Result<Self>
    where
        S: VirtualScrollStrategy,
        E: ScrollableElement,
    {
        let id = RepeaterId::next();
        let state = Rc::new(RefCell::new(ForOfState::new(host, Rc::new(track_by))));
        let data_stream: Subject<Rc<[T]>> = Subject::replay_latest();
        let view_change: Subject<Range> = Subject::new();

        let weak = Rc::downgrade(&state);
        let content: Weak<dyn RenderedContent> = weak;
        viewport.attach(id, content, &data_stream)?;
        vdebug!(id = id.get(), "VirtualForOf attached");

        // The viewport may have computed its range before this repeater existed.
        state
            .borrow_mut()
            .on_rendered_range(viewport.rendered_range());
        let range_subscription = {
            let weak = Rc::downgrade(&state);
            let view_change = view_change.clone();
            viewport
                .rendered_range_stream()
                .subscribe(move |range: &Range| {
                    if let Some(state) = weak.upgrade() {
                        state.borrow_mut().on_rendered_range(*range);
                    }
                    view_change.next(*range);
                })
        };

        Ok(Self {
            id,
            state,
            data_stream,
            viewer: CollectionViewer {
                view_change: view_change.clone(),
            },
            view_change,
            source: None,
            source_subscription: None,
            range_subscription: Some(range_subscription),
            destroyed: false,
        })
    }

    pub fn id(&self) -> RepeaterId {
        self.id
    }

    /// Binds a new data source, disconnecting the previous one first.
    pub fn set_data(&mut self, input: impl Into<DataInput<T>>) {
        if self.destroyed {
            return;
        }
        self.disconnect_source();

        let mut source = input.into().into_source();
        let stream = source.connect(&self.viewer);
        self.state.borrow_mut().needs_update = true;

        let weak = Rc::downgrade(&self.state);
        let data_stream = self.data_stream.clone();
        let subscription = stream.subscribe(move |data: &Rc<[T]>| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().on_data(Rc::clone(data));
            }
            data_stream.next(Rc::clone(data));
        });
        vdebug!(id = self.id.get(), "VirtualForOf::set_data");

        self.source_subscription = Some(subscription);
        self.source = Some(source);
    }

    /// Replaces the track-by function. Takes effect on the next diff.
    pub fn set_track_by(&mut self, track_by: impl Fn(usize, &T) -> K + 'static) {
        let mut state = self.state.borrow_mut();
        state.track_by = Rc::new(track_by);
        state.needs_update = true;
    }

    pub fn view_cache_size(&self) -> usize {
        self.state.borrow().recycler.view_cache_size()
    }

    pub fn set_view_cache_size(&mut self, view_cache_size: usize) {
        let mut state = self.state.borrow_mut();
        let ForOfState { host, recycler, .. } = &mut *state;
        recycler.set_view_cache_size::<T, H>(view_cache_size, host);
    }

    /// Replay-latest stream of every dataset the bound source produced.
    pub fn data_stream(&self) -> Subject<Rc<[T]>> {
        self.data_stream.clone()
    }

    /// Emits each rendered range this repeater receives from its viewport.
    pub fn view_change(&self) -> Subject<Range> {
        self.view_change.clone()
    }

    pub fn data(&self) -> Rc<[T]> {
        Rc::clone(&self.state.borrow().data)
    }

    pub fn rendered_range(&self) -> Option<Range> {
        self.state.borrow().rendered_range
    }

    /// Number of live views in the rendered block.
    pub fn view_count(&self) -> usize {
        self.state.borrow().views.len()
    }

    pub fn cached_view_count(&self) -> usize {
        self.state.borrow().recycler.cached_len()
    }

    /// Contexts of the live views, in rendered order.
    pub fn contexts(&self) -> Vec<ItemContext<T>> {
        self.state
            .borrow()
            .views
            .iter()
            .map(|v| v.context.clone())
            .collect()
    }

    pub fn with_views<R>(&self, f: impl FnOnce(&[EmbeddedView<T, H::View>]) -> R) -> R {
        f(&self.state.borrow().views)
    }

    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.state.borrow_mut().host)
    }

    /// Total extent of the views rendered for `range`.
    ///
    /// # Errors
    ///
    /// [`VirtualScrollError::RangeNotRendered`] when `range` is not inside the rendered range.
    pub fn measure_range_size(&self, range: Range, orientation: Orientation) -> Result<f64> {
        self.state.borrow().measure_range_size(range, orientation)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl<T, H, K> VirtualForOf<T, H, K>
where
    H: ViewHost<T>,
{
    fn disconnect_source(&mut self) {
        self.source_subscription = None;
        if let Some(mut source) = self.source.take() {
            source.disconnect(&self.viewer);
        }
    }

    /// Disconnects the data source, completes the streams and destroys every view.
    ///
    /// The viewport treats a destroyed repeater as detached. Dropping the repeater does the
    /// same.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        vdebug!(id = self.id.get(), "VirtualForOf::destroy");
        self.destroyed = true;
        self.range_subscription = None;
        self.disconnect_source();
        self.data_stream.complete();
        self.view_change.complete();
        self.state.borrow_mut().destroy();
    }
}

impl<T, H, K> Drop for VirtualForOf<T, H, K>
where
    H: ViewHost<T>,
{
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T, H, K> fmt::Debug for VirtualForOf<T, H, K>
where
    H: ViewHost<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("VirtualForOf")
            .field("id", &self.id)
            .field("data_len", &state.data.len())
            .field("rendered_range", &state.rendered_range)
            .field("views", &state.views.len())
            .field("cached_views", &state.recycler.cached_len())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
