use std::fmt;
use std::rc::Rc;

use crate::Range;
use crate::stream::Subject;

/// What a [`DataSource`] learns about the component consuming it.
#[derive(Clone, Debug)]
pub struct CollectionViewer {
    /// Emits the range of items the viewer currently renders.
    pub view_change: Subject<Range>,
}

/// A source of datasets that can be connected to a repeater.
///
/// `connect` is called once per repeater binding; the returned stream pushes whole datasets.
/// `disconnect` is called before the repeater switches to another source or is destroyed.
pub trait DataSource<T> {
    fn connect(&mut self, viewer: &CollectionViewer) -> Subject<Rc<[T]>>;

    fn disconnect(&mut self, viewer: &CollectionViewer);
}

/// A [`DataSource`] over a fixed list or an existing stream of lists.
pub struct ArrayDataSource<T> {
    stream: Subject<Rc<[T]>>,
}

impl<T: Clone + 'static> ArrayDataSource<T> {
    pub fn new(items: impl Into<Rc<[T]>>) -> Self {
        let stream = Subject::replay_latest();
        stream.next(items.into());
        Self { stream }
    }

    pub fn from_stream(stream: Subject<Rc<[T]>>) -> Self {
        Self { stream }
    }
}

impl<T: Clone + 'static> DataSource<T> for ArrayDataSource<T> {
    fn connect(&mut self, _viewer: &CollectionViewer) -> Subject<Rc<[T]>> {
        self.stream.clone()
    }

    fn disconnect(&mut self, _viewer: &CollectionViewer) {}
}

impl<T> fmt::Debug for ArrayDataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayDataSource")
            .field("stream", &self.stream)
            .finish()
    }
}

/// Anything a repeater can be bound to.
pub enum DataInput<T> {
    /// A static list.
    Items(Vec<T>),
    /// A push stream of whole datasets.
    Stream(Subject<Rc<[T]>>),
    Source(Box<dyn DataSource<T>>),
}

impl<T: Clone + 'static> DataInput<T> {
    pub(crate) fn into_source(self) -> Box<dyn DataSource<T>> {
        match self {
            Self::Items(items) => Box::new(ArrayDataSource::new(items)),
            Self::Stream(stream) => Box::new(ArrayDataSource::from_stream(stream)),
            Self::Source(source) => source,
        }
    }
}

impl<T> From<Vec<T>> for DataInput<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Items(items)
    }
}

impl<T> From<Subject<Rc<[T]>>> for DataInput<T> {
    fn from(stream: Subject<Rc<[T]>>) -> Self {
        Self::Stream(stream)
    }
}

impl<T> fmt::Debug for DataInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items(items) => f.debug_tuple("Items").field(&items.len()).finish(),
            Self::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
            Self::Source(_) => f.write_str("Source(..)"),
        }
    }
}
