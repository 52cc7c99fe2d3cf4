/// A half-open index interval `[start, end)` into the logical dataset.
///
/// The type does not enforce `start <= end <= data_length`; producers of a range (the
/// strategies and the viewport) are responsible for clamping it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start: usize,
    pub end: usize, // exclusive
}

impl Range {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Whether `other` lies entirely inside `self`. An empty `other` is always contained.
    pub fn contains_range(&self, other: Range) -> bool {
        other.is_empty() || (other.start >= self.start && other.end <= self.end)
    }

    /// Clamps both endpoints into `[0, len]`.
    pub fn clamp_to(&self, len: usize) -> Self {
        let end = self.end.min(len);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

/// The scroll axis of a viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

impl Orientation {
    /// The CSS translate axis used for the content transform.
    pub(crate) fn axis(self) -> char {
        match self {
            Self::Horizontal => 'X',
            Self::Vertical => 'Y',
        }
    }
}

/// Text direction of the layout the viewport lives in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// A physical edge of an element's bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhysicalEdge {
    Top,
    Bottom,
    Left,
    Right,
}

/// An edge as requested by callers. `Start`/`End` follow the text direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollEdge {
    Top,
    Bottom,
    Left,
    Right,
    Start,
    End,
}

impl ScrollEdge {
    /// The edge offsets are measured from when none is given.
    pub fn leading(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => Self::Start,
            Orientation::Vertical => Self::Top,
        }
    }

    pub fn resolve(self, direction: Direction) -> PhysicalEdge {
        let rtl = direction == Direction::Rtl;
        match self {
            Self::Top => PhysicalEdge::Top,
            Self::Bottom => PhysicalEdge::Bottom,
            Self::Left => PhysicalEdge::Left,
            Self::Right => PhysicalEdge::Right,
            Self::Start if rtl => PhysicalEdge::Right,
            Self::Start => PhysicalEdge::Left,
            Self::End if rtl => PhysicalEdge::Left,
            Self::End => PhysicalEdge::Right,
        }
    }
}

/// Which edge of the rendered content block a content offset is measured to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OffsetAnchor {
    #[default]
    ToStart,
    ToEnd,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Instant,
    Smooth,
}

/// A physical scroll request handed to a [`crate::ScrollableElement`].
///
/// The viewport sets exactly one offset. Horizontal requests arrive as `left` in LTR
/// layouts and as `right` (distance from the right edge) in RTL layouts; converting
/// `right` into the element's native scroll coordinate is up to the element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollToOptions {
    pub top: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub behavior: ScrollBehavior,
}

/// The extent of a rendered view along the scroll axis, in the scrollable's coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewExtent {
    pub start: f64,
    pub end: f64,
}

impl ViewExtent {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> f64 {
        self.end - self.start
    }
}
