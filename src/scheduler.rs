use std::collections::VecDeque;

/// Work the viewport defers until after the next change-detection flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AfterFlush {
    /// Tell the strategy a new range has been rendered.
    ContentRendered,
    /// Finish an end-relative offset rewrite, or tell the strategy the offset moved.
    OffsetChanged,
}

/// Coalesces change-detection requests into a single deferred flush.
///
/// Requests made while a flush is pending only append their after-flush action; the flush
/// itself is scheduled once. Actions run in the order they were requested.
#[derive(Clone, Debug, Default)]
pub(crate) struct ChangeDetectionBatch {
    pending: bool,
    after: VecDeque<AfterFlush>,
}

impl ChangeDetectionBatch {
    /// Returns `true` when this request scheduled a new flush.
    pub(crate) fn request(&mut self, after: Option<AfterFlush>) -> bool {
        if let Some(action) = after {
            self.after.push_back(action);
        }
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    /// Starts a flush: clears the pending flag and hands out the queued actions.
    ///
    /// Actions requested while these run belong to the next flush.
    pub(crate) fn begin(&mut self) -> VecDeque<AfterFlush> {
        self.pending = false;
        std::mem::take(&mut self.after)
    }

    pub(crate) fn clear(&mut self) {
        self.pending = false;
        self.after.clear();
    }
}

/// Collapses a burst of events into one emission at the next scheduling boundary, like an
/// audit with a zero duration: the boundary fires once, after the latest event.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AuditGate {
    armed: bool,
}

impl AuditGate {
    /// Returns `true` if the gate was idle, i.e. this event needs a boundary scheduled.
    pub(crate) fn arm(&mut self) -> bool {
        !std::mem::replace(&mut self.armed, true)
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }

    /// Fires the gate. Returns whether any event arrived since the last boundary.
    pub(crate) fn fire(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}
