//! A minimal single-threaded publish/subscribe channel.
//!
//! [`Subject`] is the notification substrate between the viewport, its strategy, the repeater
//! and consumers. It comes in three flavours:
//! - plain: values go to the listeners registered at emission time,
//! - replay-latest: additionally caches the last value and hands it to late subscribers,
//! - distinct: suppresses a value equal to the previously emitted one.
//!
//! Every subject can be completed, after which emissions are ignored and all listeners are
//! dropped. Subscriptions unsubscribe when dropped.
//!
//! A value emitted from inside a listener is queued and delivered once the current emission
//! has reached every listener, so listeners always observe values in emission order.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Inner<T> {
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
    last: Option<T>,
    replay: bool,
    distinct: Option<fn(&T, &T) -> bool>,
    closed: bool,
    queued: VecDeque<T>,
    dispatching: bool,
}

impl<T> Inner<T> {
    fn is_subscribed(&self, id: u64) -> bool {
        self.listeners.iter().any(|(i, _)| *i == id)
    }

    fn remove(&mut self, id: u64) {
        self.listeners.retain(|(i, _)| *i != id);
    }
}

/// A cloneable handle to a publish/subscribe channel. Clones share the same listeners.
pub struct Subject<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Subject")
            .field("observers", &inner.listeners.len())
            .field("replay", &inner.replay)
            .field("distinct", &inner.distinct.is_some())
            .field("closed", &inner.closed)
            .finish()
    }
}

impl<T: Clone + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> Subject<T> {
    fn with_flags(replay: bool, distinct: Option<fn(&T, &T) -> bool>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                listeners: Vec::new(),
                next_id: 0,
                last: None,
                replay,
                distinct,
                closed: false,
                queued: VecDeque::new(),
                dispatching: false,
            })),
        }
    }

    pub fn new() -> Self {
        Self::with_flags(false, None)
    }

    /// A subject that hands the most recent value to every new subscriber.
    pub fn replay_latest() -> Self {
        Self::with_flags(true, None)
    }

    /// A subject that drops a value equal to the one emitted just before it.
    pub fn distinct() -> Self
    where
        T: PartialEq,
    {
        Self::with_flags(false, Some(T::eq))
    }

    pub fn next(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return;
            }
            inner.queued.push_back(value);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }
        while let Some(value) = self.take_queued() {
            self.dispatch(&value);
        }
    }

    /// Pops the next queued value, or ends the dispatch loop when there is none.
    fn take_queued(&self) -> Option<T> {
        let mut inner = self.inner.borrow_mut();
        let value = if inner.closed {
            None
        } else {
            inner.queued.pop_front()
        };
        if value.is_none() {
            inner.queued.clear();
            inner.dispatching = false;
        }
        value
    }

    fn dispatch(&self, value: &T) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            if let (Some(eq), Some(prev)) = (inner.distinct, inner.last.as_ref()) {
                if eq(prev, value) {
                    return;
                }
            }
            if inner.replay || inner.distinct.is_some() {
                inner.last = Some(value.clone());
            }
            inner.listeners.clone()
        };

        for (id, listener) in listeners {
            // A listener may have unsubscribed another one (or the subject may have been
            // completed) while this emission was in flight.
            if !self.inner.borrow().is_subscribed(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut f) => (&mut *f)(value),
                Err(_) => {
                    vwarn!(id, "Subject::next: listener is already running");
                }
            }
        }
    }

    /// Registers `f`. Replay-latest subjects call it immediately with the cached value.
    ///
    /// Subscribing to a completed subject returns an inert subscription.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        let listener: Listener<T> = Rc::new(RefCell::new(f));
        let (id, replayed) = {
            let mut inner = self.inner.borrow_mut();
            if inner.closed {
                return Subscription::empty();
            }
            let id = inner.next_id;
            inner.next_id = inner.next_id.wrapping_add(1);
            inner.listeners.push((id, Rc::clone(&listener)));
            let replayed = if inner.replay { inner.last.clone() } else { None };
            (id, replayed)
        };

        if let Some(value) = replayed {
            let mut f = listener.borrow_mut();
            (&mut *f)(&value);
        }

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            teardown: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// The cached value of a replay-latest subject (or the last value a distinct subject let
    /// through).
    pub fn latest(&self) -> Option<T> {
        self.inner.borrow().last.clone()
    }
}

impl<T> Subject<T> {
    /// Completes the subject: listeners are dropped and further emissions are ignored.
    pub fn complete(&self) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.closed = true;
            inner.last = None;
            inner.queued.clear();
            std::mem::take(&mut inner.listeners)
        };
        // Dropped outside the borrow: a listener may own subscriptions to this subject.
        drop(listeners);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// A handle to a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn empty() -> Self {
        Self { teardown: None }
    }

    pub fn is_active(&self) -> bool {
        self.teardown.is_some()
    }

    pub fn unsubscribe(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
