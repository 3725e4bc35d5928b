#![forbid(unsafe_code)]

//! Named-event channels over [`Subject`].
//!
//! An [`EventEmitter<T>`] maps event names to independent [`Subject`]
//! channels: `on("login", ..)` registers a listener, `emit("login", ..)`
//! notifies exactly that channel. Ordering and failure-isolation semantics
//! within a channel are [`Subject`]'s.
//!
//! # Invariants
//!
//! 1. Channels are independent; emitting one event never invokes listeners
//!    of another.
//! 2. Emitting an event nobody listens to is a no-op with a clean outcome.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::trace;

use crate::subject::{NotifyOutcome, Subject, SubscriberError};

/// Named-event publish/subscribe, one [`Subject`] per event name.
///
/// Cloning shares the channel table. Single-threaded, like everything in
/// this crate.
pub struct EventEmitter<T> {
    channels: Rc<RefCell<AHashMap<String, Subject<T>>>>,
}

impl<T> Clone for EventEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            channels: Rc::clone(&self.channels),
        }
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("channels", &self.channels.borrow().len())
            .finish()
    }
}

impl<T> EventEmitter<T> {
    /// Create an emitter with no channels.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Rc::new(RefCell::new(AHashMap::new())),
        }
    }

    /// Register an infallible listener for `event`, creating the channel on
    /// first use.
    pub fn on(&self, event: &str, f: impl Fn(&T) + 'static) {
        self.channel(event).subscribe(f);
    }

    /// Register a fallible listener for `event`. `Err` returns are isolated
    /// per listener, as in [`Subject::subscribe_fallible`].
    pub fn on_fallible(
        &self,
        event: &str,
        f: impl Fn(&T) -> Result<(), SubscriberError> + 'static,
    ) {
        self.channel(event).subscribe_fallible(f);
    }

    /// Notify every listener of `event`, in registration order.
    ///
    /// An event with no channel returns a clean, empty outcome.
    pub fn emit(&self, event: &str, payload: &T) -> NotifyOutcome {
        let channel = self.channels.borrow().get(event).cloned();
        match channel {
            Some(channel) => channel.notify(payload),
            None => {
                trace!(event, "emit without listeners");
                NotifyOutcome::default()
            }
        }
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.channels
            .borrow()
            .get(event)
            .map_or(0, Subject::subscriber_count)
    }

    /// Names of all channels that have ever had a listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Channel handle for `event`, created on demand.
    ///
    /// The handle is cloned out so the table borrow is released before any
    /// subscription runs.
    fn channel(&self, event: &str) -> Subject<T> {
        self.channels
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
