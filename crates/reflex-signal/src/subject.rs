#![forbid(unsafe_code)]

//! A minimal publish/subscribe point.
//!
//! # Design
//!
//! [`Subject<T>`] owns an ordered list of subscriber callbacks behind
//! `Rc<RefCell<..>>`. [`notify`](Subject::notify) snapshots the list, then
//! invokes every callback synchronously with the payload. Cloning a
//! `Subject` creates a new handle to the **same** subscriber list.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order, every time.
//! 2. A subscriber receives every notification issued after its
//!    registration and none issued before (no replay).
//! 3. A callback returning `Err` never prevents later callbacks from
//!    running; the error is collected into the [`NotifyOutcome`] and logged
//!    at `warn`.
//! 4. Callbacks registered during a notification first hear the next one.
//!
//! # Failure Modes
//!
//! - A **panicking** callback is outside the contract and propagates to the
//!   `notify` caller; isolation applies only to `Err` returns.
//! - There is no unsubscribe: a registered callback lives as long as the
//!   subject. Registering the same closure twice invokes it twice per
//!   notification.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{trace, warn};

/// Error type subscribers may return; failures are isolated per subscriber.
pub type SubscriberError = Box<dyn std::error::Error>;

type Callback<T> = Rc<dyn Fn(&T) -> Result<(), SubscriberError>>;

/// Report of a single [`Subject::notify`] cycle.
#[derive(Debug, Default)]
#[must_use]
pub struct NotifyOutcome {
    delivered: usize,
    errors: Vec<SubscriberError>,
}

impl NotifyOutcome {
    /// Subscribers that completed without error.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Subscribers that returned an error.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// The collected subscriber errors, in notification order.
    #[must_use]
    pub fn errors(&self) -> &[SubscriberError] {
        &self.errors
    }

    /// Whether every subscriber completed without error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A publish/subscribe point parameterized by a payload type.
///
/// Intentionally minimal: no unsubscribe, no priorities, no backpressure,
/// no async dispatch. Single-threaded by design (`Rc`-based sharing).
pub struct Subject<T> {
    subscribers: Rc<RefCell<Vec<Callback<T>>>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subject")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T> Subject<T> {
    /// Create a subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Register an infallible callback.
    ///
    /// Appended to the end of the notification order. The same closure may
    /// be registered more than once and will run once per registration.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) {
        self.subscribers.borrow_mut().push(Rc::new(move |payload| {
            f(payload);
            Ok(())
        }));
    }

    /// Register a fallible callback.
    ///
    /// An `Err` return is isolated: it is reported in the
    /// [`NotifyOutcome`] without stopping delivery to later subscribers.
    pub fn subscribe_fallible(
        &self,
        f: impl Fn(&T) -> Result<(), SubscriberError> + 'static,
    ) {
        self.subscribers.borrow_mut().push(Rc::new(f));
    }

    /// Invoke every currently registered callback with `payload`.
    ///
    /// The subscriber list is snapshotted on entry, so callbacks registered
    /// during this cycle first hear the next notification.
    pub fn notify(&self, payload: &T) -> NotifyOutcome {
        let snapshot: Vec<Callback<T>> = self.subscribers.borrow().clone();
        trace!(subscribers = snapshot.len(), "notify");

        let mut outcome = NotifyOutcome::default();
        for (index, subscriber) in snapshot.iter().enumerate() {
            match subscriber(payload) {
                Ok(()) => outcome.delivered += 1,
                Err(error) => {
                    warn!(index, %error, "subscriber failed; continuing");
                    outcome.errors.push(error);
                }
            }
        }
        outcome
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
