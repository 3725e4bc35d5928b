#![forbid(unsafe_code)]

//! Ordered publish/subscribe and call-rate gates.
//!
//! - [`Subject`]: a minimal notification point; subscribers are invoked
//!   synchronously, in registration order, with per-subscriber failure
//!   isolation.
//! - [`EventEmitter`]: named channels layered over [`Subject`].
//! - [`Debounce`] / [`Throttle`]: poll-driven call gates; the caller supplies
//!   the clock, nothing sleeps or schedules.
//!
//! All types are single-threaded (`Rc`-based) and perform no I/O.

pub mod emitter;
pub mod gate;
pub mod subject;

pub use emitter::EventEmitter;
pub use gate::{Debounce, Throttle};
pub use subject::{NotifyOutcome, Subject, SubscriberError};
