#![forbid(unsafe_code)]

//! Reflex public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use reflex_memo as memo;
    pub use reflex_signal as signal;
}
