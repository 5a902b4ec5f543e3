//! Change notification bus
//!
//! Repositories publish a [`ChangeEvent`](shared::ChangeEvent) after every
//! successful write; subscribers (open admin pages, the SSE endpoint, the
//! logger) react by reloading.

mod bus;

pub use bus::{ChangeBus, ChangeHandler, ResourceVersions, Subscription};
