//! REST implementation of [`ReviewApi`](crate::services::ReviewApi).

mod client;

pub use client::RestBackend;
