//! This crate turns an upstream iCalendar feed into a prioritized one.
//! Events whose description links to a Zoom meeting get their own priority and reminder,
//! every other event gets another.
//!
//! The transformation is exposed as a library so that the server and the CLI share it.

pub use ical;

pub mod classifier;
pub mod date;
pub mod error;
pub mod event;
pub mod feed_client;
pub mod parser;
pub mod policy;
pub mod serializer;
