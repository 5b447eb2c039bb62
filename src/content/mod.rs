//! Post authoring, the producer of publish events.

pub mod service;

pub use service::{PostService, PostWrite};
