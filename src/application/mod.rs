//! Application services: rendering, page composition, preview and assistant.

pub mod assistant;
pub mod error;
pub mod page;
pub mod preview;
pub mod render;
