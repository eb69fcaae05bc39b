//! Streaming domain.
//!
//! - [`event::StreamEvent`]: fragment / done / error
//! - [`queue::FragmentQueue`]: ordered display units awaiting reveal

pub mod event;
pub mod queue;
