//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`AnimationParams`]: reveal pacing on the client
//! - [`StreamParams`]: buffering of server-side generation streams

pub mod animation_params;
pub mod stream_params;

pub use animation_params::AnimationParams;
pub use stream_params::StreamParams;
