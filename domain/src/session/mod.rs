//! Generation session domain.
//!
//! - [`state::SessionState`]: lifecycle of one conversation's generation
//! - [`composer::ComposerView`]: input and send/stop state derived from it

pub mod composer;
pub mod state;
