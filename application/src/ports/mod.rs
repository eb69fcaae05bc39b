//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod fragment_source;
pub mod stream_transport;
pub mod transcript_store;
pub mod transcript_view;
