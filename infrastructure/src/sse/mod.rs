//! Event stream wire codec.
//!
//! - [`encoder`]: `StreamEvent` to `data:` records
//! - [`decoder`]: incremental, chunking-independent record decoding
//! - [`event_stream`]: response body to `EventStream`

pub mod decoder;
pub mod encoder;
pub mod event_stream;
pub(crate) mod lines;

pub use decoder::{DecodeError, SseDecoder, decode_payload};
pub use encoder::{DONE_MARKER, encode_comment, encode_frame, encode_payload};
pub use event_stream::decode_event_stream;
