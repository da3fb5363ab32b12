//! Length-prefixed framing and `Request`/`Response` encode/decode for the
//! ACT wire protocol.

pub mod framing;

pub use framing::{decode_response, encode_request, frame, FrameDecoder};
