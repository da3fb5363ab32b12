//! Length-prefixed frame reassembly and `Request`/`Response` encode/decode.
//!
//! Frames are `u32` little-endian length followed by that many bytes of
//! `prost`-encoded payload. [`FrameDecoder`] buffers partial reads the way
//! the reference client's `data_received` loop does: it only ever consumes a
//! frame once the whole thing has arrived, and a single malformed frame is
//! dropped rather than poisoning the rest of the stream.

use bytes::{Buf, Bytes, BytesMut};
use byteorder::{ByteOrder, LittleEndian};
use prost::Message;

use act_types::wire::{Request, Response};

const LENGTH_PREFIX_LEN: usize = 4;

/// Reassembles length-prefixed frames out of an arbitrarily-chunked byte stream.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buffer: BytesMut::new() }
    }

    /// Append newly-read bytes to the internal buffer.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Pull the next complete frame's raw payload out of the buffer, if one
    /// has fully arrived. Call repeatedly after a `feed` — more than one
    /// frame may have landed in a single read.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        if self.buffer.len() < LENGTH_PREFIX_LEN {
            return None;
        }
        let len = LittleEndian::read_u32(&self.buffer[..LENGTH_PREFIX_LEN]) as usize;
        if self.buffer.len() < LENGTH_PREFIX_LEN + len {
            return None;
        }
        self.buffer.advance(LENGTH_PREFIX_LEN);
        Some(self.buffer.split_to(len).freeze())
    }
}

/// Prefix `payload` with its little-endian `u32` length.
pub fn frame(payload: &[u8]) -> BytesMut {
    let mut out = BytesMut::with_capacity(LENGTH_PREFIX_LEN + payload.len());
    let mut len_bytes = [0u8; LENGTH_PREFIX_LEN];
    LittleEndian::write_u32(&mut len_bytes, payload.len() as u32);
    out.extend_from_slice(&len_bytes);
    out.extend_from_slice(payload);
    out
}

/// Encode a `Request` into a length-prefixed frame ready to write to the socket.
pub fn encode_request(request: &Request) -> BytesMut {
    frame(&request.encode_to_vec())
}

/// Decode a frame's payload as a `Response`. A malformed payload is logged
/// and discarded rather than propagated, matching the wire protocol's own
/// tolerance for the occasional bad frame.
pub fn decode_response(payload: &[u8]) -> Option<Response> {
    match Response::decode(payload) {
        Ok(response) => Some(response),
        Err(err) => {
            tracing::warn!(error = %err, bytes = payload.len(), "dropping malformed response frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use act_types::wire::{ActRequest, ActRequestType, RequestPayload, SubProtocolType};

    fn sample_request() -> Request {
        Request {
            sub_protocol_type: SubProtocolType::Act as i32,
            payload: Some(RequestPayload::Act(ActRequest {
                request_type: ActRequestType::Login as i32,
                client_id: 1,
                login_request: None,
            })),
        }
    }

    #[test]
    fn partial_frame_is_buffered_until_complete() {
        let frame_bytes = encode_request(&sample_request());
        let mut decoder = FrameDecoder::new();
        decoder.feed(&frame_bytes[..2]);
        assert!(decoder.next_frame().is_none());
        decoder.feed(&frame_bytes[2..]);
        let payload = decoder.next_frame().expect("frame should now be complete");
        assert_eq!(payload.len(), frame_bytes.len() - 4);
    }

    #[test]
    fn two_frames_in_one_read_both_come_out() {
        let a = encode_request(&sample_request());
        let b = encode_request(&sample_request());
        let mut both = BytesMut::new();
        both.extend_from_slice(&a);
        both.extend_from_slice(&b);

        let mut decoder = FrameDecoder::new();
        decoder.feed(&both);
        assert!(decoder.next_frame().is_some());
        assert!(decoder.next_frame().is_some());
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn malformed_payload_is_dropped_not_propagated() {
        assert_eq!(decode_response(&[0xFF, 0xFF, 0xFF]), None);
    }

    #[test]
    fn decoder_recovers_after_a_bad_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&frame(&[0xFF, 0xFF, 0xFF]));
        decoder.feed(&encode_request(&sample_request()));

        let bad = decoder.next_frame().unwrap();
        assert!(decode_response(&bad).is_none());

        let good = decoder.next_frame().unwrap();
        assert!(!good.is_empty());
    }
}
