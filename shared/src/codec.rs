//! Length-prefixed codec for the bridge stream
//!
//! Every envelope is framed as:
//! ```text
//! [ 4 bytes: length (u32, big-endian) ][ N bytes: protobuf Envelope ]
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use prost::Message;
use thiserror::Error;

use crate::Envelope;

/// Largest frame accepted in either direction (1 MiB)
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

const LENGTH_PREFIX: usize = 4;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Frame too large: {0} bytes (max: {MAX_FRAME_SIZE})")]
    FrameTooLarge(usize),

    #[error("Invalid frame length prefix: {0}")]
    InvalidLength(u32),

    #[error("Protobuf decode error: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("Protobuf encode error: {0}")]
    EncodeError(#[from] prost::EncodeError),
}

/// Encode an Envelope into a length-prefixed byte buffer
pub fn encode(envelope: &Envelope) -> Result<Bytes, CodecError> {
    let msg_len = envelope.encoded_len();

    if msg_len > MAX_FRAME_SIZE as usize {
        return Err(CodecError::FrameTooLarge(msg_len));
    }

    let mut buf = BytesMut::with_capacity(LENGTH_PREFIX + msg_len);

    // Length prefix (big-endian u32), then the message itself
    buf.put_u32(msg_len as u32);
    envelope.encode(&mut buf)?;

    Ok(buf.freeze())
}

/// Try to decode a length-prefixed Envelope from the front of a buffer
///
/// Returns:
/// - `Ok(Some(envelope))` if a complete frame was decoded and consumed
/// - `Ok(None)` if more data is needed (nothing is consumed)
/// - `Err(...)` if the data is invalid
pub fn decode(buf: &mut BytesMut) -> Result<Option<Envelope>, CodecError> {
    if buf.len() < LENGTH_PREFIX {
        return Ok(None);
    }

    // Peek at the length prefix without consuming
    let msg_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);

    // Reject before buffering a bogus length
    if msg_len > MAX_FRAME_SIZE {
        return Err(CodecError::InvalidLength(msg_len));
    }

    // Wait for the rest of the frame
    let total_len = LENGTH_PREFIX + msg_len as usize;
    if buf.len() < total_len {
        return Ok(None);
    }

    // Only consume once the whole frame is here
    buf.advance(LENGTH_PREFIX);
    let msg_bytes = buf.split_to(msg_len as usize);

    Ok(Some(Envelope::decode(msg_bytes)?))
}

/// Accumulates stream reads and yields complete frames
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Partial frame data carried over between reads
    buffer: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next frame from the buffer
    ///
    /// Call this repeatedly until it returns `Ok(None)` to drain all complete frames
    pub fn decode_next(&mut self) -> Result<Option<Envelope>, CodecError> {
        decode(&mut self.buffer)
    }

    /// Bytes buffered but not yet decoded
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }
}
