//! Binary network protocol
//!
//! A compact, self-describing wire format for game state. Every serialized
//! object starts with a fixed five-byte prefix — type id, content length,
//! null-mask length — followed by the null mask (when the type has nullable
//! fields) and the field data. Logically-null values are omitted from the
//! stream entirely; only their mask bit is set. All multi-byte values are
//! little-endian regardless of host.

pub mod buffer;
pub mod header;
pub mod message;
pub mod null_mask;
pub mod session;
pub mod value;

pub use buffer::WireBuffer;
pub use header::{Header, HeaderScalar, ObjectHeader};
pub use message::{decode, encode, peek_frame, FrameInfo, WireMessage};
pub use null_mask::NullMask;
pub use session::{Connection, ConnectionState, ExchangeBuffer, SessionError};
pub use value::WireValue;

use thiserror::Error;

/// Errors produced by protocol readers and writers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Attempted to read beyond the end of the buffer
    #[error("buffer too short")]
    OutOfBounds,

    /// UTF-8 decoding failed
    #[error("invalid utf-8")]
    InvalidUtf8,

    /// A length field exceeded what the wire format can carry
    #[error("length too large for wire format")]
    LengthTooLarge,

    /// A boolean byte held something other than 0 or 1
    #[error("invalid boolean byte {0}")]
    InvalidBool(u8),

    /// Frame carried a different type id than the decoder expected
    #[error("unexpected type id {found}, expected {expected}")]
    UnexpectedTypeId {
        /// Type id the decoder was asked to produce
        expected: u16,
        /// Type id found in the frame header
        found: u16,
    },
}
