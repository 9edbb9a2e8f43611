//! Growable wire buffer
//!
//! Serializers write at explicit offsets; the buffer grows incrementally
//! (at least doubling) so repeated appends stay amortized-cheap.

use crate::core::config::ProtocolConfig;

/// Byte buffer with incremental growth and offset-addressed writes
#[derive(Debug, Clone, Default)]
pub struct WireBuffer {
    bytes: Vec<u8>,
}

impl WireBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer pre-sized to a capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer pre-sized to the configured outbound capacity
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::with_capacity(config.initial_buffer_capacity)
    }

    /// Grow the addressable region to at least `len` bytes
    ///
    /// New bytes are zeroed. Growth at least doubles the previous size so a
    /// sequence of small extensions does not reallocate linearly.
    pub fn ensure(&mut self, len: usize) {
        if len > self.bytes.len() {
            let target = len.max(self.bytes.len() * 2).max(16);
            self.bytes.resize(target, 0);
        }
    }

    /// Copy bytes into the buffer at an offset, growing as needed
    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        self.ensure(offset + data.len());
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Addressable length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are addressable yet
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Immutable view of the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable view of the buffer
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Consume the buffer, returning the raw bytes
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}
