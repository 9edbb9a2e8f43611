//! Value serializers
//!
//! Per-type binary encode/decode with explicit size contracts. Fixed-width
//! types answer their size without touching the buffer; variable-width
//! types read only their own length prefix, so transport framing can
//! measure a value before fully decoding it. Support for a type is the
//! trait impl itself — there is no runtime registry to consult.

use crate::foundation::math::Vec2;
use crate::protocol::buffer::WireBuffer;
use crate::protocol::null_mask::NullMask;
use crate::protocol::ProtocolError;

/// A value that can cross the wire
pub trait WireValue: Sized {
    /// Encoded size of this value in bytes
    fn wire_size(&self) -> u16;

    /// Encoded size of the value starting at `offset`, read from the
    /// buffer's own framing without fully decoding
    fn size_from_buffer(buffer: &[u8], offset: usize) -> Result<u16, ProtocolError>;

    /// Encode into the buffer at `offset`, growing it as needed; returns
    /// the number of bytes written
    fn serialize(&self, buffer: &mut WireBuffer, offset: usize) -> Result<u16, ProtocolError>;

    /// Decode the value starting at `offset`
    fn deserialize(buffer: &[u8], offset: usize) -> Result<Self, ProtocolError>;
}

fn take<const N: usize>(buffer: &[u8], offset: usize) -> Result<[u8; N], ProtocolError> {
    let bytes = buffer
        .get(offset..offset + N)
        .ok_or(ProtocolError::OutOfBounds)?;
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    Ok(array)
}

macro_rules! fixed_width_value {
    ($type:ty, $size:expr) => {
        impl WireValue for $type {
            fn wire_size(&self) -> u16 {
                $size
            }

            fn size_from_buffer(_buffer: &[u8], _offset: usize) -> Result<u16, ProtocolError> {
                Ok($size)
            }

            fn serialize(&self, buffer: &mut WireBuffer, offset: usize) -> Result<u16, ProtocolError> {
                buffer.write_bytes(offset, &self.to_le_bytes());
                Ok($size)
            }

            fn deserialize(buffer: &[u8], offset: usize) -> Result<Self, ProtocolError> {
                Ok(<$type>::from_le_bytes(take::<{ $size as usize }>(buffer, offset)?))
            }
        }
    };
}

fixed_width_value!(f32, 4);
fixed_width_value!(f64, 8);
fixed_width_value!(u8, 1);
fixed_width_value!(u16, 2);
fixed_width_value!(u32, 4);
fixed_width_value!(i32, 4);

impl WireValue for bool {
    fn wire_size(&self) -> u16 {
        1
    }

    fn size_from_buffer(_buffer: &[u8], _offset: usize) -> Result<u16, ProtocolError> {
        Ok(1)
    }

    fn serialize(&self, buffer: &mut WireBuffer, offset: usize) -> Result<u16, ProtocolError> {
        buffer.write_bytes(offset, &[u8::from(*self)]);
        Ok(1)
    }

    fn deserialize(buffer: &[u8], offset: usize) -> Result<Self, ProtocolError> {
        match u8::deserialize(buffer, offset)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ProtocolError::InvalidBool(other)),
        }
    }
}

impl WireValue for Vec2 {
    fn wire_size(&self) -> u16 {
        8
    }

    fn size_from_buffer(_buffer: &[u8], _offset: usize) -> Result<u16, ProtocolError> {
        Ok(8)
    }

    fn serialize(&self, buffer: &mut WireBuffer, offset: usize) -> Result<u16, ProtocolError> {
        self.x.serialize(buffer, offset)?;
        self.y.serialize(buffer, offset + 4)?;
        Ok(8)
    }

    fn deserialize(buffer: &[u8], offset: usize) -> Result<Self, ProtocolError> {
        Ok(Self::new(
            f32::deserialize(buffer, offset)?,
            f32::deserialize(buffer, offset + 4)?,
        ))
    }
}

/// Strings carry a two-byte length prefix followed by UTF-8 bytes
impl WireValue for String {
    fn wire_size(&self) -> u16 {
        2 + u16::try_from(self.len()).unwrap_or(u16::MAX)
    }

    fn size_from_buffer(buffer: &[u8], offset: usize) -> Result<u16, ProtocolError> {
        let length = u16::deserialize(buffer, offset)?;
        Ok(2 + length)
    }

    fn serialize(&self, buffer: &mut WireBuffer, offset: usize) -> Result<u16, ProtocolError> {
        let length =
            u16::try_from(self.len()).map_err(|_| ProtocolError::LengthTooLarge)?;
        length.serialize(buffer, offset)?;
        buffer.write_bytes(offset + 2, self.as_bytes());
        Ok(2 + length)
    }

    fn deserialize(buffer: &[u8], offset: usize) -> Result<Self, ProtocolError> {
        let length = usize::from(u16::deserialize(buffer, offset)?);
        let bytes = buffer
            .get(offset + 2..offset + 2 + length)
            .ok_or(ProtocolError::OutOfBounds)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ProtocolError::InvalidUtf8)
    }
}

/// Encode a collection with per-element null tracking
///
/// Layout: `[count:2][mask bytes][present elements...]` — the identical
/// masking scheme objects use, applied at the collection level. Returns
/// bytes written.
pub fn serialize_option_list<T: WireValue>(
    items: &[Option<T>],
    buffer: &mut WireBuffer,
    offset: usize,
) -> Result<u16, ProtocolError> {
    let count = u16::try_from(items.len()).map_err(|_| ProtocolError::LengthTooLarge)?;
    count.serialize(buffer, offset)?;

    let mut mask = NullMask::with_fields(items.len());
    let mask_len = usize::from(mask.len_bytes());
    let mut cursor = offset + 2 + mask_len;

    for (index, item) in items.iter().enumerate() {
        match item {
            Some(value) => cursor += usize::from(value.serialize(buffer, cursor)?),
            None => mask.set_null(index),
        }
    }
    buffer.write_bytes(offset + 2, mask.as_bytes());

    u16::try_from(cursor - offset).map_err(|_| ProtocolError::LengthTooLarge)
}

/// Decode a collection written by [`serialize_option_list`]
///
/// Returns the elements and the number of bytes consumed.
pub fn deserialize_option_list<T: WireValue>(
    buffer: &[u8],
    offset: usize,
) -> Result<(Vec<Option<T>>, u16), ProtocolError> {
    let count = usize::from(u16::deserialize(buffer, offset)?);
    let mask_len = count.div_ceil(8);
    let mask_bytes = buffer
        .get(offset + 2..offset + 2 + mask_len)
        .ok_or(ProtocolError::OutOfBounds)?;
    let mask = NullMask::from_slice(mask_bytes);

    let mut items = Vec::with_capacity(count);
    let mut cursor = offset + 2 + mask_len;
    for index in 0..count {
        if mask.is_null(index) {
            items.push(None);
        } else {
            let value = T::deserialize(buffer, cursor)?;
            cursor += usize::from(value.wire_size());
            items.push(Some(value));
        }
    }

    let consumed =
        u16::try_from(cursor - offset).map_err(|_| ProtocolError::LengthTooLarge)?;
    Ok((items, consumed))
}
