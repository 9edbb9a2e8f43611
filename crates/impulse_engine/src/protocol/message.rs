//! Object framing
//!
//! Frames a typed message as `[TypeId:2][ContentLength:2][NullMaskLength:1]
//! [mask bytes][fields...]`. The content length counts field bytes only;
//! the total frame size is header + mask + content and can be computed from
//! the header alone, which is what transport-side framing relies on before
//! a full decode.

use crate::foundation::math::Vec2;
use crate::protocol::buffer::WireBuffer;
use crate::protocol::header::ObjectHeader;
use crate::protocol::null_mask::NullMask;
use crate::protocol::value::WireValue;
use crate::protocol::ProtocolError;

/// A message type with a registered wire identity
pub trait WireMessage: Sized {
    /// Registered type id carried in the frame header
    const TYPE_ID: u16;

    /// Number of nullable fields; zero means a zero-length mask
    const NULLABLE_FIELDS: usize = 0;

    /// Encode the field data at `offset`, marking omitted fields in the
    /// mask; returns content bytes written
    fn encode_content(
        &self,
        mask: &mut NullMask,
        buffer: &mut WireBuffer,
        offset: usize,
    ) -> Result<u16, ProtocolError>;

    /// Decode the field data at `offset`, consulting the mask for omitted
    /// fields
    fn decode_content(
        mask: &NullMask,
        buffer: &[u8],
        offset: usize,
    ) -> Result<Self, ProtocolError>;
}

fn mask_len(nullable_fields: usize) -> u8 {
    u8::try_from(nullable_fields.div_ceil(8)).expect("mask wider than 255 bytes")
}

/// Encode a full frame at `offset`; returns total frame bytes written
pub fn encode<M: WireMessage>(
    message: &M,
    buffer: &mut WireBuffer,
    offset: usize,
) -> Result<usize, ProtocolError> {
    let mask_bytes = mask_len(M::NULLABLE_FIELDS);
    let mut mask = NullMask::with_fields(M::NULLABLE_FIELDS);

    let content_start = offset + usize::from(ObjectHeader::SIZE) + usize::from(mask_bytes);
    let content_length = message.encode_content(&mut mask, buffer, content_start)?;

    let header = ObjectHeader {
        type_id: M::TYPE_ID,
        content_length,
        null_mask_length: mask_bytes,
    };
    buffer.ensure(offset + usize::from(ObjectHeader::SIZE));
    header.write(buffer.as_mut_slice(), offset)?;
    buffer.write_bytes(offset + usize::from(ObjectHeader::SIZE), mask.as_bytes());

    Ok(header.frame_size())
}

/// Decode a full frame at `offset`, checking the type id
pub fn decode<M: WireMessage>(buffer: &[u8], offset: usize) -> Result<M, ProtocolError> {
    let header = ObjectHeader::read(buffer, offset)?;
    if header.type_id != M::TYPE_ID {
        return Err(ProtocolError::UnexpectedTypeId {
            expected: M::TYPE_ID,
            found: header.type_id,
        });
    }

    let mask_start = offset + usize::from(ObjectHeader::SIZE);
    let mask_bytes = buffer
        .get(mask_start..mask_start + usize::from(header.null_mask_length))
        .ok_or(ProtocolError::OutOfBounds)?;
    let mask = NullMask::from_slice(mask_bytes);

    M::decode_content(&mask, buffer, mask_start + usize::from(header.null_mask_length))
}

/// Frame identity and extent read from a header alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Registered type of the framed payload
    pub type_id: u16,
    /// Total frame size: header + mask + content
    pub frame_size: usize,
}

/// Measure a frame before decoding it
///
/// This is the size-prefix contract the transport uses to split a receive
/// buffer into whole frames.
pub fn peek_frame(buffer: &[u8], offset: usize) -> Result<FrameInfo, ProtocolError> {
    let header = ObjectHeader::read(buffer, offset)?;
    Ok(FrameInfo {
        type_id: header.type_id,
        frame_size: header.frame_size(),
    })
}

/// Per-body state snapshot exchanged every tick
///
/// Velocity is only carried for bodies that moved; idle bodies omit it
/// through the null mask.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    /// Body handle on the sending side
    pub body: u32,
    /// Committed position
    pub position: Vec2,
    /// Committed rotation in radians
    pub rotation: f32,
    /// Per-second velocity, omitted when idle
    pub velocity: Option<Vec2>,
}

impl WireMessage for BodyState {
    const TYPE_ID: u16 = 1;
    const NULLABLE_FIELDS: usize = 1;

    fn encode_content(
        &self,
        mask: &mut NullMask,
        buffer: &mut WireBuffer,
        offset: usize,
    ) -> Result<u16, ProtocolError> {
        let mut cursor = offset;
        cursor += usize::from(self.body.serialize(buffer, cursor)?);
        cursor += usize::from(self.position.serialize(buffer, cursor)?);
        cursor += usize::from(self.rotation.serialize(buffer, cursor)?);
        match &self.velocity {
            Some(velocity) => cursor += usize::from(velocity.serialize(buffer, cursor)?),
            None => mask.set_null(0),
        }
        u16::try_from(cursor - offset).map_err(|_| ProtocolError::LengthTooLarge)
    }

    fn decode_content(
        mask: &NullMask,
        buffer: &[u8],
        offset: usize,
    ) -> Result<Self, ProtocolError> {
        let body = u32::deserialize(buffer, offset)?;
        let position = Vec2::deserialize(buffer, offset + 4)?;
        let rotation = f32::deserialize(buffer, offset + 12)?;
        let velocity = if mask.is_null(0) {
            None
        } else {
            Some(Vec2::deserialize(buffer, offset + 16)?)
        };
        Ok(Self { body, position, rotation, velocity })
    }
}
