// One sync object update per datagram:
// objectId u16 | sequence u32 | payloadLength u16 | payload

use cavesync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde};

use crate::{constants::MAX_PAYLOAD_BYTES, ObjectId, PacketError, SequenceNumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPacket<'p> {
    pub object_id: ObjectId,
    pub sequence: SequenceNumber,
    pub payload: &'p [u8],
}

impl<'p> SyncPacket<'p> {
    /// Receive buffer size; anything longer is truncated and then rejected
    pub const MAX_DATAGRAM_BYTES: usize = MAX_PAYLOAD_BYTES + 64;

    pub fn header_bytes() -> usize {
        ObjectId::const_byte_length()
            + SequenceNumber::const_byte_length()
            + u16::const_byte_length()
    }

    /// Encodes a complete datagram
    pub fn write(
        object_id: ObjectId,
        sequence: SequenceNumber,
        payload: &[u8],
    ) -> Result<Vec<u8>, PacketError> {
        if payload.len() > MAX_PAYLOAD_BYTES {
            return Err(PacketError::PayloadTooLarge {
                length: payload.len(),
                max: MAX_PAYLOAD_BYTES,
            });
        }

        let mut writer = ByteWriter::with_capacity(Self::header_bytes() + payload.len());
        object_id.ser(&mut writer);
        sequence.ser(&mut writer);
        // bounded by MAX_PAYLOAD_BYTES above
        (payload.len() as u16).ser(&mut writer);
        writer.write_bytes(payload);
        Ok(writer.to_bytes())
    }

    /// Decodes a datagram, borrowing the payload from it
    pub fn read(datagram: &'p [u8]) -> Result<Self, PacketError> {
        let mut reader = ByteReader::new(datagram);
        let object_id = ObjectId::de(&mut reader)?;
        let sequence = SequenceNumber::de(&mut reader)?;
        let declared = usize::from(u16::de(&mut reader)?);

        let actual = reader.remaining();
        if declared != actual {
            return Err(PacketError::LengthMismatch { declared, actual });
        }
        let payload = reader.read_bytes(declared)?;

        Ok(Self {
            object_id,
            sequence,
            payload,
        })
    }
}
