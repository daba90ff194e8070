// Frame barrier traffic. Ready flows node -> aggregator, Release flows
// aggregator -> every node.

use cavesync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{FrameIndex, NodeId};

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum BarrierMessage {
    // A node finished submitting `frame` and waits to present it
    Ready { node_id: NodeId, frame: FrameIndex },
    // Every expected node is ready for `frame`; present now
    Release { frame: FrameIndex },
}

impl BarrierMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(self.byte_length());
        self.ser(&mut writer);
        writer.to_bytes()
    }

    pub fn from_bytes(datagram: &[u8]) -> Result<Self, SerdeErr> {
        let mut reader = ByteReader::new(datagram);
        let message = Self::de(&mut reader)?;
        if !reader.is_empty() {
            return Err(SerdeErr::TrailingBytes {
                remaining: reader.remaining(),
            });
        }
        Ok(message)
    }
}

impl Serde for BarrierMessage {
    fn ser(&self, writer: &mut ByteWriter) {
        match self {
            BarrierMessage::Ready { node_id, frame } => {
                0u8.ser(writer);
                node_id.ser(writer);
                frame.ser(writer);
            }
            BarrierMessage::Release { frame } => {
                1u8.ser(writer);
                frame.ser(writer);
            }
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match u8::de(reader)? {
            0 => {
                let node_id = NodeId::de(reader)?;
                let frame = FrameIndex::de(reader)?;
                Ok(BarrierMessage::Ready { node_id, frame })
            }
            1 => {
                let frame = FrameIndex::de(reader)?;
                Ok(BarrierMessage::Release { frame })
            }
            tag => Err(SerdeErr::InvalidTag {
                tag,
                type_name: "BarrierMessage",
            }),
        }
    }

    fn byte_length(&self) -> usize {
        match self {
            BarrierMessage::Ready { .. } => 1 + 2 + 4,
            BarrierMessage::Release { .. } => 1 + 4,
        }
    }
}
