use crate::{ByteReader, ByteWriter, SerdeErr};

/// A value that can be written to and read back from the wire.
pub trait Serde: Sized + Clone + PartialEq {
    /// Encodes the value into the writer
    fn ser(&self, writer: &mut ByteWriter);

    /// Decodes a value from the reader
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` will write for this value
    fn byte_length(&self) -> usize;
}

/// Implemented by values that always encode to the same number of bytes.
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
