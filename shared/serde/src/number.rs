use crate::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

macro_rules! impl_serde_for_number {
    ($($impl_type:ty),*) => {
        $(
            impl Serde for $impl_type {
                fn ser(&self, writer: &mut ByteWriter) {
                    writer.write_bytes(&self.to_be_bytes());
                }

                fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
                    let bytes = reader.read_array::<{ std::mem::size_of::<$impl_type>() }>()?;
                    Ok(<$impl_type>::from_be_bytes(bytes))
                }

                fn byte_length(&self) -> usize {
                    std::mem::size_of::<$impl_type>()
                }
            }

            impl ConstByteLength for $impl_type {
                fn const_byte_length() -> usize {
                    std::mem::size_of::<$impl_type>()
                }
            }
        )*
    };
}

impl_serde_for_number!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

// Booleans

impl Serde for bool {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(SerdeErr::InvalidBool { byte }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> usize {
        1
    }
}

// Fixed arrays

impl<T: Serde, const N: usize> Serde for [T; N] {
    fn ser(&self, writer: &mut ByteWriter) {
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::de(reader)?);
        }
        // length is exactly N, so the conversion cannot fail
        match items.try_into() {
            Ok(array) => Ok(array),
            Err(_) => unreachable!("array decoded with wrong length"),
        }
    }

    fn byte_length(&self) -> usize {
        self.iter().map(Serde::byte_length).sum()
    }
}

impl<T: ConstByteLength, const N: usize> ConstByteLength for [T; N] {
    fn const_byte_length() -> usize {
        T::const_byte_length() * N
    }
}
