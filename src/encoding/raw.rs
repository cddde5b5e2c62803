use super::{EncodedStream, Encoder};
use crate::prelude::*;
use zerocopy::IntoBytes;

/// Writes bytes unchanged
///
/// The output is not self delimiting, so writers have to place it in an appended section
/// together with a byte count header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawBinary;

impl Encoder for RawBinary {
    type Stream<W: Write> = RawStream<W>;

    const FORMAT: &'static str = "appended";

    fn produces_valid_text() -> bool {
        false
    }

    fn stream<W: Write>(&self, sink: W) -> RawStream<W> {
        RawStream { sink }
    }
}

pub struct RawStream<W> {
    sink: W,
}

impl<W: Write> EncodedStream for RawStream<W> {
    fn write_values<T: Scalar>(&mut self, values: &[T]) -> Result<()> {
        self.write_bytes(values.as_bytes())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough() {
        let mut out = Vec::new();
        let mut stream = RawBinary.stream(&mut out);
        stream.write_values(&[1u16, 2]).unwrap();
        stream.write_bytes(&[9]).unwrap();
        stream.finish().unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1u16.to_ne_bytes());
        expected.extend_from_slice(&2u16.to_ne_bytes());
        expected.push(9);
        assert_eq!(out, expected);
        assert!(!RawBinary::produces_valid_text());
    }
}
