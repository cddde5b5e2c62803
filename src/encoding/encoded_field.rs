use super::{EncodedStream, Encoder};
use crate::compression::{ByteOrder, CompressedBlocks, Compressor, HeaderType};
use crate::prelude::*;

struct WriteValues<'a, S> {
    stream: &'a mut S,
    serialization: &'a Serialization,
}

impl<'a, S: EncodedStream> PrecisionVisitor for WriteValues<'a, S> {
    type Output = Result<()>;

    fn visit<T: Scalar>(self, _precision: Precision) -> Result<()> {
        let values = self.serialization.as_slice_of::<T>()?;
        self.stream.write_values(values)
    }
}

/// Write the values of `field` through `encoder`
///
/// The field is serialized once and its values are handed to the encoder with their concrete
/// type, so ascii output prints them as numbers of the field's precision.
pub fn write_field<F, E, W>(field: &F, encoder: &E, sink: W) -> Result<()>
where
    F: Field + ?Sized,
    E: Encoder,
    W: Write,
{
    let serialization = field.serialized()?;
    let mut stream = encoder.stream(sink);
    field.precision().visit(WriteValues {
        stream: &mut stream,
        serialization: &serialization,
    })?;
    stream.finish()
}

/// Write the values of `field` preceded by a header holding their size in bytes
///
/// Header and values are encoded as two separate runs, which for base64 means that both are
/// padded on their own.
pub fn write_framed_field<H, F, E, W>(
    field: &F,
    encoder: &E,
    mut sink: W,
    order: ByteOrder,
) -> Result<()>
where
    H: HeaderType,
    F: Field + ?Sized,
    E: Encoder,
    W: Write,
{
    require_bytes::<E>()?;
    let serialization = field.serialized()?;

    let mut header = Vec::with_capacity(H::SIZE);
    H::fit(serialization.len(), "field size")?.append_bytes(order, &mut header);

    write_run(encoder, &mut sink, &header)?;
    write_run(encoder, &mut sink, serialization.as_bytes())
}

/// Compress the values of `field` and write the block header followed by the compressed blocks
///
/// Returns the header so that writers can compute offsets of appended data. `order` applies to
/// the header only; the values are compressed in the byte order of the machine.
pub fn write_compressed_field<H, F, E, W>(
    field: &F,
    compressor: &Compressor,
    encoder: &E,
    mut sink: W,
    order: ByteOrder,
) -> Result<CompressedBlocks<H>>
where
    H: HeaderType,
    F: Field + ?Sized,
    E: Encoder,
    W: Write,
{
    require_bytes::<E>()?;
    let mut serialization = field.serialized()?;
    let blocks = compressor.compress::<H>(&mut serialization)?;

    write_run(encoder, &mut sink, &blocks.header_bytes(order))?;
    write_run(encoder, &mut sink, serialization.as_bytes())?;
    Ok(blocks)
}

fn write_run<E: Encoder, W: Write>(encoder: &E, sink: &mut W, bytes: &[u8]) -> Result<()> {
    let mut stream = encoder.stream(&mut *sink);
    stream.write_bytes(bytes)?;
    stream.finish()
}

fn require_bytes<E: Encoder>() -> Result<()> {
    if E::encodes_bytes() {
        Ok(())
    } else {
        Err(Error::type_error(format!(
            "`{}` output cannot carry binary headers",
            E::FORMAT
        )))
    }
}
