//! Single `<DataArray>` elements for xml based file formats
//!
//! These helpers write exactly one element and leave the surrounding document to the caller.
//! Binary payloads are the values in the byte order of the machine, with a byte count or block
//! header of type `H` in front written in the same order. The document should declare
//! `byte_order` as [`ByteOrder::native()`] and a `header_type` matching `H::NAME`.

use crate::compression::{ByteOrder, Compressor};
use crate::encoding::{write_compressed_field, write_field, write_framed_field, RawBinary};
use crate::prelude::*;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::writer::Writer;

const ELEMENT: &str = "DataArray";

fn components(layout: &Layout) -> Result<usize> {
    if layout.dimension() > 1 {
        layout.number_of_entries_from(1)
    } else {
        Ok(1)
    }
}

fn start_element<'a, F: Field + ?Sized>(
    name: &'a str,
    field: &F,
    format: &'a str,
) -> Result<BytesStart<'a>> {
    let mut start = BytesStart::new(ELEMENT);
    start.push_attribute(("type", field.precision().to_string().as_str()));
    start.push_attribute(("Name", name));
    start.push_attribute((
        "NumberOfComponents",
        components(&field.layout())?.to_string().as_str(),
    ));
    start.push_attribute(("format", format));
    Ok(start)
}

fn require_text<E: Encoder>() -> Result<()> {
    if E::produces_valid_text() {
        Ok(())
    } else {
        Err(Error::type_error(format!(
            "`{}` output cannot be placed inside an xml element",
            E::FORMAT
        )))
    }
}

/// Write `field` as an inline data array with the values encoded by `encoder`
///
/// Ascii output holds the values only. Base64 output is preceded by the number of payload
/// bytes as an `H`.
///
/// ```ignore
/// let mut writer = Writer::new(Vec::new());
/// write_inline_dataarray::<u32, _, _, _>(&mut writer, "pressure", &field, &Base64::default())?;
/// ```
pub fn write_inline_dataarray<H, W, F, E>(
    writer: &mut Writer<W>,
    name: &str,
    field: &F,
    encoder: &E,
) -> Result<()>
where
    H: HeaderType,
    W: Write,
    F: Field + ?Sized,
    E: Encoder,
{
    require_text::<E>()?;
    writer.write_event(Event::Start(start_element(name, field, E::FORMAT)?))?;

    if E::encodes_bytes() {
        write_framed_field::<H, _, _, _>(field, encoder, writer.inner(), ByteOrder::native())?;
    } else {
        write_field(field, encoder, writer.inner())?;
    }

    writer.write_event(Event::End(BytesEnd::new(ELEMENT)))?;
    Ok(())
}

/// Write `field` as an inline data array of compressed blocks
///
/// The document has to declare the compressor, for example
/// `compressor="vtkZLibDataCompressor"`, for readers to understand the payload.
pub fn write_compressed_dataarray<H, W, F, E>(
    writer: &mut Writer<W>,
    name: &str,
    field: &F,
    compressor: &Compressor,
    encoder: &E,
) -> Result<()>
where
    H: HeaderType,
    W: Write,
    F: Field + ?Sized,
    E: Encoder,
{
    require_text::<E>()?;
    if !E::encodes_bytes() {
        return Err(Error::type_error(format!(
            "compressed data cannot be written as `{}`",
            E::FORMAT
        )));
    }

    writer.write_event(Event::Start(start_element(name, field, E::FORMAT)?))?;
    write_compressed_field::<H, _, _, _>(
        field,
        compressor,
        encoder,
        writer.inner(),
        ByteOrder::native(),
    )?;
    writer.write_event(Event::End(BytesEnd::new(ELEMENT)))?;
    Ok(())
}

/// Write the empty element describing a data array whose bytes live in the appended section
///
/// `offset` is the position of the array's header relative to the start of the appended data.
/// The caller is responsible for writing the arrays with [`write_appended_data`] in the same
/// order in which their headers were written.
pub fn write_appended_dataarray_header<W, F>(
    writer: &mut Writer<W>,
    name: &str,
    field: &F,
    offset: usize,
) -> Result<()>
where
    W: Write,
    F: Field + ?Sized,
{
    let mut element = start_element(name, field, RawBinary::FORMAT)?;
    element.push_attribute(("offset", offset.to_string().as_str()));
    writer.write_event(Event::Empty(element))?;
    Ok(())
}

/// Write the raw bytes of `field` into the appended section and return how many bytes were
/// written, which is the distance to the offset of the next array
pub fn write_appended_data<H, W, F>(
    writer: &mut Writer<W>,
    field: &F,
    compressor: Option<&Compressor>,
) -> Result<usize>
where
    H: HeaderType,
    W: Write,
    F: Field + ?Sized,
{
    match compressor {
        Some(compressor) => {
            let blocks = write_compressed_field::<H, _, _, _>(
                field,
                compressor,
                &RawBinary,
                writer.inner(),
                ByteOrder::native(),
            )?;
            Ok(blocks.header_len() + blocks.compressed_size()?)
        }
        None => {
            let order = ByteOrder::native();
            write_framed_field::<H, _, _, _>(field, &RawBinary, writer.inner(), order)?;
            Ok(H::SIZE + field.size_in_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CodecKind;
    use crate::encoding::{encode_base64, Ascii, Base64};
    use crate::{BufferField, RangeField};

    fn written(writer: Writer<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn inline_ascii_vectors() {
        let field = RangeField::new(vec![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let mut writer = Writer::new(Vec::new());
        write_inline_dataarray::<u64, _, _, _>(&mut writer, "velocity", &field, &Ascii::default())
            .unwrap();

        assert_eq!(
            written(writer),
            r#"<DataArray type="Float32" Name="velocity" NumberOfComponents="3" format="ascii">1 2 3 4 5 6</DataArray>"#
        );
    }

    #[test]
    fn inline_base64_has_a_byte_count() {
        let field = BufferField::flat(vec![7u16, 8]);
        let mut writer = Writer::new(Vec::new());
        write_inline_dataarray::<u32, _, _, _>(&mut writer, "id", &field, &Base64::default())
            .unwrap();

        let values = [7u16.to_ne_bytes(), 8u16.to_ne_bytes()].concat();
        let payload = encode_base64(4u32.to_ne_bytes()) + &encode_base64(values);
        assert_eq!(
            written(writer),
            format!(
                r#"<DataArray type="UInt16" Name="id" NumberOfComponents="1" format="binary">{payload}</DataArray>"#
            )
        );
    }

    #[test]
    fn raw_bytes_are_not_inline_text() {
        let field = BufferField::flat(vec![1u8]);
        let mut writer = Writer::new(Vec::new());
        let result = write_inline_dataarray::<u32, _, _, _>(&mut writer, "x", &field, &RawBinary);
        assert!(matches!(result, Err(Error::Type(_))));
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn compressed_ascii_is_rejected() {
        let Ok(compressor) = Compressor::new(CodecKind::Lz4) else {
            return;
        };
        let field = BufferField::flat(vec![1u8]);
        let mut writer = Writer::new(Vec::new());
        let result = write_compressed_dataarray::<u32, _, _, _>(
            &mut writer,
            "x",
            &field,
            &compressor,
            &Ascii::default(),
        );
        assert!(matches!(result, Err(Error::Type(_))));
    }

    #[test]
    fn appended_offsets() {
        let first = BufferField::new(vec![0.5f64; 6], [2, 3]).unwrap();
        let second = BufferField::flat(vec![1i32, 2, 3]);

        let mut headers = Writer::new(Vec::new());
        write_appended_dataarray_header(&mut headers, "a", &first, 0).unwrap();
        write_appended_dataarray_header(&mut headers, "b", &second, 56).unwrap();
        assert_eq!(
            written(headers),
            concat!(
                r#"<DataArray type="Float64" Name="a" NumberOfComponents="3" format="appended" offset="0"/>"#,
                r#"<DataArray type="Int32" Name="b" NumberOfComponents="1" format="appended" offset="56"/>"#,
            )
        );

        let mut appended = Writer::new(Vec::new());
        let a = write_appended_data::<u64, _, _>(&mut appended, &first, None).unwrap();
        let b = write_appended_data::<u64, _, _>(&mut appended, &second, None).unwrap();
        assert_eq!(a, 8 + 48);
        assert_eq!(b, 8 + 12);

        let bytes = appended.into_inner();
        assert_eq!(bytes.len(), a + b);
        assert_eq!(&bytes[a..a + 8], &12u64.to_ne_bytes());
    }

    #[test]
    fn headers_and_values_share_the_byte_order() {
        let field = BufferField::flat(vec![0x0102u16, 0x0304, 0x0506]);
        let mut appended = Writer::new(Vec::new());
        write_appended_data::<u32, _, _>(&mut appended, &field, None).unwrap();

        let bytes = appended.into_inner();
        let order = ByteOrder::native();
        assert_eq!(u32::read_bytes(&bytes[..4], order), 6);
        for (chunk, value) in bytes[4..].chunks(2).zip([0x0102u16, 0x0304, 0x0506]) {
            let mut raw = [0u8; 2];
            raw.copy_from_slice(chunk);
            let decoded = match order {
                ByteOrder::LittleEndian => u16::from_le_bytes(raw),
                ByteOrder::BigEndian => u16::from_be_bytes(raw),
            };
            assert_eq!(decoded, value);
        }
        assert_eq!(&bytes[4..], field.serialized().unwrap().as_bytes());
    }

    #[test]
    fn appended_compressed_size_matches_the_output() {
        let Ok(compressor) = Compressor::new(CodecKind::Zstd) else {
            return;
        };
        let compressor = compressor.with_block_size(100);
        let field = BufferField::flat((0..1000u16).collect());
        let mut appended = Writer::new(Vec::new());
        let size = write_appended_data::<u32, _, _>(&mut appended, &field, Some(&compressor)).unwrap();

        let bytes = appended.into_inner();
        assert_eq!(size, bytes.len());
        assert_eq!(&bytes[..4], &100u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &20u32.to_ne_bytes());
    }
}
