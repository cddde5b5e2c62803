#![doc = include_str!("../README.md")]

pub mod compression;
pub mod data_array;
pub mod encoding;
pub mod field;
pub mod layout;
pub mod prelude;
mod precision;
mod serialization;

pub use precision::{Precision, PrecisionVisitor, Scalar};
pub use serialization::Serialization;

pub use layout::{flat_index, Index, Indices, Layout};

pub use field::{Field, FieldExt, FieldPtr, ValuesVisitor};
pub use field::{ArrayField, BufferField, EntityField, LazyField, RangeField};
pub use field::{ExtendedField, FlattenedField, IdentityField};

pub use encoding::{Ascii, AsciiOptions, Base64, Encoder, EncodedStream, FloatFormat, RawBinary};
pub use encoding::{write_compressed_field, write_field, write_framed_field};

pub use compression::{BlockCodec, ByteOrder, CodecKind, CompressedBlocks, Compressor, HeaderType};
pub use compression::DEFAULT_BLOCK_SIZE;

pub use data_array::{
    write_appended_data, write_appended_dataarray_header, write_compressed_dataarray,
    write_inline_dataarray,
};

pub use ndarray;

pub use quick_xml::writer::Writer;

/// Shorthand for results produced throughout this crate
pub type Result<T> = std::result::Result<T, Error>;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// a byte count disagrees with the shape it is supposed to describe
    #[error("Size mismatch: {0}")]
    Size(String),
    /// a type cannot represent the requested data
    #[error("Type mismatch: {0}")]
    Type(String),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    /// a compression backend consumed or produced an unexpected amount of data
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Compression backend `{0}` was not enabled at build time")]
    Unavailable(&'static str),
    #[error("Unknown compression backend `{0}`")]
    UnknownCodec(String),
    #[error("Could not write XML data: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}

impl Error {
    pub(crate) fn size<T: Into<String>>(message: T) -> Self {
        Self::Size(message.into())
    }

    pub(crate) fn type_error<T: Into<String>>(message: T) -> Self {
        Self::Type(message.into())
    }

    pub(crate) fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}
