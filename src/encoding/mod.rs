//! # Encoders
//!
//! An [`Encoder`] turns a sequence of scalars or bytes into the representation that ends up in
//! a file:
//!
//! * [`Ascii`] writes delimiter separated numbers, optionally broken into prefixed lines
//! * [`Base64`] writes standard base64 text without line breaks
//! * [`RawBinary`] writes the bytes unchanged
//!
//! Encoders are configuration only. Writing goes through the [`EncodedStream`] returned by
//! [`Encoder::stream`], which buffers internally and must be finished to flush. Streams that are
//! dropped without being finished still flush, but errors during that flush are lost.
//!
//! ```ignore
//! let mut text = Vec::new();
//! let mut stream = Ascii::default().stream(&mut text);
//! stream.write_values(&[1u8, 2, 3])?;
//! stream.finish()?;
//! assert_eq!(text, b"1 2 3");
//! ```

mod ascii;
mod base64;
mod encoded_field;
mod raw;

pub use self::ascii::{Ascii, AsciiOptions, AsciiStream, FloatFormat};
pub use self::base64::{encode_base64, Base64, Base64Stream};
pub use encoded_field::{write_compressed_field, write_field, write_framed_field};
pub use raw::{RawBinary, RawStream};

use crate::prelude::*;

/// Configuration for one representation of values
pub trait Encoder {
    type Stream<W: Write>: EncodedStream;

    /// value of the `format` attribute of an inline xml data array
    const FORMAT: &'static str;

    /// `true` if the output is printable text that needs no further framing
    fn produces_valid_text() -> bool;

    /// `true` if arbitrary bytes (block headers, compressed payloads) can be written
    fn encodes_bytes() -> bool {
        true
    }

    fn stream<W: Write>(&self, sink: W) -> Self::Stream<W>;
}

/// A stream of encoded output
pub trait EncodedStream {
    /// write `values` in their in-memory order
    fn write_values<T: Scalar>(&mut self, values: &[T]) -> Result<()>;

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_values(bytes)
    }

    /// flush everything that is still buffered
    fn finish(self) -> Result<()>;
}
