use crate::prelude::*;
use num_traits::{AsPrimitive, FromPrimitive, PrimInt, Unsigned};

/// Byte order of block headers in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// the byte order of the machine this runs on
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Self::LittleEndian
        } else {
            Self::BigEndian
        }
    }
}

/// Unsigned integer type used for every value of a block header
///
/// All sizes recorded in a header must fit in this type, which is checked when compressing.
pub trait HeaderType:
    PrimInt
    + Unsigned
    + FromPrimitive
    + AsPrimitive<usize>
    + std::fmt::Debug
    + std::fmt::Display
    + Send
    + Sync
    + 'static
{
    /// name of the type in the `header_type` attribute of `.vtk` xml files
    const NAME: &'static str;
    const SIZE: usize;

    fn append_bytes(self, order: ByteOrder, out: &mut Vec<u8>);

    /// read a value from exactly [`HeaderType::SIZE`] bytes
    fn read_bytes(bytes: &[u8], order: ByteOrder) -> Self;

    /// `value` as this type, or a [`Error::Type`] naming `what` did not fit
    fn fit(value: usize, what: &str) -> Result<Self> {
        Self::from_usize(value).ok_or_else(|| {
            Error::type_error(format!(
                "{what} of {value} does not fit into a {} byte header (max {})",
                Self::SIZE,
                Self::max_value()
            ))
        })
    }
}

macro_rules! impl_header_type {
    ($($t:ty => $name:expr),*) => {
        $(
            impl HeaderType for $t {
                const NAME: &'static str = $name;
                const SIZE: usize = std::mem::size_of::<$t>();

                fn append_bytes(self, order: ByteOrder, out: &mut Vec<u8>) {
                    match order {
                        ByteOrder::LittleEndian => out.extend_from_slice(&self.to_le_bytes()),
                        ByteOrder::BigEndian => out.extend_from_slice(&self.to_be_bytes()),
                    }
                }

                fn read_bytes(bytes: &[u8], order: ByteOrder) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    match order {
                        ByteOrder::LittleEndian => <$t>::from_le_bytes(raw),
                        ByteOrder::BigEndian => <$t>::from_be_bytes(raw),
                    }
                }
            }
        )*
    };
}

impl_header_type!(u8 => "UInt8", u16 => "UInt16", u32 => "UInt32", u64 => "UInt64");

#[cfg(target_pointer_width = "64")]
impl_header_type!(usize => "UInt64");

#[cfg(target_pointer_width = "32")]
impl_header_type!(usize => "UInt32");

/// The header produced by compressing a buffer block by block
///
/// On the wire it is written as `block_size`, `number_of_blocks`, `residual_block_size` and one
/// compressed size per block, all as `H`, followed by the compressed blocks in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlocks<H> {
    block_size: H,
    number_of_blocks: H,
    residual_block_size: H,
    compressed_sizes: Vec<H>,
}

impl<H: HeaderType> CompressedBlocks<H> {
    pub(crate) fn new(
        block_size: H,
        number_of_blocks: H,
        residual_block_size: H,
        compressed_sizes: Vec<H>,
    ) -> Self {
        Self {
            block_size,
            number_of_blocks,
            residual_block_size,
            compressed_sizes,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size.as_()
    }

    pub fn number_of_blocks(&self) -> usize {
        self.number_of_blocks.as_()
    }

    /// size of the last block if it is shorter than `block_size`, `0` otherwise
    pub fn residual_block_size(&self) -> usize {
        self.residual_block_size.as_()
    }

    pub fn compressed_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.compressed_sizes.iter().map(|size| size.as_())
    }

    /// Number of bytes of all compressed blocks together
    ///
    /// Fails with [`Error::Size`] if the sum does not fit into `usize`.
    pub fn compressed_size(&self) -> Result<usize> {
        self.compressed_sizes()
            .try_fold(0usize, |total, size| total.checked_add(size))
            .ok_or_else(|| Error::size("compressed block sizes in the header overflow"))
    }

    /// Number of bytes the blocks decompress to
    ///
    /// Fails with [`Error::Size`] if the total does not fit into `usize`, or if the header
    /// declares a residual block without any blocks.
    pub fn uncompressed_size(&self) -> Result<usize> {
        let residual = self.residual_block_size();
        let full_blocks = match (self.number_of_blocks(), residual) {
            (0, 0) => return Ok(0),
            (0, _) => {
                return Err(Error::size(format!(
                    "header declares a residual block of {residual} bytes but no blocks"
                )))
            }
            (n, 0) => n,
            (n, _) => n - 1,
        };
        full_blocks
            .checked_mul(self.block_size())
            .and_then(|size| size.checked_add(residual))
            .ok_or_else(|| {
                Error::size(format!(
                    "{} blocks of {} bytes overflow the addressable size",
                    self.number_of_blocks(),
                    self.block_size()
                ))
            })
    }

    /// size of block `index` after decompression
    pub fn decompressed_block_size(&self, index: usize) -> usize {
        let last = self.number_of_blocks().saturating_sub(1);
        if index == last && self.residual_block_size() > 0 {
            self.residual_block_size()
        } else {
            self.block_size()
        }
    }

    /// number of bytes taken by [`CompressedBlocks::header_bytes`]
    pub fn header_len(&self) -> usize {
        (3 + self.compressed_sizes.len()) * H::SIZE
    }

    pub fn header_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_len());
        self.block_size.append_bytes(order, &mut out);
        self.number_of_blocks.append_bytes(order, &mut out);
        self.residual_block_size.append_bytes(order, &mut out);
        for size in &self.compressed_sizes {
            size.append_bytes(order, &mut out);
        }
        out
    }

    /// Read a header from the start of `bytes`
    ///
    /// Fails with [`Error::Size`] if `bytes` is too short to contain the header, or if the header
    /// describes a residual block larger than the block size or a residual block without blocks.
    pub fn from_header_bytes(bytes: &[u8], order: ByteOrder) -> Result<Self> {
        let value = |i: usize| -> Result<H> {
            bytes
                .get(i * H::SIZE..(i + 1) * H::SIZE)
                .map(|raw| H::read_bytes(raw, order))
                .ok_or_else(|| {
                    Error::size(format!(
                        "{} bytes are too short for a block header of {} byte integers",
                        bytes.len(),
                        H::SIZE
                    ))
                })
        };

        let block_size = value(0)?;
        let number_of_blocks = value(1)?;
        let residual_block_size = value(2)?;
        if residual_block_size > block_size {
            return Err(Error::size(format!(
                "residual block of {residual_block_size} bytes exceeds the block size of {block_size}"
            )));
        }
        if number_of_blocks.is_zero() && !residual_block_size.is_zero() {
            return Err(Error::size(format!(
                "header declares a residual block of {residual_block_size} bytes but no blocks"
            )));
        }

        let count: usize = number_of_blocks.as_();
        let compressed_sizes = (0..count)
            .map(|i| value(3 + i))
            .collect::<Result<Vec<H>>>()?;

        Ok(Self::new(
            block_size,
            number_of_blocks,
            residual_block_size,
            compressed_sizes,
        ))
    }
}
