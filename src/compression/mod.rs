//! # Block compression
//!
//! Buffers are split into blocks of a fixed size (the last one may be shorter) that are
//! compressed independently. The result is the concatenation of the compressed blocks plus a
//! [`CompressedBlocks`] header that records the block size, the number of blocks, the size of the
//! residual block and the compressed size of every block. Readers need the header to decompress a
//! single block without touching the ones before it.
//!
//! Four backends implement the single-block step behind [`BlockCodec`]:
//!
//! | backend | crate | feature |
//! |---------|-------|---------|
//! | [`Zlib`] | `flate2` | `zlib` |
//! | [`Lz4`] | `lz4_flex` | `lz4` |
//! | [`Lzma`] | `xz2` | `lzma` |
//! | [`Zstd`] | `zstd` | `zstd` |
//!
//! [`Compressor`] selects a backend at runtime by [`CodecKind`] and reports backends that were
//! not compiled in with [`Error::Unavailable`](crate::Error::Unavailable).
//!
//! ```ignore
//! let compressor = Compressor::new(CodecKind::Zlib)?;
//! let mut data = field.serialized()?;
//! let blocks = compressor.compress::<u32>(&mut data)?;
//! let header = blocks.header_bytes(ByteOrder::LittleEndian);
//! ```

mod header;

#[cfg(feature = "lz4")]
mod lz4;
#[cfg(feature = "lzma")]
mod lzma;
#[cfg(feature = "zlib")]
mod zlib;
#[cfg(feature = "zstd")]
mod zstandard;

pub use header::{ByteOrder, CompressedBlocks, HeaderType};

#[cfg(feature = "lz4")]
pub use self::lz4::{Lz4, Lz4Options};
#[cfg(feature = "lzma")]
pub use self::lzma::{Lzma, LzmaOptions};
#[cfg(feature = "zlib")]
pub use self::zlib::{Zlib, ZlibOptions};
#[cfg(feature = "zstd")]
pub use self::zstandard::{Zstd, ZstdOptions};

use crate::prelude::*;
use std::ops::Range;
use std::str::FromStr;

/// block size used when none is configured
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 15;

/// A compression backend that transforms one block at a time
pub trait BlockCodec {
    const NAME: &'static str;

    fn block_size(&self) -> usize;

    /// worst case number of bytes produced when compressing `len` bytes
    fn compress_bound(&self, len: usize) -> usize;

    /// Compress `input` into `output`, which holds at least `compress_bound(input.len())` bytes,
    /// and return the number of bytes written
    fn compress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Decompress `input` into `output` and return the number of bytes written
    fn decompress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize>;

    /// Replace `data` with its compressed blocks and return the header describing them
    fn compress<H: HeaderType>(&self, data: &mut Serialization) -> Result<CompressedBlocks<H>> {
        compress_blocks(self, data)
    }

    /// Restore the bytes of `data` that were compressed into `blocks`
    fn decompress<H: HeaderType>(
        &self,
        data: &mut Serialization,
        blocks: &CompressedBlocks<H>,
    ) -> Result<()> {
        decompress_blocks(self, data, blocks)
    }
}

/// How a buffer of a given size splits into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Blocks {
    pub(crate) block_size: usize,
    pub(crate) number_of_blocks: usize,
    pub(crate) residual_block_size: usize,
    size: usize,
}

impl Blocks {
    pub(crate) fn new(size: usize, block_size: usize) -> Self {
        let residual_block_size = size % block_size;
        let number_of_blocks = size / block_size + usize::from(residual_block_size > 0);
        Self {
            block_size,
            number_of_blocks,
            residual_block_size,
            size,
        }
    }

    pub(crate) fn range(&self, index: usize) -> Range<usize> {
        let start = index * self.block_size;
        start..(start + self.block_size).min(self.size)
    }
}

/// Compress `data` block by block with `codec`
///
/// The input size and block size must fit into `H` or this fails with [`Error::Type`] before
/// anything is compressed. On failure `data` is left unchanged.
pub fn compress_blocks<C, H>(codec: &C, data: &mut Serialization) -> Result<CompressedBlocks<H>>
where
    C: BlockCodec + ?Sized,
    H: HeaderType,
{
    let block_size = codec.block_size();
    if block_size == 0 {
        return Err(Error::size("cannot compress with a block size of zero"));
    }

    let size = data.len();
    let blocks = Blocks::new(size, block_size);
    H::fit(size, "input size")?;
    let header_block_size = H::fit(block_size, "block size")?;
    let number_of_blocks = H::fit(blocks.number_of_blocks, "number of blocks")?;
    let residual_block_size = H::fit(blocks.residual_block_size, "residual block size")?;

    let mut scratch = vec![0u8; codec.compress_bound(block_size.min(size))];
    let mut compressed = Serialization::with_capacity(size / 2);
    let mut compressed_sizes = Vec::with_capacity(blocks.number_of_blocks);

    let input = data.as_bytes();
    for index in 0..blocks.number_of_blocks {
        let block = &input[blocks.range(index)];
        let written = codec.compress_block(block, &mut scratch)?;
        log::trace!(
            "{}: block {index} compressed {} -> {written} bytes",
            C::NAME,
            block.len()
        );
        compressed_sizes.push(H::fit(written, "compressed block size")?);
        compressed.extend_from_slice(&scratch[..written]);
    }

    log::debug!(
        "{}: compressed {size} bytes into {} blocks of {block_size} ({} bytes)",
        C::NAME,
        blocks.number_of_blocks,
        compressed.len()
    );

    *data = compressed;
    Ok(CompressedBlocks::new(
        header_block_size,
        number_of_blocks,
        residual_block_size,
        compressed_sizes,
    ))
}

/// Decompress the blocks in `data` described by `blocks` with `codec`
///
/// Fails with [`Error::Size`] if the header is inconsistent (a residual block without blocks,
/// blocks of size zero, sizes that overflow), if it does not describe `data`, or if a block
/// decompresses to a different length than the header declares. Nothing is allocated for the
/// output before the header has been checked.
pub fn decompress_blocks<C, H>(
    codec: &C,
    data: &mut Serialization,
    blocks: &CompressedBlocks<H>,
) -> Result<()>
where
    C: BlockCodec + ?Sized,
    H: HeaderType,
{
    if blocks.number_of_blocks() > 0 && blocks.block_size() == 0 {
        return Err(Error::size("header declares blocks of size zero"));
    }
    let uncompressed_size = blocks.uncompressed_size()?;
    let expected = blocks.compressed_size()?;
    if expected != data.len() {
        return Err(Error::size(format!(
            "header describes {expected} compressed bytes but {} were given",
            data.len()
        )));
    }

    let mut decompressed = Serialization::try_zeroed(uncompressed_size)?;
    let input = data.as_bytes();
    let output = decompressed.as_bytes_mut();

    let mut read = 0;
    let mut written = 0;
    for (index, compressed_size) in blocks.compressed_sizes().enumerate() {
        let block_size = blocks.decompressed_block_size(index);
        let block = &input[read..read + compressed_size];
        let target = &mut output[written..written + block_size];
        let produced = codec.decompress_block(block, target)?;
        if produced != block_size {
            return Err(Error::size(format!(
                "block {index} decompressed to {produced} bytes, the header declares {block_size}"
            )));
        }
        read += compressed_size;
        written += block_size;
    }

    log::debug!(
        "{}: decompressed {} blocks into {written} bytes",
        C::NAME,
        blocks.number_of_blocks()
    );

    *data = decompressed;
    Ok(())
}

/// The available compression backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CodecKind {
    /// general purpose deflate in a zlib container
    #[display(fmt = "zlib")]
    Zlib,
    /// fast byte oriented LZ4 blocks
    #[display(fmt = "lz4")]
    Lz4,
    /// high ratio LZMA2 in `.xz` containers
    #[display(fmt = "lzma")]
    Lzma,
    /// Zstandard frames
    #[display(fmt = "zstd")]
    Zstd,
}

impl CodecKind {
    pub const ALL: [CodecKind; 4] = [
        CodecKind::Zlib,
        CodecKind::Lz4,
        CodecKind::Lzma,
        CodecKind::Zstd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Zlib => "zlib",
            Self::Lz4 => "lz4",
            Self::Lzma => "lzma",
            Self::Zstd => "zstd",
        }
    }

    /// `true` if the backend was compiled into this build
    pub fn is_available(&self) -> bool {
        match self {
            Self::Zlib => cfg!(feature = "zlib"),
            Self::Lz4 => cfg!(feature = "lz4"),
            Self::Lzma => cfg!(feature = "lzma"),
            Self::Zstd => cfg!(feature = "zstd"),
        }
    }

    /// all backends compiled into this build
    pub fn available() -> Vec<CodecKind> {
        Self::ALL
            .into_iter()
            .filter(CodecKind::is_available)
            .collect()
    }
}

impl FromStr for CodecKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "zlib" | "deflate" => Ok(Self::Zlib),
            "lz4" => Ok(Self::Lz4),
            "lzma" | "xz" => Ok(Self::Lzma),
            "zstd" | "zstandard" => Ok(Self::Zstd),
            _ => Err(Error::UnknownCodec(name.to_string())),
        }
    }
}

/// A backend chosen at runtime together with its options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compressor {
    kind: CodecKind,
    block_size: usize,
    level: Option<i32>,
}

impl Compressor {
    /// Fails with [`Error::Unavailable`] if the backend was not compiled in
    pub fn new(kind: CodecKind) -> Result<Self> {
        if !kind.is_available() {
            return Err(Error::Unavailable(kind.name()));
        }
        Ok(Self {
            kind,
            block_size: DEFAULT_BLOCK_SIZE,
            level: None,
        })
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::new(name.parse()?)
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// compression level passed to backends that have one, `None` for their default
    pub fn with_level(mut self, level: Option<i32>) -> Self {
        self.level = level;
        self
    }

    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn compress<H: HeaderType>(&self, data: &mut Serialization) -> Result<CompressedBlocks<H>> {
        match self.kind {
            #[cfg(feature = "zlib")]
            CodecKind::Zlib => self.zlib().compress(data),
            #[cfg(feature = "lz4")]
            CodecKind::Lz4 => self.lz4().compress(data),
            #[cfg(feature = "lzma")]
            CodecKind::Lzma => self.lzma().compress(data),
            #[cfg(feature = "zstd")]
            CodecKind::Zstd => self.zstd().compress(data),
            #[allow(unreachable_patterns)]
            kind => Err(Error::Unavailable(kind.name())),
        }
    }

    pub fn decompress<H: HeaderType>(
        &self,
        data: &mut Serialization,
        blocks: &CompressedBlocks<H>,
    ) -> Result<()> {
        match self.kind {
            #[cfg(feature = "zlib")]
            CodecKind::Zlib => self.zlib().decompress(data, blocks),
            #[cfg(feature = "lz4")]
            CodecKind::Lz4 => self.lz4().decompress(data, blocks),
            #[cfg(feature = "lzma")]
            CodecKind::Lzma => self.lzma().decompress(data, blocks),
            #[cfg(feature = "zstd")]
            CodecKind::Zstd => self.zstd().decompress(data, blocks),
            #[allow(unreachable_patterns)]
            kind => Err(Error::Unavailable(kind.name())),
        }
    }

    #[cfg(feature = "zlib")]
    fn zlib(&self) -> Zlib {
        let mut options = ZlibOptions::default().with_block_size(self.block_size);
        if let Some(level) = self.level {
            options = options.with_level(level.clamp(0, 9) as u32);
        }
        Zlib::new(options)
    }

    #[cfg(feature = "lz4")]
    fn lz4(&self) -> Lz4 {
        Lz4::new(Lz4Options::default().with_block_size(self.block_size))
    }

    #[cfg(feature = "lzma")]
    fn lzma(&self) -> Lzma {
        let mut options = LzmaOptions::default().with_block_size(self.block_size);
        if let Some(level) = self.level {
            options = options.with_level(level.clamp(0, 9) as u32);
        }
        Lzma::new(options)
    }

    #[cfg(feature = "zstd")]
    fn zstd(&self) -> Zstd {
        let mut options = ZstdOptions::default().with_block_size(self.block_size);
        if let Some(level) = self.level {
            options = options.with_level(level);
        }
        Zstd::new(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// stores blocks unchanged, so the framing can be tested without a backend
    struct Stored {
        block_size: usize,
    }

    impl BlockCodec for Stored {
        const NAME: &'static str = "stored";

        fn block_size(&self) -> usize {
            self.block_size
        }

        fn compress_bound(&self, len: usize) -> usize {
            len
        }

        fn compress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
            output[..input.len()].copy_from_slice(input);
            Ok(input.len())
        }

        fn decompress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            Ok(input.len())
        }
    }

    fn bytes(n: usize) -> Serialization {
        (0..n).map(|i| (i % 251) as u8).collect::<Vec<u8>>().into()
    }

    #[test]
    fn block_partition() {
        let blocks = Blocks::new(10, 4);
        assert_eq!(blocks.number_of_blocks, 3);
        assert_eq!(blocks.residual_block_size, 2);
        assert_eq!(blocks.range(2), 8..10);

        let blocks = Blocks::new(8, 4);
        assert_eq!(blocks.number_of_blocks, 2);
        assert_eq!(blocks.residual_block_size, 0);
        assert_eq!(blocks.range(1), 4..8);

        let blocks = Blocks::new(3, 4);
        assert_eq!(blocks.number_of_blocks, 1);
        assert_eq!(blocks.residual_block_size, 3);

        assert_eq!(Blocks::new(0, 4).number_of_blocks, 0);
    }

    #[test]
    fn header_of_stored_blocks() {
        let codec = Stored { block_size: 4 };
        let mut data = bytes(10);
        let original = data.clone();
        let blocks = codec.compress::<u8>(&mut data).unwrap();
        assert_eq!(blocks.block_size(), 4);
        assert_eq!(blocks.number_of_blocks(), 3);
        assert_eq!(blocks.residual_block_size(), 2);
        assert_eq!(blocks.compressed_sizes().collect::<Vec<_>>(), vec![4, 4, 2]);

        codec.decompress(&mut data, &blocks).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn empty_input_has_no_blocks() {
        let codec = Stored { block_size: 4 };
        let mut data = Serialization::new();
        let blocks = codec.compress::<u8>(&mut data).unwrap();
        assert_eq!(blocks.number_of_blocks(), 0);
        assert_eq!(blocks.header_len(), 3);
        codec.decompress(&mut data, &blocks).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn narrow_headers_are_rejected() {
        let mut data = bytes(300);
        let original = data.clone();
        let codec = Stored { block_size: 256 };
        assert!(matches!(codec.compress::<u8>(&mut data), Err(Error::Type(_))));
        let codec = Stored { block_size: 1 };
        assert!(matches!(codec.compress::<u8>(&mut data), Err(Error::Type(_))));
        assert_eq!(data, original);
    }

    #[test]
    fn zero_block_size() {
        let codec = Stored { block_size: 0 };
        assert!(matches!(
            codec.compress::<u32>(&mut bytes(3)),
            Err(Error::Size(_))
        ));
    }

    #[test]
    fn wrong_block_lengths_are_detected() {
        let codec = Stored { block_size: 4 };
        let mut data = bytes(6);
        let blocks = CompressedBlocks::<u32>::new(4, 2, 1, vec![4, 2]);
        assert!(matches!(codec.decompress(&mut data, &blocks), Err(Error::Size(_))));

        let mut data = bytes(6);
        let blocks = CompressedBlocks::<u32>::new(4, 2, 2, vec![4, 3]);
        assert!(matches!(codec.decompress(&mut data, &blocks), Err(Error::Size(_))));
    }

    #[test]
    fn inconsistent_headers_are_rejected_before_allocating() {
        let codec = Stored { block_size: 4 };

        let header = [4u64, 2, 0, u64::MAX, 2];
        let raw: Vec<u8> = header.iter().flat_map(|v| v.to_le_bytes()).collect();
        let blocks = CompressedBlocks::<u64>::from_header_bytes(&raw, ByteOrder::LittleEndian)
            .unwrap();
        assert!(matches!(codec.decompress(&mut bytes(6), &blocks), Err(Error::Size(_))));

        let blocks = CompressedBlocks::<u64>::new(u64::MAX, 2, 0, vec![1, 1]);
        assert!(matches!(codec.decompress(&mut bytes(2), &blocks), Err(Error::Size(_))));

        let blocks = CompressedBlocks::<u64>::new(u64::MAX >> 1, 1, 0, vec![1]);
        assert!(matches!(codec.decompress(&mut bytes(1), &blocks), Err(Error::Size(_))));

        let blocks = CompressedBlocks::<u32>::new(4, 0, 3, vec![]);
        assert!(matches!(
            codec.decompress(&mut Serialization::new(), &blocks),
            Err(Error::Size(_))
        ));

        let blocks = CompressedBlocks::<u32>::new(0, 1, 0, vec![2]);
        assert!(matches!(codec.decompress(&mut bytes(2), &blocks), Err(Error::Size(_))));
    }

    #[test]
    fn codec_names() {
        assert_eq!("ZLIB".parse::<CodecKind>().unwrap(), CodecKind::Zlib);
        assert_eq!("zstd".parse::<CodecKind>().unwrap(), CodecKind::Zstd);
        assert_eq!("xz".parse::<CodecKind>().unwrap(), CodecKind::Lzma);
        assert!(matches!("brotli".parse::<CodecKind>(), Err(Error::UnknownCodec(_))));
        assert_eq!(CodecKind::Lz4.to_string(), "lz4");
    }

    #[test]
    fn unavailable_backends_are_reported() {
        for kind in CodecKind::ALL {
            match Compressor::new(kind) {
                Ok(compressor) => assert!(compressor.kind().is_available()),
                Err(Error::Unavailable(name)) => {
                    assert!(!kind.is_available());
                    assert_eq!(name, kind.name());
                }
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }
}
