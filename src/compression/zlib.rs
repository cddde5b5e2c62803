use super::{BlockCodec, DEFAULT_BLOCK_SIZE};
use crate::prelude::*;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZlibOptions {
    pub block_size: usize,
    /// `0` (store) to `9` (best)
    pub level: u32,
}

impl Default for ZlibOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            level: 6,
        }
    }
}

impl ZlibOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }
}

/// Deflate compression in zlib containers, one container per block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zlib {
    options: ZlibOptions,
}

impl Zlib {
    pub fn new(options: ZlibOptions) -> Self {
        Self { options }
    }
}

impl BlockCodec for Zlib {
    const NAME: &'static str = "zlib";

    fn block_size(&self) -> usize {
        self.options.block_size
    }

    fn compress_bound(&self, len: usize) -> usize {
        (128 + len * 110 / 100).max(128 + len + (len / (31 * 1024) + 1) * 5)
    }

    fn compress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let mut deflate = Compress::new(Compression::new(self.options.level), true);
        let status = deflate
            .compress(input, output, FlushCompress::Finish)
            .map_err(Error::backend)?;

        if status != Status::StreamEnd || deflate.total_in() as usize != input.len() {
            return Err(Error::InvalidState(format!(
                "zlib consumed {} of {} bytes ({status:?})",
                deflate.total_in(),
                input.len()
            )));
        }
        Ok(deflate.total_out() as usize)
    }

    fn decompress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let mut inflate = Decompress::new(true);
        let status = inflate
            .decompress(input, output, FlushDecompress::Finish)
            .map_err(Error::backend)?;

        if status != Status::StreamEnd {
            return Err(Error::size(format!(
                "zlib block does not fit into the declared {} bytes",
                output.len()
            )));
        }
        if inflate.total_in() as usize != input.len() {
            return Err(Error::InvalidState(format!(
                "zlib consumed {} of {} bytes",
                inflate.total_in(),
                input.len()
            )));
        }
        Ok(inflate.total_out() as usize)
    }
}
