use super::{BlockCodec, DEFAULT_BLOCK_SIZE};
use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZstdOptions {
    pub block_size: usize,
    /// `1` (fast) to `22` (best), `0` selects the library default
    pub level: i32,
}

impl Default for ZstdOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            level: 3,
        }
    }
}

impl ZstdOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }
}

/// One Zstandard frame per block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zstd {
    options: ZstdOptions,
}

impl Zstd {
    pub fn new(options: ZstdOptions) -> Self {
        Self { options }
    }
}

impl BlockCodec for Zstd {
    const NAME: &'static str = "zstd";

    fn block_size(&self) -> usize {
        self.options.block_size
    }

    fn compress_bound(&self, len: usize) -> usize {
        zstd::zstd_safe::compress_bound(len)
    }

    fn compress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        Ok(zstd::bulk::compress_to_buffer(
            input,
            output,
            self.options.level,
        )?)
    }

    fn decompress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        Ok(zstd::bulk::decompress_to_buffer(input, output)?)
    }
}
