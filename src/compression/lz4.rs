use super::{BlockCodec, DEFAULT_BLOCK_SIZE};
use crate::prelude::*;
use lz4_flex::block;

/// `lz4_flex` has a single speed setting, so only the block size is configurable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz4Options {
    pub block_size: usize,
}

impl Default for Lz4Options {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Lz4Options {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }
}

/// Raw LZ4 blocks without frame headers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lz4 {
    options: Lz4Options,
}

impl Lz4 {
    pub fn new(options: Lz4Options) -> Self {
        Self { options }
    }
}

impl BlockCodec for Lz4 {
    const NAME: &'static str = "lz4";

    fn block_size(&self) -> usize {
        self.options.block_size
    }

    fn compress_bound(&self, len: usize) -> usize {
        block::get_maximum_output_size(len)
    }

    fn compress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        block::compress_into(input, output).map_err(Error::backend)
    }

    fn decompress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        block::decompress_into(input, output).map_err(Error::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_roundtrip() {
        let codec = Lz4::default();
        let input: Vec<u8> = (0..4096u32).map(|i| (i % 17) as u8).collect();
        let mut scratch = vec![0; codec.compress_bound(input.len())];
        let written = codec.compress_block(&input, &mut scratch).unwrap();

        let mut output = vec![0; input.len()];
        let produced = codec.decompress_block(&scratch[..written], &mut output).unwrap();
        assert_eq!(produced, input.len());
        assert_eq!(output, input);
    }

    #[test]
    fn corrupted_blocks_fail() {
        let codec = Lz4::default();
        let mut output = vec![0; 64];
        assert!(codec.decompress_block(&[0xff; 8], &mut output).is_err());
    }
}
