use super::{BlockCodec, DEFAULT_BLOCK_SIZE};
use crate::prelude::*;
use xz2::stream::{Action, Check, Status, Stream};

/// LZMA2 chunks hold at most this many bytes, each adds a small header
const CHUNK_SIZE: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzmaOptions {
    pub block_size: usize,
    /// preset from `0` (fast) to `9` (best)
    pub level: u32,
}

impl Default for LzmaOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            level: 1,
        }
    }
}

impl LzmaOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.min(9);
        self
    }
}

/// LZMA2 compression in `.xz` containers with a CRC32 check, one container per block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lzma {
    options: LzmaOptions,
}

impl Lzma {
    pub fn new(options: LzmaOptions) -> Self {
        Self { options }
    }
}

/// Feed `input` through `stream` until it ends, stalls or fails
fn run(stream: &mut Stream, input: &[u8], output: &mut [u8]) -> Result<Status> {
    loop {
        let read = stream.total_in() as usize;
        let written = stream.total_out() as usize;
        let status = stream
            .process(&input[read..], &mut output[written..], Action::Finish)
            .map_err(Error::backend)?;
        let stalled = stream.total_in() as usize == read && stream.total_out() as usize == written;
        if status != Status::Ok || stalled {
            return Ok(status);
        }
    }
}

impl BlockCodec for Lzma {
    const NAME: &'static str = "lzma";

    fn block_size(&self) -> usize {
        self.options.block_size
    }

    fn compress_bound(&self, len: usize) -> usize {
        // stream and block headers, index and footer come on top of the chunked payload
        len + (len / CHUNK_SIZE + 1) * 3 + 1024 + 128
    }

    fn compress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let mut encoder =
            Stream::new_easy_encoder(self.options.level, Check::Crc32).map_err(Error::backend)?;
        let status = run(&mut encoder, input, output)?;

        if status != Status::StreamEnd || encoder.total_in() as usize != input.len() {
            return Err(Error::InvalidState(format!(
                "lzma consumed {} of {} bytes ({status:?})",
                encoder.total_in(),
                input.len()
            )));
        }
        Ok(encoder.total_out() as usize)
    }

    fn decompress_block(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        let mut decoder = Stream::new_stream_decoder(u64::MAX, 0).map_err(Error::backend)?;
        let status = run(&mut decoder, input, output)?;

        if status != Status::StreamEnd {
            if decoder.total_out() as usize == output.len() {
                return Err(Error::size(format!(
                    "lzma block does not fit into the declared {} bytes",
                    output.len()
                )));
            }
            return Err(Error::InvalidState(format!(
                "lzma block ended after {} of {} bytes ({status:?})",
                decoder.total_in(),
                input.len()
            )));
        }
        if decoder.total_in() as usize != input.len() {
            return Err(Error::InvalidState(format!(
                "lzma consumed {} of {} bytes",
                decoder.total_in(),
                input.len()
            )));
        }
        Ok(decoder.total_out() as usize)
    }
}
