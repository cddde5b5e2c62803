use super::{EncodedStream, Encoder};
use crate::prelude::*;
use zerocopy::IntoBytes;

const DEFAULT_CACHE_GROUPS: usize = 4096;

/// Writes standard base64 text (`A-Za-z0-9+/` with `=` padding) without line breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64 {
    cache_groups: usize,
}

impl Default for Base64 {
    fn default() -> Self {
        Self {
            cache_groups: DEFAULT_CACHE_GROUPS,
        }
    }
}

impl Base64 {
    /// Encode `groups` 3-byte groups per call into the base64 engine
    pub fn with_cache_groups(groups: usize) -> Self {
        Self {
            cache_groups: groups.max(1),
        }
    }
}

impl Encoder for Base64 {
    type Stream<W: Write> = Base64Stream<W>;

    const FORMAT: &'static str = "binary";

    fn produces_valid_text() -> bool {
        true
    }

    fn stream<W: Write>(&self, sink: W) -> Base64Stream<W> {
        Base64Stream::new(sink, self.cache_groups)
    }
}

/// An open base64 output
///
/// Bytes are collected until a full cache of 3-byte groups is available. The 1 or 2 bytes left
/// over at the end are padded when the stream is finished (or dropped).
pub struct Base64Stream<W: Write> {
    sink: W,
    cache: Vec<u8>,
    capacity: usize,
    encoded: Vec<u8>,
    failed: bool,
}

impl<W: Write> Base64Stream<W> {
    fn new(sink: W, groups: usize) -> Self {
        Self {
            sink,
            cache: Vec::with_capacity(groups * 3),
            capacity: groups * 3,
            encoded: vec![0; groups * 4],
            failed: false,
        }
    }

    /// Encode and write the cache
    ///
    /// The cache is emptied before writing. After a failed write the stream refuses further
    /// output, so nothing is written twice and no padding ends up in the middle of the sink.
    fn flush_cache(&mut self) -> Result<()> {
        self.check_usable()?;
        if self.cache.is_empty() {
            return Ok(());
        }
        let written =
            ::base64::encode_config_slice(&self.cache, ::base64::STANDARD, &mut self.encoded);
        self.cache.clear();
        if let Err(e) = self.sink.write_all(&self.encoded[..written]) {
            self.failed = true;
            return Err(e.into());
        }
        Ok(())
    }

    fn check_usable(&self) -> Result<()> {
        if self.failed {
            return Err(Error::InvalidState(
                "base64 output failed earlier and cannot be continued".to_string(),
            ));
        }
        Ok(())
    }
}

impl<W: Write> EncodedStream for Base64Stream<W> {
    fn write_values<T: Scalar>(&mut self, values: &[T]) -> Result<()> {
        self.write_bytes(values.as_bytes())
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        self.check_usable()?;
        while !bytes.is_empty() {
            let room = self.capacity - self.cache.len();
            let (head, tail) = bytes.split_at(room.min(bytes.len()));
            self.cache.extend_from_slice(head);
            bytes = tail;
            if self.cache.len() == self.capacity {
                self.flush_cache()?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.flush_cache()?;
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for Base64Stream<W> {
    fn drop(&mut self) {
        if self.failed {
            return;
        }
        if let Err(e) = self.flush_cache() {
            log::error!("failed to flush base64 output on drop: {e}");
        }
    }
}

/// Encode `bytes` in one go
pub fn encode_base64<T: AsRef<[u8]>>(bytes: T) -> String {
    ::base64::encode_config(bytes, ::base64::STANDARD)
}
