//! Owned byte buffers with typed views

use crate::prelude::*;
use zerocopy::{FromBytes, IntoBytes};

const WORD: usize = std::mem::size_of::<u64>();

/// An owned, resizable byte buffer
///
/// The bytes are backed by 8-byte words so that a view as any [`Scalar`] slice is always
/// aligned. A typed view only fails when the buffer length is not a multiple of the scalar size.
#[derive(Clone, Default)]
pub struct Serialization {
    words: Vec<u64>,
    len: usize,
}

impl Serialization {
    pub fn new() -> Self {
        Self::default()
    }

    /// a zero filled buffer of `len` bytes
    pub fn zeroed(len: usize) -> Self {
        Self {
            words: vec![0; words_for(len)],
            len,
        }
    }

    /// Like [`Serialization::zeroed`], but fails with [`Error::Size`] instead of aborting when
    /// `len` bytes cannot be allocated
    pub fn try_zeroed(len: usize) -> Result<Self> {
        let count = words_for(len);
        let mut words = Vec::new();
        words
            .try_reserve_exact(count)
            .map_err(|e| Error::size(format!("cannot allocate a buffer of {len} bytes: {e}")))?;
        words.resize(count, 0);
        Ok(Self { words, len })
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            words: Vec::with_capacity(words_for(bytes)),
            len: 0,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut out = Self::with_capacity(bytes.len());
        out.extend_from_slice(bytes);
        out
    }

    /// copy the in-memory representation of `values`
    pub fn from_values<T: Scalar>(values: &[T]) -> Self {
        Self::from_bytes(values.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &IntoBytes::as_bytes(self.words.as_slice())[..self.len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.len;
        &mut IntoBytes::as_mut_bytes(self.words.as_mut_slice())[..len]
    }

    /// Grow or shrink to `len` bytes. New bytes are zero.
    pub fn resize(&mut self, len: usize) {
        let old = self.len;
        self.words.resize(words_for(len), 0);
        self.len = len;
        if len > old {
            self.as_bytes_mut()[old..].fill(0);
        }
    }

    pub fn clear(&mut self) {
        self.words.clear();
        self.len = 0;
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        let old = self.len;
        self.resize(old + bytes.len());
        self.as_bytes_mut()[old..].copy_from_slice(bytes);
    }

    /// append the in-memory representation of `values`
    pub fn extend_from_values<T: Scalar>(&mut self, values: &[T]) {
        self.extend_from_slice(values.as_bytes())
    }

    /// View the bytes as a slice of `T` without copying
    pub fn as_slice_of<T: Scalar>(&self) -> Result<&[T]> {
        check_divisible::<T>(self.len)?;
        <[T]>::ref_from_bytes(self.as_bytes()).map_err(|_| {
            Error::size(format!(
                "cannot view {} bytes as a slice of {}",
                self.len,
                T::PRECISION
            ))
        })
    }

    /// View the bytes as a mutable slice of `T` without copying
    pub fn as_mut_slice_of<T: Scalar>(&mut self) -> Result<&mut [T]> {
        let len = self.len;
        check_divisible::<T>(len)?;
        <[T]>::mut_from_bytes(self.as_bytes_mut()).map_err(|_| {
            Error::size(format!(
                "cannot view {} bytes as a slice of {}",
                len,
                T::PRECISION
            ))
        })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl std::fmt::Debug for Serialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serialization")
            .field("len", &self.len)
            .finish()
    }
}

impl PartialEq for Serialization {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Serialization {}

impl From<&[u8]> for Serialization {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for Serialization {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(&bytes)
    }
}

impl AsRef<[u8]> for Serialization {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

fn words_for(bytes: usize) -> usize {
    bytes / WORD + usize::from(bytes % WORD != 0)
}

fn check_divisible<T: Scalar>(len: usize) -> Result<()> {
    let size = std::mem::size_of::<T>();
    if len % size != 0 {
        return Err(Error::size(format!(
            "buffer of {len} bytes is not a whole number of {} values ({size} bytes each)",
            T::PRECISION
        )));
    }
    Ok(())
}
