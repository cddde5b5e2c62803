//! # Shapes of value collections
//!
//! A [`Layout`] lists the extent of every dimension of a collection of values. By convention
//! dimension `0` counts the entries of a field (points or cells) and the remaining dimensions
//! describe the structure of a single entry, so that a vector field over 100 points has the layout
//! `(100, 3)` and a tensor field over the same points `(100, 3, 3)`.
//!
//! Two conventions live side by side in this module:
//!
//! * [`flat_index`] maps a coordinate to an offset in row-major order (the last dimension varies
//!   fastest). Every serialized buffer in this crate is laid out this way.
//! * [`Indices`] visits every coordinate of a layout with the **first** dimension varying
//!   fastest. Code that needs flat offsets must compute them through [`flat_index`] rather than
//!   counting the enumerated indices.

mod index;
mod indices;

pub use index::{flat_index, Index};
pub use indices::Indices;

use crate::prelude::*;

/// Ordered extents of a multi-dimensional collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deref)]
pub struct Layout(Vec<usize>);

impl Layout {
    pub fn new<T: Into<Vec<usize>>>(extents: T) -> Self {
        Self(extents.into())
    }

    /// layout of a field holding a single scalar value
    pub fn scalar() -> Self {
        Self(vec![1])
    }

    pub fn extents(&self) -> &[usize] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn extent(&self, dimension: usize) -> Result<usize> {
        self.0.get(dimension).copied().ok_or_else(|| {
            Error::size(format!(
                "dimension {dimension} is out of range for layout {self}"
            ))
        })
    }

    /// product of all extents, `0` for a layout without dimensions
    pub fn number_of_entries(&self) -> usize {
        if self.0.is_empty() {
            0
        } else {
            self.0.iter().product()
        }
    }

    /// number of entries of the sub-layout starting at `dimension`
    pub fn number_of_entries_from(&self, dimension: usize) -> Result<usize> {
        Ok(self.sub_layout(dimension)?.number_of_entries())
    }

    /// The extents from `dimension` onward. `dimension == self.dimension()` yields an empty layout.
    pub fn sub_layout(&self, dimension: usize) -> Result<Layout> {
        if dimension > self.dimension() {
            return Err(Error::size(format!(
                "cannot take the sub-layout from dimension {dimension} of layout {self}"
            )));
        }
        Ok(Self(self.0[dimension..].to_vec()))
    }

    pub fn is_scalar(&self) -> bool {
        self.number_of_entries() == 1
    }

    /// a new layout with `extent` prepended as dimension `0`
    pub fn prepend(&self, extent: usize) -> Layout {
        let mut extents = Vec::with_capacity(self.dimension() + 1);
        extents.push(extent);
        extents.extend_from_slice(&self.0);
        Self(extents)
    }

    /// every index inside this layout, first dimension fastest
    pub fn indices(&self) -> Indices {
        Indices::new(self)
    }

    pub fn flat_index(&self, index: &Index) -> Result<usize> {
        flat_index(index, self)
    }
}

impl From<Vec<usize>> for Layout {
    fn from(extents: Vec<usize>) -> Self {
        Self(extents)
    }
}

impl<const N: usize> From<[usize; N]> for Layout {
    fn from(extents: [usize; N]) -> Self {
        Self(extents.to_vec())
    }
}

impl From<&[usize]> for Layout {
    fn from(extents: &[usize]) -> Self {
        Self(extents.to_vec())
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, extent) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{extent}")?;
        }
        write!(f, ")")
    }
}
