use super::Layout;
use crate::prelude::*;

/// A coordinate inside a [`Layout`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, DerefMut)]
pub struct Index(Vec<usize>);

impl Index {
    pub fn new<T: Into<Vec<usize>>>(components: T) -> Self {
        Self(components.into())
    }

    /// the origin of a `dimension` dimensional layout
    pub fn zeros(dimension: usize) -> Self {
        Self(vec![0; dimension])
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, dimension: usize) -> Option<usize> {
        self.0.get(dimension).copied()
    }

    pub fn set(&mut self, dimension: usize, value: usize) -> Result<()> {
        let len = self.0.len();
        let slot = self.0.get_mut(dimension).ok_or_else(|| {
            Error::size(format!(
                "cannot set dimension {dimension} of a {len} dimensional index"
            ))
        })?;
        *slot = value;
        Ok(())
    }
}

impl<const N: usize> From<[usize; N]> for Index {
    fn from(components: [usize; N]) -> Self {
        Self(components.to_vec())
    }
}

impl std::fmt::Display for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{component}")?;
        }
        write!(f, ")")
    }
}

/// Row-major offset of `index` inside `layout`
///
/// The stride of dimension `d` is the product of the extents of dimensions `d+1..`, so the last
/// dimension varies fastest.
pub fn flat_index(index: &Index, layout: &Layout) -> Result<usize> {
    if index.dimension() != layout.dimension() {
        return Err(Error::size(format!(
            "index {index} does not match the dimension of layout {layout}"
        )));
    }

    let mut offset = 0;
    for (component, extent) in index.iter().zip(layout.iter()) {
        if component >= extent {
            return Err(Error::size(format!(
                "index {index} lies outside of layout {layout}"
            )));
        }
        offset = offset * extent + component;
    }
    Ok(offset)
}
