use super::{Index, Layout};

/// Enumerates every [`Index`] of a [`Layout`] exactly once
///
/// The first dimension varies fastest and carries into the following ones, which is the
/// opposite of the row-major order used by [`flat_index`](super::flat_index).
#[derive(Debug, Clone)]
pub struct Indices {
    extents: Vec<usize>,
    current: Option<Index>,
    remaining: usize,
}

impl Indices {
    pub fn new(layout: &Layout) -> Self {
        let remaining = layout.number_of_entries();
        let current = if remaining == 0 {
            None
        } else {
            Some(Index::zeros(layout.dimension()))
        };

        Self {
            extents: layout.extents().to_vec(),
            current,
            remaining,
        }
    }

    fn advance(&mut self) {
        let Some(index) = self.current.as_mut() else {
            return;
        };

        for (component, extent) in index.iter_mut().zip(self.extents.iter()) {
            *component += 1;
            if *component < *extent {
                return;
            }
            *component = 0;
        }

        self.current = None;
    }
}

impl Iterator for Indices {
    type Item = Index;

    fn next(&mut self) -> Option<Index> {
        let index = self.current.clone()?;
        self.advance();
        self.remaining -= 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Indices {}
