//! Fields that present another field with a different shape

use super::{Field, FieldPtr};
use crate::layout::flat_index;
use crate::prelude::*;

/// Presents the wrapped field unchanged
#[derive(Clone, Constructor)]
pub struct IdentityField {
    field: FieldPtr,
}

impl Field for IdentityField {
    fn layout(&self) -> Layout {
        self.field.layout()
    }

    fn precision(&self) -> Precision {
        self.field.precision()
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        self.field.serialized()
    }
}

/// Presents the wrapped field as a one-dimensional sequence of all its scalars
#[derive(Clone, Constructor)]
pub struct FlattenedField {
    field: FieldPtr,
}

impl Field for FlattenedField {
    fn layout(&self) -> Layout {
        Layout::from([self.field.number_of_entries()])
    }

    fn precision(&self) -> Precision {
        self.field.precision()
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        self.field.serialized()
    }
}

/// Zero-pads every entry of the wrapped field to a larger per-entry layout
///
/// A 2D vector field with layout `(n, 2)` extended to the sub-layout `(3)` becomes a field with
/// layout `(n, 3)` whose third component is zero, which is what readers expect for vectors.
#[derive(Clone)]
pub struct ExtendedField {
    field: FieldPtr,
    sub_layout: Layout,
}

impl ExtendedField {
    /// Extend every entry of `field` to `sub_layout`
    ///
    /// Fails with [`Error::Size`] if the field has no per-entry structure, if `sub_layout` has a
    /// different number of dimensions than the entries, or if any of its extents is smaller.
    pub fn new<L: Into<Layout>>(field: FieldPtr, sub_layout: L) -> Result<Self> {
        let sub_layout = sub_layout.into();
        let layout = field.layout();
        if layout.dimension() <= 1 {
            return Err(Error::size(format!(
                "cannot extend the entries of a field with layout {layout}"
            )));
        }
        let source = layout.sub_layout(1)?;
        if source.dimension() != sub_layout.dimension() {
            return Err(Error::size(format!(
                "cannot extend entries of layout {source} to {sub_layout}"
            )));
        }
        if source.iter().zip(sub_layout.iter()).any(|(s, t)| t < s) {
            return Err(Error::size(format!(
                "target layout {sub_layout} is smaller than the entry layout {source}"
            )));
        }
        Ok(Self { field, sub_layout })
    }
}

impl Field for ExtendedField {
    fn layout(&self) -> Layout {
        self.sub_layout.prepend(self.field.layout().extent(0).unwrap_or(0))
    }

    fn precision(&self) -> Precision {
        self.field.precision()
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        let source_layout = self.field.layout();
        let source_sub = source_layout.sub_layout(1)?;
        let entries = source_layout.extent(0)?;
        let source = self.field.serialized()?;

        let scalar = self.precision().size_in_bytes();
        let source_stride = source_sub.number_of_entries() * scalar;
        let target_stride = self.sub_layout.number_of_entries() * scalar;
        let mut target = Serialization::zeroed(entries * target_stride);

        // flat offsets of every source component inside the source and the target entry
        let offsets = source_sub
            .indices()
            .map(|index| {
                Ok((
                    flat_index(&index, &source_sub)? * scalar,
                    flat_index(&index, &self.sub_layout)? * scalar,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let input = source.as_bytes();
        let output = target.as_bytes_mut();
        for entry in 0..entries {
            let from = &input[entry * source_stride..(entry + 1) * source_stride];
            let to = &mut output[entry * target_stride..(entry + 1) * target_stride];
            for (source_offset, target_offset) in &offsets {
                to[*target_offset..target_offset + scalar]
                    .copy_from_slice(&from[*source_offset..source_offset + scalar]);
            }
        }

        Ok(target)
    }
}
