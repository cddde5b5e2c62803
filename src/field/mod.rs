//! # Fields
//!
//! A [`Field`] is anything that can report the shape ([`Layout`]) and scalar type ([`Precision`])
//! of a collection of values, and produce those values as bytes on demand. Fields never cache
//! their bytes: every call to [`Field::serialized`] recomputes them from the underlying data.
//!
//! The concrete implementations in this module cover the common ways of providing data:
//!
//! * [`RangeField`] for a collection of values (scalars, arrays or nested `Vec`s)
//! * [`EntityField`] for values computed by a closure over grid entities (points or cells)
//! * [`LazyField`] for a source object plus a callback that serializes it
//! * [`BufferField`] for an already flat buffer with a declared layout
//! * [`ArrayField`] for an `ndarray` array
//!
//! Fields that are shared between several consumers are passed around as a [`FieldPtr`], and
//! can be reshaped with [`IdentityField`], [`FlattenedField`] and [`ExtendedField`].
//!
//! Reading values back out goes through [`FieldExt`]:
//!
//! ```ignore
//! use gridfield::prelude::*;
//!
//! let field = gridfield::RangeField::new(vec![[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]]);
//! let mut points: Vec<[f32; 3]> = Vec::new();
//! field.export_to(&mut points)?;
//! ```

mod array;
mod buffer;
mod entity;
mod export;
mod lazy;
mod range;
mod transformed;
mod value;

pub use array::ArrayField;
pub use buffer::BufferField;
pub use entity::EntityField;
pub use export::ExportTarget;
pub use lazy::LazyField;
pub use range::RangeField;
pub use transformed::{ExtendedField, FlattenedField, IdentityField};
pub use value::FieldValue;

use crate::prelude::*;
use std::sync::Arc;

/// A field shared between several owners
pub type FieldPtr = Arc<dyn Field + Send + Sync>;

/// Shape, scalar type and bytes of a collection of values
pub trait Field {
    fn layout(&self) -> Layout;

    fn precision(&self) -> Precision;

    /// produce the row-major bytes of all values
    ///
    /// Implementors should not be called directly; use [`Field::serialized`] which checks the
    /// result against the layout and precision.
    fn produce_serialization(&self) -> Result<Serialization>;

    fn number_of_entries(&self) -> usize {
        self.layout().number_of_entries()
    }

    fn size_in_bytes(&self) -> usize {
        self.number_of_entries() * self.precision().size_in_bytes()
    }

    /// Compute the bytes of this field
    ///
    /// Fails with [`Error::Size`] if the produced bytes disagree with
    /// `layout().number_of_entries() * precision().size_in_bytes()`.
    fn serialized(&self) -> Result<Serialization> {
        let serialization = self.produce_serialization()?;
        let expected = self.size_in_bytes();
        if serialization.len() != expected {
            return Err(Error::size(format!(
                "field with layout {} and precision {} produced {} bytes, expected {expected}",
                self.layout(),
                self.precision(),
                serialization.len()
            )));
        }
        Ok(serialization)
    }
}

impl<F: Field + ?Sized> Field for &F {
    fn layout(&self) -> Layout {
        (**self).layout()
    }

    fn precision(&self) -> Precision {
        (**self).precision()
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        (**self).produce_serialization()
    }
}

impl<F: Field + ?Sized> Field for Arc<F> {
    fn layout(&self) -> Layout {
        (**self).layout()
    }

    fn precision(&self) -> Precision {
        (**self).precision()
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        (**self).produce_serialization()
    }
}

impl<F: Field + ?Sized> Field for Box<F> {
    fn layout(&self) -> Layout {
        (**self).layout()
    }

    fn precision(&self) -> Precision {
        (**self).precision()
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        (**self).produce_serialization()
    }
}

/// Receives the values of a field as a slice of their concrete type
pub trait ValuesVisitor {
    type Output;

    fn visit<T: Scalar>(self, values: &[T]) -> Self::Output;
}

/// Typed access to the values of any [`Field`]
pub trait FieldExt: Field {
    /// Serialize once and hand the values to `visitor` as a slice of their concrete type
    fn visit_field_values<V: ValuesVisitor>(&self, visitor: V) -> Result<V::Output> {
        let serialization = self.serialized()?;
        self.precision().visit(ValuesOf {
            serialization: &serialization,
            visitor,
        })
    }

    /// Fill `target` with the values of this field, resizing it as needed
    ///
    /// `Vec<T>` and `Vec<[T; N]>` are filled flat and fail with [`Error::Type`] if the number of
    /// entries is not divisible by the number of scalars per element. Nested vectors
    /// (`Vec<Vec<T>>`, ...) are filled one dimension at a time.
    fn export_to<C: ExportTarget>(&self, target: &mut C) -> Result<()> {
        let layout = self.layout();
        self.visit_field_values(Fill {
            target,
            layout: &layout,
        })?
    }

    /// Fill an existing slice without resizing it
    ///
    /// Fails with [`Error::Size`] if the slice cannot hold all entries. Elements past the
    /// number of entries are left untouched.
    fn export_into<E: ExportTarget>(&self, target: &mut [E]) -> Result<()> {
        let arity = E::ARITY.filter(|arity| *arity > 0).ok_or_else(|| {
            Error::type_error("only non-empty fixed size elements can be exported into a slice")
        })?;
        let entries = self.number_of_entries();
        if entries % arity != 0 {
            return Err(Error::type_error(format!(
                "{entries} entries cannot be split into elements of {arity} values"
            )));
        }
        if target.len() * arity < entries {
            return Err(Error::size(format!(
                "slice of {} elements with {arity} values each cannot hold {entries} entries",
                target.len()
            )));
        }
        let used = entries / arity;
        self.visit_field_values(FillSlice {
            target: &mut target[..used],
            arity,
        })?
    }

    /// The single value of a field with exactly one entry
    fn export_scalar<T: Scalar>(&self) -> Result<T> {
        let entries = self.number_of_entries();
        if entries != 1 {
            return Err(Error::type_error(format!(
                "cannot export a field with {entries} entries into a scalar"
            )));
        }
        let mut value = T::ZERO;
        self.export_to(&mut value)?;
        Ok(value)
    }

    /// All values, flattened and cast to `T`
    fn export_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        let mut values = Vec::new();
        self.export_to(&mut values)?;
        Ok(values)
    }

    /// All values cast to `T` in an array shaped like the layout of this field
    fn export_array<T: Scalar>(&self) -> Result<ndarray::ArrayD<T>> {
        let layout = self.layout();
        let values = self.export_vec::<T>()?;
        ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(layout.extents()), values)
            .map_err(|e| Error::size(format!("cannot shape values as {layout}: {e}")))
    }
}

impl<F: Field + ?Sized> FieldExt for F {}

struct ValuesOf<'a, V> {
    serialization: &'a Serialization,
    visitor: V,
}

impl<'a, V: ValuesVisitor> PrecisionVisitor for ValuesOf<'a, V> {
    type Output = Result<V::Output>;

    fn visit<T: Scalar>(self, _precision: Precision) -> Self::Output {
        let values = self.serialization.as_slice_of::<T>()?;
        Ok(self.visitor.visit(values))
    }
}

struct Fill<'a, C> {
    target: &'a mut C,
    layout: &'a Layout,
}

impl<'a, C: ExportTarget> ValuesVisitor for Fill<'a, C> {
    type Output = Result<()>;

    fn visit<T: Scalar>(self, values: &[T]) -> Result<()> {
        self.target.fill(self.layout, values)
    }
}

struct FillSlice<'a, E> {
    target: &'a mut [E],
    arity: usize,
}

impl<'a, E: ExportTarget> ValuesVisitor for FillSlice<'a, E> {
    type Output = Result<()>;

    fn visit<T: Scalar>(self, values: &[T]) -> Result<()> {
        let layout = Layout::from([self.arity]);
        for (element, chunk) in self.target.iter_mut().zip(values.chunks(self.arity)) {
            element.fill(&layout, chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counting {
        values: Vec<i32>,
        layout: Layout,
    }

    impl Field for Counting {
        fn layout(&self) -> Layout {
            self.layout.clone()
        }

        fn precision(&self) -> Precision {
            Precision::Int32
        }

        fn produce_serialization(&self) -> Result<Serialization> {
            Ok(Serialization::from_values(&self.values))
        }
    }

    fn counting(n: usize, layout: Layout) -> Counting {
        Counting {
            values: (0..n as i32).collect(),
            layout,
        }
    }

    struct Sum;

    impl ValuesVisitor for Sum {
        type Output = f64;

        fn visit<T: Scalar>(self, values: &[T]) -> f64 {
            values.iter().map(|v| v.to_f64()).sum()
        }
    }

    #[test]
    fn serialized_checks_the_layout() {
        let field = counting(5, Layout::from([6]));
        assert!(matches!(field.serialized(), Err(Error::Size(_))));
    }

    #[test]
    fn serialized_is_deterministic() {
        let field = counting(6, Layout::from([2, 3]));
        assert_eq!(field.serialized().unwrap(), field.serialized().unwrap());
    }

    #[test]
    fn visitor_sees_concrete_values() {
        let field = counting(4, Layout::from([4]));
        assert_eq!(field.visit_field_values(Sum).unwrap(), 6.0);
    }

    #[test]
    fn export_resizing_vec_of_arrays() {
        let field = counting(6, Layout::from([2, 3]));
        let mut points: Vec<[f64; 3]> = vec![[9.0; 3]; 7];
        field.export_to(&mut points).unwrap();
        assert_eq!(points, vec![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]);
    }

    #[test]
    fn export_resizing_rejects_indivisible_counts() {
        let field = counting(4, Layout::from([4]));
        let mut points: Vec<[f64; 3]> = Vec::new();
        assert!(matches!(field.export_to(&mut points), Err(Error::Type(_))));
    }

    #[test]
    fn export_into_rejects_small_slices() {
        let field = counting(6, Layout::from([6]));
        let mut buffer = [0u8; 5];
        assert!(matches!(field.export_into(&mut buffer), Err(Error::Size(_))));

        let mut buffer = [0u8; 8];
        field.export_into(&mut buffer).unwrap();
        assert_eq!(buffer, [0, 1, 2, 3, 4, 5, 0, 0]);
    }

    #[test]
    fn export_nested() {
        let field = counting(6, Layout::from([3, 2]));
        let mut nested: Vec<Vec<u16>> = Vec::new();
        field.export_to(&mut nested).unwrap();
        assert_eq!(nested, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);

        let mut too_deep: Vec<Vec<Vec<u16>>> = Vec::new();
        assert!(matches!(field.export_to(&mut too_deep), Err(Error::Type(_))));
    }

    #[test]
    fn export_scalar_requires_one_entry() {
        let field = counting(1, Layout::scalar());
        assert_eq!(field.export_scalar::<f32>().unwrap(), 0.0);

        let field = counting(2, Layout::from([2]));
        assert!(matches!(field.export_scalar::<f32>(), Err(Error::Type(_))));
    }

    #[test]
    fn export_array_keeps_the_shape() {
        let field = counting(6, Layout::from([2, 3]));
        let array = field.export_array::<i64>().unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array[[1, 0]], 3);
    }
}
