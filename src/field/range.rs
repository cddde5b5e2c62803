use super::value::{is_uniform, nested_extents, FieldValue};
use super::Field;
use crate::prelude::*;
use std::borrow::Cow;
use std::marker::PhantomData;

/// A field over a collection of values
///
/// The layout is `[number_of_values, extents of a value...]`, so a `Vec<[f64; 3]>` with 100
/// entries becomes a field with layout `(100, 3)`. The values are cast to `T` when serialized,
/// which defaults to the scalar type of the collection.
///
/// ```ignore
/// let velocity = RangeField::new(vec![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
/// let as_f32 = RangeField::<_, f32>::with_precision(vec![1.0f64, 2.0]);
/// ```
#[derive(Debug, Clone)]
pub struct RangeField<'a, V: FieldValue + Clone, T = <V as FieldValue>::Element> {
    values: Cow<'a, [V]>,
    precision: PhantomData<T>,
}

impl<'a, V: FieldValue + Clone> RangeField<'a, V> {
    pub fn new<R: Into<Cow<'a, [V]>>>(values: R) -> Self {
        Self::with_precision(values)
    }
}

impl<'a, V: FieldValue + Clone, T: Scalar> RangeField<'a, V, T> {
    /// a field whose values are cast to `T`
    pub fn with_precision<R: Into<Cow<'a, [V]>>>(values: R) -> Self {
        Self {
            values: values.into(),
            precision: PhantomData,
        }
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }
}

impl<'a, V: FieldValue + Clone, T: Scalar> Field for RangeField<'a, V, T> {
    fn layout(&self) -> Layout {
        Layout::new(nested_extents(self.values.len(), self.values.first()))
    }

    fn precision(&self) -> Precision {
        T::PRECISION
    }

    fn produce_serialization(&self) -> Result<Serialization> {
        if !is_uniform(&self.values) {
            return Err(Error::size(
                "values of a range field must all have the same extents",
            ));
        }
        let mut scalars: Vec<T> = Vec::with_capacity(self.layout().number_of_entries());
        self.values.iter().for_each(|v| v.push_scalars(&mut scalars));
        Ok(Serialization::from_values(&scalars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldExt;

    #[test]
    fn layout_is_deduced_from_values() {
        let field = RangeField::new(vec![[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(field.layout(), Layout::from([2, 3]));
        assert_eq!(field.precision(), Precision::Float64);
        assert_eq!(field.serialized().unwrap().len(), 48);
    }

    #[test]
    fn borrowed_values_with_other_precision() {
        let data = [1.5f64, 2.5, -3.5];
        let field = RangeField::<_, f32>::with_precision(&data[..]);
        assert_eq!(field.precision(), Precision::Float32);
        assert_eq!(field.export_vec::<f32>().unwrap(), vec![1.5, 2.5, -3.5]);
    }

    #[test]
    fn ragged_values_fail() {
        let field = RangeField::new(vec![vec![1u8, 2], vec![3]]);
        assert!(matches!(field.serialized(), Err(Error::Size(_))));
    }

    #[test]
    fn empty_range() {
        let field = RangeField::new(Vec::<f64>::new());
        assert_eq!(field.layout(), Layout::from([0]));
        assert!(field.serialized().unwrap().is_empty());
    }

    #[test]
    fn empty_ranges_keep_the_value_extents() {
        let vectors = RangeField::new(Vec::<[f64; 3]>::new());
        assert_eq!(vectors.layout(), Layout::from([0, 3]));
        assert!(vectors.serialized().unwrap().is_empty());

        let tensors = RangeField::new(Vec::<[[f32; 2]; 2]>::new());
        assert_eq!(tensors.layout(), Layout::from([0, 2, 2]));

        let ragged = RangeField::new(Vec::<Vec<f32>>::new());
        assert_eq!(ragged.layout(), Layout::from([0]));
    }
}
